//! Social-media platforms a card can link to

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repository::{AuditStamp, Entity, FieldValue, Id, RepositoryConfig, SortWhitelist};

/// A social-media platform and its icon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SocialMedia {
    pub id: Id,
    pub name: String,
    pub icon: String,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl Entity for SocialMedia {
    const TABLE: &'static str = "social_media";
    const NAME: &'static str = "SocialMedia";
    const COLUMNS: &'static [&'static str] = &["name", "icon", "is_active"];

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.name.clone().into(),
            self.icon.clone().into(),
            self.is_active.into(),
        ]
    }
}

pub fn repository_config() -> RepositoryConfig<SocialMedia> {
    RepositoryConfig::new(SortWhitelist::new(&["id", "name", "created_at"], "id"))
}
