//! Invitation categories (wedding, engagement, ...) and their templates

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repository::{AuditStamp, Entity, FieldValue, Id, RepositoryConfig, SortWhitelist};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InvitationCategory {
    pub id: Id,
    pub name: String,
    pub icon: String,
    pub template: String,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl Entity for InvitationCategory {
    const TABLE: &'static str = "invitation_categories";
    const NAME: &'static str = "InvitationCategory";
    const COLUMNS: &'static [&'static str] = &["name", "icon", "template", "is_active"];

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.name.clone().into(),
            self.icon.clone().into(),
            self.template.clone().into(),
            self.is_active.into(),
        ]
    }
}

pub fn repository_config() -> RepositoryConfig<InvitationCategory> {
    RepositoryConfig::new(SortWhitelist::new(&["id", "name", "created_at"], "id"))
}
