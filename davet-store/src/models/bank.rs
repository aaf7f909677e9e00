//! Bank catalog entries offered on business cards

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repository::{AuditStamp, Entity, FieldValue, Id, RepositoryConfig, SortWhitelist};

/// A bank with the IBAN shown by default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bank {
    pub id: Id,
    pub name: String,
    pub iban: String,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl Entity for Bank {
    const TABLE: &'static str = "banks";
    const NAME: &'static str = "Bank";
    const COLUMNS: &'static [&'static str] = &["name", "iban", "is_active"];

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.name.clone().into(),
            self.iban.clone().into(),
            self.is_active.into(),
        ]
    }
}

/// Sortable by id, name and creation time
pub fn repository_config() -> RepositoryConfig<Bank> {
    RepositoryConfig::new(SortWhitelist::new(&["id", "name", "created_at"], "id"))
}
