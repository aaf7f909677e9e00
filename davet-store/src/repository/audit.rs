//! Audit stamping for mutating operations
//!
//! Parent tables carry `created_at`, `updated_at`, `created_by` and
//! `updated_by`. The repository fills them from an [`ActorId`] on every insert
//! and update; callers never write them directly.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::FieldValue;

/// Columns maintained by the audit stamper
pub const AUDIT_COLUMNS: [&str; 4] = ["created_at", "updated_at", "created_by", "updated_by"];

/// Identifier of the user performing a write
///
/// # Example
///
/// ```rust
/// use davet_store::repository::ActorId;
///
/// assert_eq!(ActorId::from_option(None), ActorId::UNKNOWN);
/// assert_eq!(ActorId::new(-5), ActorId::UNKNOWN);
/// assert_eq!(ActorId::new(42).get(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(i64);

impl ActorId {
    /// Stamp used when the acting user is not known
    pub const UNKNOWN: Self = Self(0);

    /// Actor for a user id; negative ids are treated as unknown
    #[must_use]
    pub const fn new(id: i64) -> Self {
        if id < 0 {
            Self::UNKNOWN
        } else {
            Self(id)
        }
    }

    /// Actor for an optional session user
    #[must_use]
    pub fn from_option(id: Option<i64>) -> Self {
        id.map_or(Self::UNKNOWN, Self::new)
    }

    /// Raw id as stored in `created_by` / `updated_by`
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this is the unknown-actor sentinel
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ActorId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

/// Audit columns as read back from a parent row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditStamp {
    /// When the row was inserted
    pub created_at: DateTime<Utc>,
    /// When the row was last written
    pub updated_at: DateTime<Utc>,
    /// Who inserted the row
    pub created_by: i64,
    /// Who last wrote the row
    pub updated_by: i64,
}

/// Column values stamped onto a new row
pub(crate) fn stamp_create(actor: ActorId, now: DateTime<Utc>) -> [(&'static str, FieldValue); 4] {
    [
        ("created_at", FieldValue::Timestamp(now)),
        ("updated_at", FieldValue::Timestamp(now)),
        ("created_by", FieldValue::Integer(actor.get())),
        ("updated_by", FieldValue::Integer(actor.get())),
    ]
}

/// Column values stamped onto an updated row
pub(crate) fn stamp_update(actor: ActorId, now: DateTime<Utc>) -> [(&'static str, FieldValue); 2] {
    [
        ("updated_at", FieldValue::Timestamp(now)),
        ("updated_by", FieldValue::Integer(actor.get())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_actor_sentinel() {
        assert!(ActorId::UNKNOWN.is_unknown());
        assert_eq!(ActorId::UNKNOWN.get(), 0);
        assert_eq!(ActorId::default(), ActorId::UNKNOWN);
        assert_eq!(ActorId::from(-1), ActorId::UNKNOWN);
        assert_eq!(ActorId::from_option(Some(7)).get(), 7);
    }

    #[test]
    fn test_create_stamp_sets_both_actors() {
        let now = Utc::now();
        let stamp = stamp_create(ActorId::new(9), now);
        let columns: Vec<_> = stamp.iter().map(|(column, _)| *column).collect();
        assert_eq!(columns, AUDIT_COLUMNS.to_vec());
        assert!(stamp.contains(&("created_by", FieldValue::Integer(9))));
        assert!(stamp.contains(&("updated_by", FieldValue::Integer(9))));
        assert!(stamp.contains(&("created_at", FieldValue::Timestamp(now))));
    }

    #[test]
    fn test_update_stamp_leaves_creation_alone() {
        let stamp = stamp_update(ActorId::UNKNOWN, Utc::now());
        assert!(stamp.iter().all(|(column, _)| !column.starts_with("created")));
        assert!(stamp.contains(&("updated_by", FieldValue::Integer(0))));
    }

    #[test]
    fn test_actor_serializes_as_number() {
        let json = serde_json::to_string(&ActorId::new(12)).unwrap();
        assert_eq!(json, "12");
    }
}
