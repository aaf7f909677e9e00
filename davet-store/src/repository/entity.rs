//! Entity description consumed by the generic repository
//!
//! An [`Entity`] tells the repository which table it lives in, which columns are
//! writable and how to read its values back out. Everything else (sorting,
//! eager loading) is configured per repository instance through
//! [`RepositoryConfig`](super::RepositoryConfig).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::audit::AUDIT_COLUMNS;
use super::error::{RepositoryError, RepositoryOperation};

/// Primary key type shared by every table
pub type Id = i64;

/// A persisted entity
///
/// `COLUMNS` lists the writable columns in the same order as [`Entity::values`].
/// The `id` column and, for audited entities, the audit columns are managed by
/// the repository and must not appear in `COLUMNS`.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
    /// Table name
    const TABLE: &'static str;

    /// Display name used in errors and logs
    const NAME: &'static str;

    /// Writable columns
    const COLUMNS: &'static [&'static str];

    /// Whether the table carries `created_*` / `updated_*` audit columns
    const AUDITED: bool = true;

    /// Column holding the owning user's id, for owner-scoped listings
    const OWNER_COLUMN: Option<&'static str> = None;

    /// Primary key of a loaded row
    fn id(&self) -> Id;

    /// Values of the writable columns, aligned with `COLUMNS`
    fn values(&self) -> Vec<FieldValue>;

    /// Patch overwriting every writable column with this entity's values
    fn patch(&self) -> FieldPatch {
        Self::COLUMNS
            .iter()
            .zip(self.values())
            .fold(FieldPatch::new(), |patch, (column, value)| {
                patch.set(*column, value)
            })
    }

    /// Whether `column` may appear in a filter predicate
    fn is_known_column(column: &str) -> bool {
        column == "id"
            || Self::COLUMNS.contains(&column)
            || (Self::AUDITED && AUDIT_COLUMNS.contains(&column))
    }
}

/// A row owned by a parent aggregate root through a foreign key
pub trait ChildEntity: Entity {
    /// Foreign key column referencing the parent's id
    const PARENT_KEY: &'static str;

    /// Current parent id
    fn parent_id(&self) -> Id;

    /// Point this row at `parent_id`
    fn set_parent_id(&mut self, parent_id: Id);
}

/// A column value written by inserts and patches
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// SQL NULL
    Null,
    /// Boolean (stored as INTEGER)
    Bool(bool),
    /// 64-bit integer
    Integer(i64),
    /// 64-bit float
    Float(f64),
    /// Text
    Text(String),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl FieldValue {
    pub(crate) fn push_bind(self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Self::Null => qb.push("NULL"),
            Self::Bool(value) => qb.push_bind(value),
            Self::Integer(value) => qb.push_bind(value),
            Self::Float(value) => qb.push_bind(value),
            Self::Text(value) => qb.push_bind(value),
            Self::Timestamp(value) => qb.push_bind(value),
        };
    }
}

/// Sparse column update
///
/// Only the named columns change. Setting a column twice keeps the last value.
///
/// # Example
///
/// ```rust
/// use davet_store::repository::FieldPatch;
///
/// let patch = FieldPatch::new()
///     .set("name", "Kart")
///     .set("is_active", false)
///     .set("name", "Yeni Kart");
/// assert_eq!(patch.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldPatch {
    fields: Vec<(String, FieldValue)>,
}

impl FieldPatch {
    /// Create an empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(existing) => existing.1 = value,
            None => self.fields.push((column, value)),
        }
        self
    }

    /// Number of columns touched
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no column is touched
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column/value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(column, value)| (column.as_str(), value))
    }

    /// Reject columns `E` does not declare as writable
    pub(crate) fn validate<E: Entity>(
        &self,
        operation: RepositoryOperation,
    ) -> Result<(), RepositoryError> {
        match self
            .fields
            .iter()
            .find(|(column, _)| !E::COLUMNS.contains(&column.as_str()))
        {
            Some((column, _)) => Err(RepositoryError::validation_failed(
                operation,
                format!("Column '{}' is not writable", column),
            )
            .with_entity_type(E::NAME)),
            None => Ok(()),
        }
    }
}

/// Sort columns an entity may be ordered by, plus the fallback
///
/// # Example
///
/// ```rust
/// use davet_store::repository::SortWhitelist;
///
/// let whitelist = SortWhitelist::new(&["id", "name", "created_at"], "id");
/// assert_eq!(whitelist.resolve("name"), "name");
/// assert_eq!(whitelist.resolve("password; --"), "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortWhitelist {
    columns: Vec<&'static str>,
    default_column: &'static str,
}

impl SortWhitelist {
    /// Build a whitelist; `default_column` is always sortable
    pub fn new(columns: &[&'static str], default_column: &'static str) -> Self {
        let mut columns = columns.to_vec();
        if !columns.contains(&default_column) {
            columns.push(default_column);
        }
        Self {
            columns,
            default_column,
        }
    }

    /// Column actually used for `requested`
    ///
    /// Anything outside the whitelist silently becomes the default column.
    pub fn resolve(&self, requested: &str) -> &'static str {
        self.columns
            .iter()
            .copied()
            .find(|column| *column == requested)
            .unwrap_or(self.default_column)
    }

    /// The fallback sort column
    pub fn default_column(&self) -> &'static str {
        self.default_column
    }

    /// Whether `column` is sortable
    pub fn allows(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }
}

impl Default for SortWhitelist {
    fn default() -> Self {
        Self::new(&["id"], "id")
    }
}
