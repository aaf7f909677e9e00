//! Repository error types
//!
//! Every repository and aggregate-writer failure is reported as a
//! [`RepositoryError`]: the operation that failed, a coarse [`RepositoryErrorKind`]
//! callers can branch on, a message that is safe to show, and the entity involved.
//! Low-level driver errors are logged where they are categorized and never copied
//! verbatim into the message.
//!
//! # Example
//!
//! ```rust
//! use davet_store::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Card", 42);
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert_eq!(error.entity_id.as_deref(), Some("42"));
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Loading a single entity by ID
    FindById,
    /// Listing a page of entities
    FindAll,
    /// Counting entities
    Count,
    /// Checking if an entity exists
    Exists,
    /// Inserting a new entity
    Create,
    /// Patching an existing entity
    Update,
    /// Deleting an entity
    Delete,
    /// Inserting several entities
    BulkCreate,
    /// Patching every entity matching a predicate
    BulkUpdate,
    /// Deleting every entity matching a predicate
    BulkDelete,
    /// Eager loading related rows
    LoadRelations,
    /// Beginning, committing or rolling back a transaction
    Transaction,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindById => write!(f, "find_by_id"),
            Self::FindAll => write!(f, "find_all"),
            Self::Count => write!(f, "count"),
            Self::Exists => write!(f, "exists"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::BulkCreate => write!(f, "bulk_create"),
            Self::BulkUpdate => write!(f, "bulk_update"),
            Self::BulkDelete => write!(f, "bulk_delete"),
            Self::LoadRelations => write!(f, "load_relations"),
            Self::Transaction => write!(f, "transaction"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Entity already exists (unique key)
    AlreadyExists,
    /// Foreign key, not-null or check constraint violation
    ConstraintViolation,
    /// Input rejected before any SQL was built
    ValidationFailed,
    /// Failed to reach the database
    ConnectionFailed,
    /// Deadline expired or pool acquisition timed out
    Timeout,
    /// The caller cancelled the operation
    Cancelled,
    /// A step of an aggregate write failed and the transaction was rolled back
    TransactionAborted,
    /// Underlying database error
    DatabaseError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::TransactionAborted => write!(f, "transaction_aborted"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
///
/// Aggregate writes wrap the error of the failing step in a
/// [`RepositoryErrorKind::TransactionAborted`] error; the step error stays
/// reachable through [`RepositoryError::cause`] and [`std::error::Error::source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Card", "Invitation")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
    cause: Option<Box<RepositoryError>>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            cause: None,
        }
    }

    /// Create a "not found" error with entity context
    ///
    /// # Example
    ///
    /// ```rust
    /// use davet_store::repository::RepositoryError;
    ///
    /// let error = RepositoryError::not_found("Invitation", 7);
    /// assert_eq!(error.entity_type.as_deref(), Some("Invitation"));
    /// ```
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl fmt::Display) -> Self {
        Self::new(
            RepositoryOperation::FindById,
            RepositoryErrorKind::NotFound,
            "Entity not found",
        )
        .with_entity(entity_type, entity_id.to_string())
    }

    /// Create a validation failed error
    pub fn validation_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::ValidationFailed, message)
    }

    /// Create a timeout error
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Create a cancellation error
    pub fn cancelled(operation: RepositoryOperation) -> Self {
        Self::new(
            operation,
            RepositoryErrorKind::Cancelled,
            "Operation cancelled by caller",
        )
    }

    /// Categorize a driver error
    ///
    /// The driver error is logged here; only its category reaches the message.
    pub fn from_sqlx(operation: RepositoryOperation, err: sqlx::Error) -> Self {
        let (kind, message) = match &err {
            sqlx::Error::RowNotFound => (RepositoryErrorKind::NotFound, "Entity not found"),
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    (RepositoryErrorKind::AlreadyExists, "Entity already exists")
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => (
                    RepositoryErrorKind::ConstraintViolation,
                    "Referenced entity does not exist",
                ),
                sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => (
                    RepositoryErrorKind::ConstraintViolation,
                    "Constraint violation",
                ),
                _ => (RepositoryErrorKind::DatabaseError, "Database query failed"),
            },
            sqlx::Error::PoolTimedOut => (
                RepositoryErrorKind::Timeout,
                "Timed out waiting for a database connection",
            ),
            sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => (
                RepositoryErrorKind::ConnectionFailed,
                "Database connection failed",
            ),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                (RepositoryErrorKind::DatabaseError, "Failed to decode row")
            }
            _ => (RepositoryErrorKind::DatabaseError, "Database operation failed"),
        };

        if kind == RepositoryErrorKind::NotFound {
            tracing::debug!(%operation, "no matching row");
        } else {
            tracing::error!(%operation, %kind, error = %err, "database operation failed");
        }

        Self::new(operation, kind, message)
    }

    /// Wrap the error of a failed aggregate step
    ///
    /// `NotFound` is returned unchanged so callers can keep treating a missing
    /// aggregate root as a typed outcome; every other error becomes
    /// `TransactionAborted` with the step error as its cause.
    #[must_use]
    pub fn abort_transaction(self, operation: RepositoryOperation) -> Self {
        if matches!(
            self.kind,
            RepositoryErrorKind::NotFound | RepositoryErrorKind::TransactionAborted
        ) {
            return self;
        }
        Self {
            operation,
            kind: RepositoryErrorKind::TransactionAborted,
            message: format!("Transaction rolled back: {}", self.message),
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
            cause: Some(Box::new(self)),
        }
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Add the entity type only (for set-oriented operations)
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// The step error wrapped by a `TransactionAborted` error
    pub fn cause(&self) -> Option<&RepositoryError> {
        self.cause.as_deref()
    }

    /// Whether this is a typed "not found" outcome
    pub fn is_not_found(&self) -> bool {
        self.kind == RepositoryErrorKind::NotFound
    }

    /// Check if this error is transient
    ///
    /// Nothing in this crate retries; the flag is for callers that want to.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        match (&self.entity_type, &self.entity_id) {
            (Some(entity_type), Some(entity_id)) => write!(f, " [{}: {}]", entity_type, entity_id),
            (Some(entity_type), None) => write!(f, " [{}]", entity_type),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_repository_operation_display() {
        assert_eq!(format!("{}", RepositoryOperation::FindById), "find_by_id");
        assert_eq!(format!("{}", RepositoryOperation::BulkUpdate), "bulk_update");
        assert_eq!(
            format!("{}", RepositoryOperation::LoadRelations),
            "load_relations"
        );
        assert_eq!(format!("{}", RepositoryOperation::Transaction), "transaction");
    }

    #[test]
    fn test_repository_error_kind_display() {
        assert_eq!(format!("{}", RepositoryErrorKind::NotFound), "not_found");
        assert_eq!(format!("{}", RepositoryErrorKind::Cancelled), "cancelled");
        assert_eq!(
            format!("{}", RepositoryErrorKind::TransactionAborted),
            "transaction_aborted"
        );
    }

    #[test]
    fn test_not_found_convenience() {
        let error = RepositoryError::not_found("Card", 12);
        assert_eq!(error.operation, RepositoryOperation::FindById);
        assert!(error.is_not_found());
        assert_eq!(error.entity_type, Some("Card".to_string()));
        assert_eq!(error.entity_id, Some("12".to_string()));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error =
            RepositoryError::from_sqlx(RepositoryOperation::Update, sqlx::Error::RowNotFound);
        assert_eq!(error.kind, RepositoryErrorKind::NotFound);
        assert_eq!(error.operation, RepositoryOperation::Update);
    }

    #[test]
    fn test_pool_timeout_is_retriable() {
        let error =
            RepositoryError::from_sqlx(RepositoryOperation::FindAll, sqlx::Error::PoolTimedOut);
        assert_eq!(error.kind, RepositoryErrorKind::Timeout);
        assert!(error.is_retriable());
    }

    #[test]
    fn test_abort_transaction_wraps_step_error() {
        let step = RepositoryError::new(
            RepositoryOperation::Create,
            RepositoryErrorKind::ConstraintViolation,
            "Referenced entity does not exist",
        )
        .with_entity_type("CardSocialMedia");

        let aborted = step.clone().abort_transaction(RepositoryOperation::Create);
        assert_eq!(aborted.kind, RepositoryErrorKind::TransactionAborted);
        assert_eq!(aborted.cause(), Some(&step));
        assert!(aborted.source().is_some());
        assert!(aborted.message.contains("Referenced entity does not exist"));
    }

    #[test]
    fn test_abort_transaction_keeps_not_found() {
        let error = RepositoryError::not_found("Invitation", 3)
            .abort_transaction(RepositoryOperation::Update);
        assert!(error.is_not_found());
        assert!(error.cause().is_none());
    }

    #[test]
    fn test_display_with_entity() {
        let error = RepositoryError::not_found("Card", 5);
        let display = format!("{}", error);
        assert!(display.contains("not_found"));
        assert!(display.contains("find_by_id"));
        assert!(display.contains("[Card: 5]"));
    }

    #[test]
    fn test_display_with_entity_type_only() {
        let error =
            RepositoryError::validation_failed(RepositoryOperation::BulkDelete, "empty predicate")
                .with_entity_type("Bank");
        assert!(format!("{}", error).ends_with("[Bank]"));
    }
}
