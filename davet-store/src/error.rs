//! Crate error types

use std::fmt;

use thiserror::Error;

use crate::repository::{RepositoryError, RepositoryErrorKind};

// ============================================================================
// Structured Database Errors
// ============================================================================

/// Pool-level operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
    /// Establishing a database connection
    Connect,
    /// Running database migrations
    Migration,
    /// Acquiring a connection from the pool
    PoolAcquire,
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Migration => write!(f, "migration"),
            Self::PoolAcquire => write!(f, "pool_acquire"),
        }
    }
}

/// Category of database error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseErrorKind {
    /// Failed to establish connection
    ConnectionFailed,
    /// Migration could not be applied
    MigrationFailed,
    /// Configuration error (malformed URL, bad options)
    Configuration,
    /// Connection pool exhausted
    PoolExhausted,
    /// Other/unknown error
    Other,
}

impl fmt::Display for DatabaseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::MigrationFailed => write!(f, "migration_failed"),
            Self::Configuration => write!(f, "configuration"),
            Self::PoolExhausted => write!(f, "pool_exhausted"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured database error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    /// The operation being performed when the error occurred
    pub operation: DatabaseOperation,
    /// The category of error
    pub kind: DatabaseErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl DatabaseError {
    /// Create a new database error
    pub fn new(
        operation: DatabaseOperation,
        kind: DatabaseErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Categorize a driver error raised during `operation`
    pub fn from_sqlx(operation: DatabaseOperation, err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Configuration(_) => DatabaseErrorKind::Configuration,
            sqlx::Error::PoolTimedOut => DatabaseErrorKind::PoolExhausted,
            sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                DatabaseErrorKind::ConnectionFailed
            }
            sqlx::Error::Migrate(_) => DatabaseErrorKind::MigrationFailed,
            _ => DatabaseErrorKind::Other,
        };
        Self::new(operation, kind, err.to_string())
    }

    /// Check if this error is transient
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            DatabaseErrorKind::ConnectionFailed | DatabaseErrorKind::PoolExhausted
        )
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Database {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for DatabaseError {}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::new(
            DatabaseOperation::Migration,
            DatabaseErrorKind::MigrationFailed,
            err.to_string(),
        )
    }
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Pool or migration error
    #[error("{0}")]
    Database(DatabaseError),

    /// Repository or aggregate write error
    #[error("{0}")]
    Repository(Box<RepositoryError>),

    /// Entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name
        entity: String,
        /// Requested id
        id: String,
    },

    /// Rejected input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this is a typed "not found" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Repository error kind, when the error came from a repository
    pub fn repository_kind(&self) -> Option<RepositoryErrorKind> {
        match self {
            Self::Repository(err) => Some(err.kind),
            Self::NotFound { .. } => Some(RepositoryErrorKind::NotFound),
            _ => None,
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<DatabaseError> for Error {
    fn from(err: DatabaseError) -> Self {
        Error::Database(err)
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err.kind {
            RepositoryErrorKind::NotFound => Error::NotFound {
                entity: err.entity_type.clone().unwrap_or_else(|| "Entity".to_string()),
                id: err.entity_id.clone().unwrap_or_default(),
            },
            RepositoryErrorKind::ValidationFailed => Error::Validation(err.message),
            _ => Error::Repository(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_not_found_conversion() {
        let err = Error::from(RepositoryError::not_found("Card", 5));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Card not found: 5");
    }

    #[test]
    fn test_validation_conversion() {
        let err = Error::from(RepositoryError::validation_failed(
            RepositoryOperation::BulkDelete,
            "Refusing to run without a filter",
        ));
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("filter")));
    }

    #[test]
    fn test_other_repository_errors_are_kept_whole() {
        let err = Error::from(
            RepositoryError::timeout(RepositoryOperation::Create, "slow")
                .abort_transaction(RepositoryOperation::Create),
        );
        assert_eq!(
            err.repository_kind(),
            Some(RepositoryErrorKind::TransactionAborted)
        );
        let Error::Repository(inner) = err else {
            panic!("expected a repository error");
        };
        assert_eq!(inner.cause().map(|c| c.kind), Some(RepositoryErrorKind::Timeout));
    }

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::new(
            DatabaseOperation::Connect,
            DatabaseErrorKind::ConnectionFailed,
            "refused",
        );
        assert_eq!(
            err.to_string(),
            "Database connection_failed error during connect: refused"
        );
        assert!(err.is_retriable());
    }
}
