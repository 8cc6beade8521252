//! Database error types for lerni-db.

use lerni_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        Self::Core(CoreError::not_found(entity_type, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Core(CoreError::validation(message))
    }

    /// The domain error, if this is one.
    #[must_use]
    pub const fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the operation may succeed if tried again.
    ///
    /// Only lock contention on the database file qualifies. Domain errors,
    /// constraint violations, and malformed data never do.
    /// Matched on the primary result code, so extended codes such as
    /// `SQLITE_BUSY_SNAPSHOT` count too.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::LibSql(
                libsql::Error::SqliteFailure(code, _)
                | libsql::Error::RemoteSqliteFailure(code, _, _),
            ) => matches!(*code & 0xff, SQLITE_BUSY | SQLITE_LOCKED),
            _ => false,
        }
    }
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
