//! Storage error types shared by every service
//!
//! Raw `sqlx` failures are classified exactly once, where they occur, into
//! [`DatabaseError`]. Callers inspect the variant instead of digging through
//! driver-specific error codes.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while acquiring or talking to a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {}", constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },

    /// A foreign key constraint rejected the write
    #[error("Foreign key constraint violated: {}", constraint.as_deref().unwrap_or("unknown"))]
    ForeignKeyViolation { constraint: Option<String> },

    /// A query that must return a row returned none
    #[error("Row not found")]
    RowNotFound,

    /// Beginning, committing or rolling back a transaction failed
    #[error("Database transaction error: {0}")]
    Transaction(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify an error returned by a query.
    ///
    /// Recognised constraint codes become their own variants; everything else
    /// is kept verbatim as [`DatabaseError::Query`] or
    /// [`DatabaseError::Connection`].
    pub fn from_query(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => DatabaseError::RowNotFound,
            SqlxError::Database(db_err) => {
                let constraint = db_err.constraint().map(str::to_owned);
                match db_err.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => DatabaseError::UniqueViolation { constraint },
                    Some(FOREIGN_KEY_VIOLATION) => {
                        DatabaseError::ForeignKeyViolation { constraint }
                    }
                    _ => DatabaseError::Query(err),
                }
            }
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                DatabaseError::Connection(err)
            }
            _ => DatabaseError::Query(err),
        }
    }

    /// Whether the storage engine rejected the write because of a constraint,
    /// as opposed to a connectivity or query failure.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::UniqueViolation { .. } | DatabaseError::ForeignKeyViolation { .. }
        )
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
