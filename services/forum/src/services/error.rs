//! Service error taxonomy and storage error translation

use std::fmt;

use common::DatabaseError;
use thiserror::Error;

use crate::jwt::TokenError;
use crate::password::PasswordError;

/// The kind of row an operation works on, used to word domain errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Topic,
    Post,
    Comment,
}

impl Entity {
    /// The entity this one references through its foreign key
    fn parent(self) -> Option<Entity> {
        match self {
            Entity::Post => Some(Entity::Topic),
            Entity::Comment => Some(Entity::Post),
            Entity::User | Entity::Topic => None,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::User => "user",
            Entity::Topic => "topic",
            Entity::Post => "post",
            Entity::Comment => "comment",
        })
    }
}

/// Errors returned by the domain services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or invalid input
    #[error("{0}")]
    Validation(String),

    #[error("username already exists")]
    DuplicateUsername,

    #[error("{0} already exists")]
    AlreadyExists(Entity),

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error("too many login attempts, try again later")]
    TooManyAttempts,

    /// Unclassified persistence failure
    #[error("storage error: {0}")]
    Storage(#[source] DatabaseError),

    /// Transaction, hashing or signing failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Transaction(_) | DatabaseError::Configuration(_) => {
                ServiceError::Internal(err.to_string())
            }
            other => ServiceError::Storage(other),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => ServiceError::InvalidToken,
            TokenError::Expired => ServiceError::ExpiredToken,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Translate a repository failure for an operation on `entity`.
///
/// Recognised constraint violations become domain errors; anything else is
/// passed through unchanged as a storage (or internal) error.
pub fn map_storage_error(entity: Entity, err: DatabaseError) -> ServiceError {
    match err {
        DatabaseError::UniqueViolation { .. } if entity == Entity::User => {
            ServiceError::DuplicateUsername
        }
        DatabaseError::UniqueViolation { .. } => ServiceError::AlreadyExists(entity),
        DatabaseError::ForeignKeyViolation { .. } => {
            ServiceError::NotFound(entity.parent().unwrap_or(entity))
        }
        DatabaseError::RowNotFound => ServiceError::NotFound(entity),
        other => ServiceError::from(other),
    }
}

/// Type alias for service results
pub type ServiceResult<T> = Result<T, ServiceError>;
