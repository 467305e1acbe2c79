//! Credential service: registration and password verification
//!
//! Token issuance is not part of this service; callers turn the returned
//! [`UserProfile`] into a token. The stored hash never leaves this module.

use async_trait::async_trait;
use common::{TransactionProvider, TransactionScope};
use tracing::{debug, info};

use super::error::{Entity, ServiceError, ServiceResult, map_storage_error};
use crate::models::{NewUser, UserProfile};
use crate::password;
use crate::repositories::UserRepository;
use crate::validation::{validate_password, validate_username};

#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Create an account, storing only a hash of `password`
    async fn register(&self, username: &str, password: &str) -> ServiceResult<UserProfile>;

    /// Check a username/password pair
    ///
    /// Unknown usernames fail with `NotFound`, wrong passwords with
    /// `InvalidCredentials`.
    async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<UserProfile>;
}

/// Credential service backed by a user repository
pub struct CredentialServiceImpl<D, R> {
    db: D,
    users: R,
}

impl<D, R> CredentialServiceImpl<D, R> {
    pub fn new(db: D, users: R) -> Self {
        Self { db, users }
    }
}

#[async_trait]
impl<D, R> CredentialService for CredentialServiceImpl<D, R>
where
    D: TransactionProvider,
    R: UserRepository<D::Tx>,
{
    async fn register(&self, username: &str, password: &str) -> ServiceResult<UserProfile> {
        validate_username(username).map_err(ServiceError::Validation)?;
        validate_password(password).map_err(ServiceError::Validation)?;

        let new_user = NewUser {
            username: username.to_string(),
            password_hash: password::hash(password.to_string()).await?,
        };

        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .users
            .create(scope.handle(), &new_user)
            .await
            .map_err(|e| map_storage_error(Entity::User, e));
        let user = scope.finish(outcome).await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user.into())
    }

    async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<UserProfile> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some(user) = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| map_storage_error(Entity::User, e))?
        else {
            let decoy = password::decoy_hash().await?;
            password::verify(password.to_string(), decoy.as_str().to_string()).await?;
            return Err(ServiceError::NotFound(Entity::User));
        };

        if !password::verify(password.to_string(), user.password_hash.clone()).await? {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user.into())
    }
}
