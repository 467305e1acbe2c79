//! User service

use async_trait::async_trait;
use common::{TransactionProvider, TransactionScope};
use tracing::info;
use uuid::Uuid;

use super::error::{Entity, ServiceError, ServiceResult, map_storage_error};
use crate::models::{AuthenticatedUser, UserProfile};
use crate::password;
use crate::repositories::UserRepository;
use crate::validation::validate_password;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn fetch_by_username(&self, username: &str) -> ServiceResult<UserProfile>;

    async fn fetch_by_id(&self, id: Uuid) -> ServiceResult<UserProfile>;

    /// Replace the caller's password after checking the current one
    async fn change_password(
        &self,
        identity: &AuthenticatedUser,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()>;
}

pub struct UserServiceImpl<D, R> {
    db: D,
    users: R,
}

impl<D, R> UserServiceImpl<D, R> {
    pub fn new(db: D, users: R) -> Self {
        Self { db, users }
    }
}

#[async_trait]
impl<D, R> UserService for UserServiceImpl<D, R>
where
    D: TransactionProvider,
    R: UserRepository<D::Tx>,
{
    async fn fetch_by_username(&self, username: &str) -> ServiceResult<UserProfile> {
        self.users
            .find_by_username(username)
            .await
            .map_err(|e| map_storage_error(Entity::User, e))?
            .map(UserProfile::from)
            .ok_or(ServiceError::NotFound(Entity::User))
    }

    async fn fetch_by_id(&self, id: Uuid) -> ServiceResult<UserProfile> {
        self.users
            .find_by_id(id)
            .await
            .map_err(|e| map_storage_error(Entity::User, e))?
            .map(UserProfile::from)
            .ok_or(ServiceError::NotFound(Entity::User))
    }

    async fn change_password(
        &self,
        identity: &AuthenticatedUser,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        validate_password(new_password).map_err(ServiceError::Validation)?;

        let user = self
            .users
            .find_by_id(identity.user_id)
            .await
            .map_err(|e| map_storage_error(Entity::User, e))?
            .ok_or(ServiceError::NotFound(Entity::User))?;

        if !password::verify(current_password.to_string(), user.password_hash).await? {
            return Err(ServiceError::InvalidCredentials);
        }

        let password_hash = password::hash(new_password.to_string()).await?;

        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .users
            .update_password(scope.handle(), identity.user_id, &password_hash)
            .await
            .map_err(|e| map_storage_error(Entity::User, e))
            .and_then(|row| row.ok_or(ServiceError::NotFound(Entity::User)));
        scope.finish(outcome).await?;

        info!(user_id = %identity.user_id, "Password changed");
        Ok(())
    }
}
