//! Comment service

use async_trait::async_trait;
use common::{TransactionProvider, TransactionScope};
use tracing::info;
use uuid::Uuid;

use super::error::{Entity, ServiceError, ServiceResult, map_storage_error};
use crate::models::{AuthenticatedUser, Comment, CommentInput, CommentUpdate, NewComment};
use crate::repositories::CommentRepository;
use crate::validation::validate_required;

#[async_trait]
pub trait CommentService: Send + Sync {
    /// Comments of a post, oldest first
    async fn list_by_post(&self, post_id: Uuid) -> ServiceResult<Vec<Comment>>;

    /// Create a comment; a missing post is reported as `NotFound(Post)`
    async fn create(
        &self,
        identity: &AuthenticatedUser,
        input: CommentInput,
    ) -> ServiceResult<Comment>;

    async fn update(
        &self,
        identity: &AuthenticatedUser,
        id: Uuid,
        input: CommentUpdate,
    ) -> ServiceResult<Comment>;

    async fn delete(&self, identity: &AuthenticatedUser, id: Uuid) -> ServiceResult<Comment>;
}

fn validate(content: &str) -> ServiceResult<()> {
    validate_required("Content", content, None).map_err(ServiceError::Validation)
}

pub struct CommentServiceImpl<D, R> {
    db: D,
    comments: R,
}

impl<D, R> CommentServiceImpl<D, R> {
    pub fn new(db: D, comments: R) -> Self {
        Self { db, comments }
    }
}

#[async_trait]
impl<D, R> CommentService for CommentServiceImpl<D, R>
where
    D: TransactionProvider,
    R: CommentRepository<D::Tx>,
{
    async fn list_by_post(&self, post_id: Uuid) -> ServiceResult<Vec<Comment>> {
        self.comments
            .list_by_post(post_id)
            .await
            .map_err(|e| map_storage_error(Entity::Comment, e))
    }

    async fn create(
        &self,
        identity: &AuthenticatedUser,
        input: CommentInput,
    ) -> ServiceResult<Comment> {
        validate(&input.content)?;

        let new_comment = NewComment {
            post_id: input.post_id,
            user_id: identity.user_id,
            username: identity.username.clone(),
            content: input.content,
        };

        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .comments
            .create(scope.handle(), &new_comment)
            .await
            .map_err(|e| map_storage_error(Entity::Comment, e));
        let comment = scope.finish(outcome).await?;

        info!(comment_id = %comment.id, post_id = %comment.post_id, "Comment created");
        Ok(comment)
    }

    async fn update(
        &self,
        identity: &AuthenticatedUser,
        id: Uuid,
        input: CommentUpdate,
    ) -> ServiceResult<Comment> {
        validate(&input.content)?;

        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .comments
            .update(scope.handle(), id, identity.user_id, &input)
            .await
            .map_err(|e| map_storage_error(Entity::Comment, e))
            .and_then(|row| row.ok_or(ServiceError::NotFound(Entity::Comment)));
        scope.finish(outcome).await
    }

    async fn delete(&self, identity: &AuthenticatedUser, id: Uuid) -> ServiceResult<Comment> {
        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .comments
            .delete(scope.handle(), id, identity.user_id)
            .await
            .map_err(|e| map_storage_error(Entity::Comment, e))
            .and_then(|row| row.ok_or(ServiceError::NotFound(Entity::Comment)));
        scope.finish(outcome).await
    }
}
