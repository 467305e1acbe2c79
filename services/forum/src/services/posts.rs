//! Post service

use async_trait::async_trait;
use common::{TransactionProvider, TransactionScope};
use tracing::info;
use uuid::Uuid;

use super::error::{Entity, ServiceError, ServiceResult, map_storage_error};
use crate::models::{AuthenticatedUser, NewPost, Post, PostInput, PostUpdate};
use crate::repositories::PostRepository;
use crate::validation::{MAX_TITLE_LENGTH, validate_required};

#[async_trait]
pub trait PostService: Send + Sync {
    /// Posts of a topic, newest first
    async fn list_by_topic(&self, topic_id: Uuid) -> ServiceResult<Vec<Post>>;

    /// Create a post; a missing topic is reported as `NotFound(Topic)`
    async fn create(&self, identity: &AuthenticatedUser, input: PostInput) -> ServiceResult<Post>;

    async fn update(
        &self,
        identity: &AuthenticatedUser,
        id: Uuid,
        input: PostUpdate,
    ) -> ServiceResult<Post>;

    async fn delete(&self, identity: &AuthenticatedUser, id: Uuid) -> ServiceResult<Post>;
}

fn validate(title: &str, content: &str) -> ServiceResult<()> {
    validate_required("Title", title, Some(MAX_TITLE_LENGTH))
        .and_then(|_| validate_required("Content", content, None))
        .map_err(ServiceError::Validation)
}

pub struct PostServiceImpl<D, R> {
    db: D,
    posts: R,
}

impl<D, R> PostServiceImpl<D, R> {
    pub fn new(db: D, posts: R) -> Self {
        Self { db, posts }
    }
}

#[async_trait]
impl<D, R> PostService for PostServiceImpl<D, R>
where
    D: TransactionProvider,
    R: PostRepository<D::Tx>,
{
    async fn list_by_topic(&self, topic_id: Uuid) -> ServiceResult<Vec<Post>> {
        self.posts
            .list_by_topic(topic_id)
            .await
            .map_err(|e| map_storage_error(Entity::Post, e))
    }

    async fn create(&self, identity: &AuthenticatedUser, input: PostInput) -> ServiceResult<Post> {
        validate(&input.title, &input.content)?;

        let new_post = NewPost {
            topic_id: input.topic_id,
            user_id: identity.user_id,
            username: identity.username.clone(),
            title: input.title,
            content: input.content,
        };

        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .posts
            .create(scope.handle(), &new_post)
            .await
            .map_err(|e| map_storage_error(Entity::Post, e));
        let post = scope.finish(outcome).await?;

        info!(post_id = %post.id, topic_id = %post.topic_id, "Post created");
        Ok(post)
    }

    async fn update(
        &self,
        identity: &AuthenticatedUser,
        id: Uuid,
        input: PostUpdate,
    ) -> ServiceResult<Post> {
        validate(&input.title, &input.content)?;

        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .posts
            .update(scope.handle(), id, identity.user_id, &input)
            .await
            .map_err(|e| map_storage_error(Entity::Post, e))
            .and_then(|row| row.ok_or(ServiceError::NotFound(Entity::Post)));
        scope.finish(outcome).await
    }

    async fn delete(&self, identity: &AuthenticatedUser, id: Uuid) -> ServiceResult<Post> {
        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .posts
            .delete(scope.handle(), id, identity.user_id)
            .await
            .map_err(|e| map_storage_error(Entity::Post, e))
            .and_then(|row| row.ok_or(ServiceError::NotFound(Entity::Post)));
        let post = scope.finish(outcome).await?;

        info!(post_id = %post.id, user_id = %identity.user_id, "Post deleted");
        Ok(post)
    }
}
