//! Repositories for database operations
//!
//! One query interface per entity. Mutations take the transaction handle they
//! are bound to; reads go straight to the pool. The traits are generic over
//! the handle type so services can run against PostgreSQL or an in-memory
//! store.

use async_trait::async_trait;
use common::DatabaseResult;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::models::{
    Comment, CommentUpdate, NewComment, NewPost, NewTopic, NewUser, Post, PostUpdate, Topic,
    TopicInput, User,
};
use crate::password::HashedPassword;

pub mod comment;
pub mod post;
pub mod topic;
pub mod user;

pub use comment::PgCommentRepository;
pub use post::PgPostRepository;
pub use topic::PgTopicRepository;
pub use user::PgUserRepository;

/// Transaction handle used by the PostgreSQL repositories
pub type PgTx = Transaction<'static, Postgres>;

#[async_trait]
pub trait UserRepository<Tx: Send>: Send + Sync {
    async fn create(&self, tx: &mut Tx, new_user: &NewUser) -> DatabaseResult<User>;

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    async fn update_password(
        &self,
        tx: &mut Tx,
        id: Uuid,
        password_hash: &HashedPassword,
    ) -> DatabaseResult<Option<User>>;
}

#[async_trait]
pub trait TopicRepository<Tx: Send>: Send + Sync {
    /// All topics, newest first
    async fn list(&self) -> DatabaseResult<Vec<Topic>>;

    async fn create(&self, tx: &mut Tx, topic: &NewTopic) -> DatabaseResult<Topic>;

    /// Update a topic owned by `owner`; `None` when no such row exists
    async fn update(
        &self,
        tx: &mut Tx,
        id: Uuid,
        owner: Uuid,
        changes: &TopicInput,
    ) -> DatabaseResult<Option<Topic>>;

    /// Delete a topic owned by `owner`; `None` when no such row exists
    async fn delete(&self, tx: &mut Tx, id: Uuid, owner: Uuid) -> DatabaseResult<Option<Topic>>;
}

#[async_trait]
pub trait PostRepository<Tx: Send>: Send + Sync {
    /// Posts of a topic, newest first
    async fn list_by_topic(&self, topic_id: Uuid) -> DatabaseResult<Vec<Post>>;

    async fn create(&self, tx: &mut Tx, post: &NewPost) -> DatabaseResult<Post>;

    async fn update(
        &self,
        tx: &mut Tx,
        id: Uuid,
        owner: Uuid,
        changes: &PostUpdate,
    ) -> DatabaseResult<Option<Post>>;

    async fn delete(&self, tx: &mut Tx, id: Uuid, owner: Uuid) -> DatabaseResult<Option<Post>>;
}

#[async_trait]
pub trait CommentRepository<Tx: Send>: Send + Sync {
    /// Comments of a post, oldest first
    async fn list_by_post(&self, post_id: Uuid) -> DatabaseResult<Vec<Comment>>;

    async fn create(&self, tx: &mut Tx, comment: &NewComment) -> DatabaseResult<Comment>;

    async fn update(
        &self,
        tx: &mut Tx,
        id: Uuid,
        owner: Uuid,
        changes: &CommentUpdate,
    ) -> DatabaseResult<Option<Comment>>;

    async fn delete(&self, tx: &mut Tx, id: Uuid, owner: Uuid)
    -> DatabaseResult<Option<Comment>>;
}
