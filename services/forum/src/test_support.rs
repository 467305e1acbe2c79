//! In-memory storage double for service and router tests
//!
//! Each transaction works on a private copy of the tables that is written back
//! on commit. Reads see committed state only. Unique names, parent references
//! and topic cascades behave like the PostgreSQL schema.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use common::{
    DatabaseError, DatabaseResult, StorageHealth, TransactionHandle, TransactionProvider,
};
use uuid::Uuid;

use crate::jwt::{DEFAULT_TOKEN_EXPIRY, JwtConfig, JwtService};
use crate::models::{
    Comment, CommentUpdate, NewComment, NewPost, NewTopic, NewUser, Post, PostUpdate, Topic,
    TopicInput, User,
};
use crate::password::HashedPassword;
use crate::repositories::{CommentRepository, PostRepository, TopicRepository, UserRepository};
use crate::services::{
    CommentServiceImpl, CredentialServiceImpl, PostServiceImpl, TopicServiceImpl, UserServiceImpl,
};
use crate::state::AppState;
use crate::throttle::{LoginThrottle, ThrottleConfig};

/// Application state with every service backed by `db`
pub fn app_state(db: &MemoryDatabase) -> AppState {
    let jwt_service = JwtService::new(JwtConfig {
        secret: "test-signing-key".to_string(),
        token_expiry: DEFAULT_TOKEN_EXPIRY,
    })
    .unwrap();

    AppState {
        jwt_service,
        login_throttle: LoginThrottle::new(ThrottleConfig::default()),
        storage: Arc::new(db.clone()),
        credentials: Arc::new(CredentialServiceImpl::new(db.clone(), db.clone())),
        users: Arc::new(UserServiceImpl::new(db.clone(), db.clone())),
        topics: Arc::new(TopicServiceImpl::new(db.clone(), db.clone())),
        posts: Arc::new(PostServiceImpl::new(db.clone(), db.clone())),
        comments: Arc::new(CommentServiceImpl::new(db.clone(), db.clone())),
    }
}

/// Storage failure injected into the next write
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    UniqueViolation,
    Query,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    topics: Vec<Topic>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

#[derive(Default)]
struct State {
    tables: Tables,
    opened: usize,
    commits: usize,
    rollbacks: usize,
    fail_next_write: Option<Failure>,
    fail_next_commit: bool,
    unhealthy: bool,
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn fail_next_write(&self, failure: Failure) {
        self.lock().fail_next_write = Some(failure);
    }

    pub fn fail_next_commit(&self) {
        self.lock().fail_next_commit = true;
    }

    pub fn set_unhealthy(&self) {
        self.lock().unhealthy = true;
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().tables.users.clone()
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.lock().tables.topics.clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.lock().tables.posts.clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.lock().tables.comments.clone()
    }

    pub fn transactions_opened(&self) -> usize {
        self.lock().opened
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }

    fn injected_failure(&self) -> DatabaseResult<()> {
        match self.lock().fail_next_write.take() {
            None => Ok(()),
            Some(Failure::UniqueViolation) => Err(DatabaseError::UniqueViolation {
                constraint: Some("injected".to_string()),
            }),
            Some(Failure::Query) => Err(DatabaseError::Query(sqlx::Error::Protocol(
                "injected failure".to_string(),
            ))),
        }
    }
}

pub struct MemoryTx {
    db: MemoryDatabase,
    staged: Tables,
    open: bool,
}

impl MemoryTx {
    fn write(&mut self) -> DatabaseResult<&mut Tables> {
        self.db.injected_failure()?;
        Ok(&mut self.staged)
    }
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if self.open {
            self.db.lock().rollbacks += 1;
        }
    }
}

#[async_trait]
impl TransactionHandle for MemoryTx {
    async fn commit(mut self) -> DatabaseResult<()> {
        self.open = false;
        let mut state = self.db.lock();
        if mem::take(&mut state.fail_next_commit) {
            state.rollbacks += 1;
            return Err(DatabaseError::Transaction(sqlx::Error::PoolClosed));
        }
        state.tables = mem::take(&mut self.staged);
        state.commits += 1;
        Ok(())
    }

    async fn rollback(mut self) -> DatabaseResult<()> {
        self.open = false;
        self.db.lock().rollbacks += 1;
        Ok(())
    }
}

#[async_trait]
impl TransactionProvider for MemoryDatabase {
    type Tx = MemoryTx;

    async fn begin(&self) -> DatabaseResult<MemoryTx> {
        let staged = {
            let mut state = self.lock();
            state.opened += 1;
            state.tables.clone()
        };
        Ok(MemoryTx {
            db: self.clone(),
            staged,
            open: true,
        })
    }
}

#[async_trait]
impl StorageHealth for MemoryDatabase {
    async fn is_healthy(&self) -> bool {
        !self.lock().unhealthy
    }
}

fn unique(constraint: &str) -> DatabaseError {
    DatabaseError::UniqueViolation {
        constraint: Some(constraint.to_string()),
    }
}

fn foreign_key(constraint: &str) -> DatabaseError {
    DatabaseError::ForeignKeyViolation {
        constraint: Some(constraint.to_string()),
    }
}

#[async_trait]
impl UserRepository<MemoryTx> for MemoryDatabase {
    async fn create(&self, tx: &mut MemoryTx, new_user: &NewUser) -> DatabaseResult<User> {
        let tables = tx.write()?;
        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(unique("users_username_key"));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.as_str().to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        Ok(self
            .lock()
            .tables
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.lock().tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_password(
        &self,
        tx: &mut MemoryTx,
        id: Uuid,
        password_hash: &HashedPassword,
    ) -> DatabaseResult<Option<User>> {
        let tables = tx.write()?;
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.password_hash = password_hash.as_str().to_string();
            user.clone()
        }))
    }
}

#[async_trait]
impl TopicRepository<MemoryTx> for MemoryDatabase {
    async fn list(&self) -> DatabaseResult<Vec<Topic>> {
        Ok(self.lock().tables.topics.iter().rev().cloned().collect())
    }

    async fn create(&self, tx: &mut MemoryTx, topic: &NewTopic) -> DatabaseResult<Topic> {
        let tables = tx.write()?;
        if tables.topics.iter().any(|t| t.name == topic.name) {
            return Err(unique("topics_name_key"));
        }
        let now = Utc::now();
        let topic = Topic {
            id: Uuid::new_v4(),
            user_id: topic.user_id,
            username: topic.username.clone(),
            name: topic.name.clone(),
            description: topic.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.topics.push(topic.clone());
        Ok(topic)
    }

    async fn update(
        &self,
        tx: &mut MemoryTx,
        id: Uuid,
        owner: Uuid,
        changes: &TopicInput,
    ) -> DatabaseResult<Option<Topic>> {
        let tables = tx.write()?;
        let Some(index) = tables
            .topics
            .iter()
            .position(|t| t.id == id && t.user_id == owner)
        else {
            return Ok(None);
        };
        if tables
            .topics
            .iter()
            .any(|t| t.name == changes.name && t.id != id)
        {
            return Err(unique("topics_name_key"));
        }
        let topic = &mut tables.topics[index];
        topic.name = changes.name.clone();
        topic.description = changes.description.clone();
        topic.updated_at = Utc::now();
        Ok(Some(topic.clone()))
    }

    async fn delete(
        &self,
        tx: &mut MemoryTx,
        id: Uuid,
        owner: Uuid,
    ) -> DatabaseResult<Option<Topic>> {
        let tables = tx.write()?;
        let Some(index) = tables
            .topics
            .iter()
            .position(|t| t.id == id && t.user_id == owner)
        else {
            return Ok(None);
        };
        let topic = tables.topics.remove(index);

        let orphaned: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.topic_id == id)
            .map(|p| p.id)
            .collect();
        tables.posts.retain(|p| p.topic_id != id);
        tables.comments.retain(|c| !orphaned.contains(&c.post_id));
        Ok(Some(topic))
    }
}

#[async_trait]
impl PostRepository<MemoryTx> for MemoryDatabase {
    async fn list_by_topic(&self, topic_id: Uuid) -> DatabaseResult<Vec<Post>> {
        Ok(self
            .lock()
            .tables
            .posts
            .iter()
            .rev()
            .filter(|p| p.topic_id == topic_id)
            .cloned()
            .collect())
    }

    async fn create(&self, tx: &mut MemoryTx, post: &NewPost) -> DatabaseResult<Post> {
        let tables = tx.write()?;
        if !tables.topics.iter().any(|t| t.id == post.topic_id) {
            return Err(foreign_key("posts_topic_id_fkey"));
        }
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            topic_id: post.topic_id,
            user_id: post.user_id,
            username: post.username.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        tx: &mut MemoryTx,
        id: Uuid,
        owner: Uuid,
        changes: &PostUpdate,
    ) -> DatabaseResult<Option<Post>> {
        let tables = tx.write()?;
        Ok(tables
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.user_id == owner)
            .map(|post| {
                post.title = changes.title.clone();
                post.content = changes.content.clone();
                post.updated_at = Utc::now();
                post.clone()
            }))
    }

    async fn delete(&self, tx: &mut MemoryTx, id: Uuid, owner: Uuid) -> DatabaseResult<Option<Post>> {
        let tables = tx.write()?;
        let Some(index) = tables
            .posts
            .iter()
            .position(|p| p.id == id && p.user_id == owner)
        else {
            return Ok(None);
        };
        tables.comments.retain(|c| c.post_id != id);
        Ok(Some(tables.posts.remove(index)))
    }
}

#[async_trait]
impl CommentRepository<MemoryTx> for MemoryDatabase {
    async fn list_by_post(&self, post_id: Uuid) -> DatabaseResult<Vec<Comment>> {
        Ok(self
            .lock()
            .tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn create(&self, tx: &mut MemoryTx, comment: &NewComment) -> DatabaseResult<Comment> {
        let tables = tx.write()?;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(foreign_key("comments_post_id_fkey"));
        }
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            user_id: comment.user_id,
            username: comment.username.clone(),
            content: comment.content.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update(
        &self,
        tx: &mut MemoryTx,
        id: Uuid,
        owner: Uuid,
        changes: &CommentUpdate,
    ) -> DatabaseResult<Option<Comment>> {
        let tables = tx.write()?;
        Ok(tables
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.user_id == owner)
            .map(|comment| {
                comment.content = changes.content.clone();
                comment.updated_at = Utc::now();
                comment.clone()
            }))
    }

    async fn delete(
        &self,
        tx: &mut MemoryTx,
        id: Uuid,
        owner: Uuid,
    ) -> DatabaseResult<Option<Comment>> {
        let tables = tx.write()?;
        let Some(index) = tables
            .comments
            .iter()
            .position(|c| c.id == id && c.user_id == owner)
        else {
            return Ok(None);
        };
        Ok(Some(tables.comments.remove(index)))
    }
}
