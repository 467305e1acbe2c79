//! Application state shared across handlers

use std::sync::Arc;

use common::StorageHealth;
use sqlx::PgPool;

use crate::jwt::JwtService;
use crate::repositories::{
    PgCommentRepository, PgPostRepository, PgTopicRepository, PgUserRepository,
};
use crate::services::{
    CommentService, CommentServiceImpl, CredentialService, CredentialServiceImpl, PostService,
    PostServiceImpl, TopicService, TopicServiceImpl, UserService, UserServiceImpl,
};
use crate::throttle::LoginThrottle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub login_throttle: LoginThrottle,
    pub storage: Arc<dyn StorageHealth>,
    pub credentials: Arc<dyn CredentialService>,
    pub users: Arc<dyn UserService>,
    pub topics: Arc<dyn TopicService>,
    pub posts: Arc<dyn PostService>,
    pub comments: Arc<dyn CommentService>,
}

impl AppState {
    /// Wire every service to the PostgreSQL pool
    pub fn postgres(pool: PgPool, jwt_service: JwtService, login_throttle: LoginThrottle) -> Self {
        Self {
            jwt_service,
            login_throttle,
            storage: Arc::new(pool.clone()),
            credentials: Arc::new(CredentialServiceImpl::new(
                pool.clone(),
                PgUserRepository::new(pool.clone()),
            )),
            users: Arc::new(UserServiceImpl::new(
                pool.clone(),
                PgUserRepository::new(pool.clone()),
            )),
            topics: Arc::new(TopicServiceImpl::new(
                pool.clone(),
                PgTopicRepository::new(pool.clone()),
            )),
            posts: Arc::new(PostServiceImpl::new(
                pool.clone(),
                PgPostRepository::new(pool.clone()),
            )),
            comments: Arc::new(CommentServiceImpl::new(
                pool.clone(),
                PgCommentRepository::new(pool),
            )),
        }
    }
}
