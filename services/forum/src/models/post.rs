//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Post entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client payload for creating a post
#[derive(Debug, Clone, Deserialize)]
pub struct PostInput {
    pub topic_id: Uuid,
    pub title: String,
    pub content: String,
}

/// Client payload for updating a post
#[derive(Debug, Clone, Deserialize)]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
}

/// New post creation payload
#[derive(Debug, Clone)]
pub struct NewPost {
    pub topic_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub title: String,
    pub content: String,
}
