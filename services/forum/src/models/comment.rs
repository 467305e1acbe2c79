//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Comment entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client payload for creating a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub post_id: Uuid,
    pub content: String,
}

/// Client payload for updating a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CommentUpdate {
    pub content: String,
}

/// New comment creation payload
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
}
