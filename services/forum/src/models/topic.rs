//! Topic model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Topic entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable topic fields, as sent by clients on create and update
#[derive(Debug, Clone, Deserialize)]
pub struct TopicInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// New topic creation payload
#[derive(Debug, Clone)]
pub struct NewTopic {
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub description: String,
}
