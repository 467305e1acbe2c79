//! Topic repository for database operations

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::{PgTx, TopicRepository};
use crate::models::{NewTopic, Topic, TopicInput};

/// Topic repository
#[derive(Clone)]
pub struct PgTopicRepository {
    pool: PgPool,
}

impl PgTopicRepository {
    /// Create a new topic repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TopicRepository<PgTx> for PgTopicRepository {
    async fn list(&self) -> DatabaseResult<Vec<Topic>> {
        sqlx::query_as::<_, Topic>(
            r#"
            SELECT id, user_id, username, name, description, created_at, updated_at
            FROM topics
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn create(&self, tx: &mut PgTx, topic: &NewTopic) -> DatabaseResult<Topic> {
        sqlx::query_as::<_, Topic>(
            r#"
            INSERT INTO topics (id, user_id, username, name, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, username, name, description, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(topic.user_id)
        .bind(&topic.username)
        .bind(&topic.name)
        .bind(&topic.description)
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update(
        &self,
        tx: &mut PgTx,
        id: Uuid,
        owner: Uuid,
        changes: &TopicInput,
    ) -> DatabaseResult<Option<Topic>> {
        sqlx::query_as::<_, Topic>(
            r#"
            UPDATE topics
            SET name = $3, description = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, username, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&changes.name)
        .bind(&changes.description)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn delete(&self, tx: &mut PgTx, id: Uuid, owner: Uuid) -> DatabaseResult<Option<Topic>> {
        sqlx::query_as::<_, Topic>(
            r#"
            DELETE FROM topics
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, username, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }
}
