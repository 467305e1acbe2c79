//! Post repository for database operations

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::{PgTx, PostRepository};
use crate::models::{NewPost, Post, PostUpdate};

/// Post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository<PgTx> for PgPostRepository {
    async fn list_by_topic(&self, topic_id: Uuid) -> DatabaseResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, topic_id, user_id, username, title, content, created_at, updated_at
            FROM posts
            WHERE topic_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn create(&self, tx: &mut PgTx, post: &NewPost) -> DatabaseResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, topic_id, user_id, username, title, content)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, topic_id, user_id, username, title, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.topic_id)
        .bind(post.user_id)
        .bind(&post.username)
        .bind(&post.title)
        .bind(&post.content)
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update(
        &self,
        tx: &mut PgTx,
        id: Uuid,
        owner: Uuid,
        changes: &PostUpdate,
    ) -> DatabaseResult<Option<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $3, content = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, topic_id, user_id, username, title, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&changes.title)
        .bind(&changes.content)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn delete(&self, tx: &mut PgTx, id: Uuid, owner: Uuid) -> DatabaseResult<Option<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND user_id = $2
            RETURNING id, topic_id, user_id, username, title, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }
}
