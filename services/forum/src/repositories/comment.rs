//! Comment repository for database operations

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::{CommentRepository, PgTx};
use crate::models::{Comment, CommentUpdate, NewComment};

/// Comment repository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new comment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository<PgTx> for PgCommentRepository {
    async fn list_by_post(&self, post_id: Uuid) -> DatabaseResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, username, content, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn create(&self, tx: &mut PgTx, comment: &NewComment) -> DatabaseResult<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, user_id, username, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, user_id, username, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(&comment.username)
        .bind(&comment.content)
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update(
        &self,
        tx: &mut PgTx,
        id: Uuid,
        owner: Uuid,
        changes: &CommentUpdate,
    ) -> DatabaseResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, post_id, user_id, username, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&changes.content)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn delete(
        &self,
        tx: &mut PgTx,
        id: Uuid,
        owner: Uuid,
    ) -> DatabaseResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND user_id = $2
            RETURNING id, post_id, user_id, username, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }
}
