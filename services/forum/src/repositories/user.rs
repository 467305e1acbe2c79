//! User repository for database operations

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{PgTx, UserRepository};
use crate::models::{NewUser, User};
use crate::password::HashedPassword;

/// User repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository<PgTx> for PgUserRepository {
    async fn create(&self, tx: &mut PgTx, new_user: &NewUser) -> DatabaseResult<User> {
        debug!(username = %new_user.username, "Inserting user");

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(new_user.password_hash.as_str())
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update_password(
        &self,
        tx: &mut PgTx,
        id: Uuid,
        password_hash: &HashedPassword,
    ) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(password_hash.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)
    }
}
