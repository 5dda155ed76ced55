/*
 * Responsibility
 * - SQLx operations for the `users` table
 * - Insert-or-get keyed on external_id (UNIQUE), so concurrent first logins converge on one row
 * - Rows are never updated or deleted from here
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<UserRow>>;

    // Returns the existing row untouched when external_id is already taken.
    async fn upsert(&self, user: &NewUser) -> RepoResult<UserRow>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepo {
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, external_id, email, name, avatar_url, created_at
            FROM users
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert(&self, user: &NewUser) -> RepoResult<UserRow> {
        // The self-assignment makes RETURNING yield the existing row on conflict
        // without changing any of its values.
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, external_id, email, name, avatar_url, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (external_id)
            DO UPDATE SET external_id = EXCLUDED.external_id
            RETURNING id, external_id, email, name, avatar_url, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }
}
