/*
 * Responsibility
 * - liked_descriptions insert / list
 * - Every query is scoped by user_id (FK to users.id, ON DELETE CASCADE)
 * - List order is part of the contract: newest first
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, sqlx::FromRow, PartialEq, Eq)]
pub struct LikedDescriptionRow {
    pub id: i64,
    pub user_id: Uuid,
    pub description_type: String,
    pub description_text: String,
    pub description_origin: String,
    pub subjects: String,
    pub target_audience: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLikedDescription {
    pub user_id: Uuid,
    pub description_type: String,
    pub description_text: String,
    pub description_origin: String,
    pub subjects: String,
    pub target_audience: String,
}

#[async_trait]
pub trait LikedDescriptionStore: Send + Sync {
    async fn insert(&self, new: &NewLikedDescription) -> RepoResult<LikedDescriptionRow>;

    /// All rows owned by `user_id`, ordered by `created_at DESC, id DESC`.
    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<LikedDescriptionRow>>;
}

#[derive(Clone, Debug)]
pub struct PgLikedDescriptionRepo {
    pool: PgPool,
}

impl PgLikedDescriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikedDescriptionStore for PgLikedDescriptionRepo {
    async fn insert(&self, new: &NewLikedDescription) -> RepoResult<LikedDescriptionRow> {
        let row = sqlx::query_as::<_, LikedDescriptionRow>(
            r#"
            INSERT INTO liked_descriptions (
                user_id, description_type, description_text,
                description_origin, subjects, target_audience
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, user_id, description_type, description_text,
                description_origin, subjects, target_audience, created_at
            "#,
        )
        .bind(new.user_id)
        .bind(&new.description_type)
        .bind(&new.description_text)
        .bind(&new.description_origin)
        .bind(&new.subjects)
        .bind(&new.target_audience)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<LikedDescriptionRow>> {
        let rows = sqlx::query_as::<_, LikedDescriptionRow>(
            r#"
            SELECT
                id, user_id, description_type, description_text,
                description_origin, subjects, target_audience, created_at
            FROM liked_descriptions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
