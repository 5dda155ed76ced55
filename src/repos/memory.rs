//! In-memory stores mirroring the Postgres constraints (unique external_id, FK on user_id).
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::liked_description_repo::{
    LikedDescriptionRow, LikedDescriptionStore, NewLikedDescription,
};
use crate::repos::user_repo::{NewUser, UserRow, UserStore};

#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<Vec<UserRow>>,
}

impl MemoryUserRepo {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.rows.lock().unwrap().iter().any(|r| r.id == id)
    }
}

#[async_trait]
impl UserStore for MemoryUserRepo {
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<UserRow>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.external_id == external_id)
            .cloned())
    }

    async fn upsert(&self, user: &NewUser) -> RepoResult<UserRow> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter().find(|r| r.external_id == user.external_id) {
            return Ok(existing.clone());
        }
        if rows.iter().any(|r| r.id == user.id) {
            return Err(RepoError::Conflict);
        }
        let row = UserRow {
            id: user.id,
            external_id: user.external_id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }
}

/// Liked descriptions keyed to a `MemoryUserRepo` so the FK can be enforced.
pub struct MemoryLikedDescriptionRepo {
    users: std::sync::Arc<MemoryUserRepo>,
    rows: Mutex<Vec<LikedDescriptionRow>>,
    fail_inserts: bool,
}

impl MemoryLikedDescriptionRepo {
    pub fn new(users: std::sync::Arc<MemoryUserRepo>) -> Self {
        Self {
            users,
            rows: Mutex::new(Vec::new()),
            fail_inserts: false,
        }
    }

    pub fn failing(users: std::sync::Arc<MemoryUserRepo>) -> Self {
        Self {
            fail_inserts: true,
            ..Self::new(users)
        }
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl LikedDescriptionStore for MemoryLikedDescriptionRepo {
    async fn insert(&self, new: &NewLikedDescription) -> RepoResult<LikedDescriptionRow> {
        if self.fail_inserts {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }
        if !self.users.contains(new.user_id) {
            return Err(RepoError::Db(sqlx::Error::RowNotFound));
        }

        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        // Strictly increasing timestamps keep ordering deterministic.
        let created_at = Utc::now() + Duration::milliseconds(id);
        let row = LikedDescriptionRow {
            id,
            user_id: new.user_id,
            description_type: new.description_type.clone(),
            description_text: new.description_text.clone(),
            description_origin: new.description_origin.clone(),
            subjects: new.subjects.clone(),
            target_audience: new.target_audience.clone(),
            created_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<LikedDescriptionRow>> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}
