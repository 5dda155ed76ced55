use serde::Serialize;
use uuid::Uuid;

use crate::api::extractors::AuthCtx;

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct UserSessionResponse {
    pub user: SessionUser,
}

impl From<AuthCtx> for UserSessionResponse {
    fn from(ctx: AuthCtx) -> Self {
        Self {
            user: SessionUser {
                id: ctx.user_id,
                name: ctx.name,
                avatar_url: ctx.avatar_url,
            },
        }
    }
}
