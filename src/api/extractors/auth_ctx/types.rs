/*
 * Responsibility
 * - The authenticated caller as handlers see it
 * - Built by the access middleware from the resolved `users` row
 */

use uuid::Uuid;

use crate::repos::user_repo::UserRow;

/// `user_id` is the internal user id (the identity service's UUID subject);
/// `external_id` is the OAuth provider's subject.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub external_id: String,
    pub name: String,
    pub avatar_url: String,
}

impl From<UserRow> for AuthCtx {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.id,
            external_id: row.external_id,
            name: row.name,
            avatar_url: row.avatar_url,
        }
    }
}
