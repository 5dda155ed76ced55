/*
 * Responsibility
 * - Resolve a verified identity to its `users` row, creating it on first sight
 */
use crate::repos::error::RepoResult;
use crate::repos::user_repo::{NewUser, UserRow, UserStore};
use crate::services::auth::identity::VerifiedIdentity;

pub async fn ensure_user(store: &dyn UserStore, identity: &VerifiedIdentity) -> RepoResult<UserRow> {
    if let Some(row) = store.find_by_external_id(&identity.external_id).await? {
        return Ok(row);
    }

    let row = store
        .upsert(&NewUser {
            id: identity.subject,
            external_id: identity.external_id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            avatar_url: identity.avatar_url.clone(),
        })
        .await?;

    tracing::info!(user_id = %row.id, "user created on first login");
    Ok(row)
}
