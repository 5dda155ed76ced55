/*
 * Responsibility
 * - GET /user-session: who the bearer token belongs to
 */
use axum::Json;

use crate::api::dto::user_session::UserSessionResponse;
use crate::api::extractors::AuthCtxExtractor;

pub async fn user_session(AuthCtxExtractor(auth): AuthCtxExtractor) -> Json<UserSessionResponse> {
    Json(auth.into())
}
