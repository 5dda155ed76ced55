/*
 * Responsibility
 * - POST /alt-text: run the alt text pipeline for the authenticated caller
 * - Nothing is persisted; saving is a separate, explicit call
 */
use axum::{Json, extract::State};

use crate::api::extractors::{ApiJson, AuthCtxExtractor};
use crate::error::AppError;
use crate::services::alt_text::{AltText, AltTextQuery};
use crate::state::AppState;

pub async fn generate_alt_text(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(query): ApiJson<AltTextQuery>,
) -> Result<Json<AltText>, AppError> {
    let alt_text = state.alt_text.run(query).await?;

    tracing::info!(user_id = %auth.user_id, "alt text generated");
    Ok(Json(alt_text))
}
