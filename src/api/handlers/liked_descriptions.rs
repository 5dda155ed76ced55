/*
 * Responsibility
 * - POST /like-description: save one alt text the caller liked
 * - GET /liked-descriptions: the caller's saved alt texts, newest first
 * - Rows are always scoped to AuthCtx.user_id; ids leave as public (sqids) ids
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::liked_descriptions::{
    LikedDescriptionListResponse, LikedDescriptionResponse, SaveLikedDescriptionRequest,
    SavedLikedDescriptionResponse,
};
use crate::api::extractors::{ApiJson, AuthCtxExtractor};
use crate::error::AppError;
use crate::repos::liked_description_repo::LikedDescriptionRow;
use crate::state::AppState;

fn row_to_response(
    state: &AppState,
    row: LikedDescriptionRow,
) -> Result<LikedDescriptionResponse, AppError> {
    Ok(LikedDescriptionResponse {
        id: state.id_codec.encode(row.id)?,
        user_id: row.user_id,
        description_type: row.description_type,
        description_text: row.description_text,
        description_origin: row.description_origin,
        subjects: row.subjects,
        target_audience: row.target_audience,
        created_at: row.created_at,
    })
}

pub async fn save_liked_description(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<SaveLikedDescriptionRequest>,
) -> Result<(StatusCode, Json<SavedLikedDescriptionResponse>), AppError> {
    let new = req.into_new(auth.user_id).map_err(AppError::validation)?;

    let row = state.liked_descriptions.insert(&new).await?;
    tracing::info!(user_id = %auth.user_id, liked_description_id = row.id, "description saved");

    Ok((
        StatusCode::CREATED,
        Json(SavedLikedDescriptionResponse {
            message: "Description saved successfully",
            data: row_to_response(&state, row)?,
        }),
    ))
}

pub async fn list_liked_descriptions(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<LikedDescriptionListResponse>, AppError> {
    let rows = state.liked_descriptions.list_for_user(auth.user_id).await?;

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        data.push(row_to_response(&state, row)?);
    }

    Ok(Json(LikedDescriptionListResponse { data }))
}
