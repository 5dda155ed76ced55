/*
 * Responsibility
 * - GET /auth/google: redirect to Google's consent screen with a signed `state`
 * - GET /auth/google/callback: code -> Google tokens -> identity-service session -> users row,
 *   then hand the session to the frontend in the URL fragment
 * - GET /logout: revoke the bearer session at the identity service (if one was sent)
 */
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::Redirect,
};
use serde::Deserialize;
use url::Url;

use crate::api::dto::messages::MessageResponse;
use crate::error::AppError;
use crate::services::auth::google::{GoogleUserInfo, OAuthError};
use crate::services::auth::identity::{
    ANONYMOUS_NAME, IdentityError, IdentitySession, VerifiedIdentity,
};
use crate::services::auth::token_verifier::bearer_token;
use crate::services::users::ensure_user;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn google_login(State(state): State<AppState>) -> Redirect {
    let url = state.oauth.authorization_url(&state.oauth_state.issue());
    Redirect::to(url.as_str())
}

fn oauth_failure(err: OAuthError) -> AppError {
    tracing::error!(error = %err, "google oauth call failed");
    AppError::upstream("Google authentication failed")
}

fn identity_failure(err: IdentityError) -> AppError {
    tracing::error!(error = %err, "identity service sign-in failed");
    AppError::upstream("Authentication service unavailable")
}

/// `{frontend}/#access_token=..&refresh_token=..`; the fragment never reaches a server.
fn session_redirect(frontend_url: &Url, session: &IdentitySession) -> Url {
    let fragment = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("access_token", &session.access_token)
        .append_pair("refresh_token", &session.refresh_token)
        .finish();

    let mut target = frontend_url.clone();
    target.set_fragment(Some(&fragment));
    target
}

fn with_profile_fallbacks(
    mut identity: VerifiedIdentity,
    profile: GoogleUserInfo,
) -> VerifiedIdentity {
    if identity.email.is_empty() {
        identity.email = profile.email;
    }
    if (identity.name.is_empty() || identity.name == ANONYMOUS_NAME) && !profile.name.is_empty() {
        identity.name = profile.name;
    }
    if identity.avatar_url.is_empty() {
        identity.avatar_url = profile.picture.unwrap_or_default();
    }
    identity
}

pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, AppError> {
    if let Err(err) = state.oauth_state.verify(query.state.as_deref().unwrap_or_default()) {
        tracing::warn!(error = %err, "oauth state rejected");
        return Err(AppError::unauthorized("Unauthorized: Invalid OAuth state"));
    }

    if let Some(reason) = query.error.as_deref() {
        tracing::warn!(reason, "google returned an authorization error");
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::validation("Bad Request: Missing authorization code"))?;

    let tokens = state.oauth.exchange_code(&code).await.map_err(oauth_failure)?;
    let profile = state
        .oauth
        .fetch_user_info(&tokens.access_token)
        .await
        .map_err(oauth_failure)?;
    let id_token = tokens
        .id_token
        .as_deref()
        .ok_or_else(|| oauth_failure(OAuthError::MissingIdToken))?;

    let session = state
        .identity
        .sign_in_with_id_token(id_token)
        .await
        .map_err(identity_failure)?;

    tracing::debug!(
        google_sub = %profile.sub,
        external_id = %session.identity.external_id,
        "identity service session issued"
    );
    // Keyed exactly like the access middleware keys it; Google only fills display gaps.
    let identity = with_profile_fallbacks(session.identity.clone(), profile);
    let user = ensure_user(state.users.as_ref(), &identity).await?;
    tracing::info!(user_id = %user.id, "google sign-in completed");

    Ok(Redirect::to(
        session_redirect(&state.frontend_url, &session).as_str(),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    // Absent or unusable credentials mean there is no session to revoke.
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());
    let Ok(token) = bearer_token(authorization) else {
        return Ok(Json(MessageResponse::new("No active session")));
    };

    match state.identity.sign_out(token).await {
        Ok(()) => {}
        // Already invalid at the identity service: the session is gone either way.
        Err(IdentityError::Rejected(status)) => {
            tracing::debug!(status, "logout of an already invalid session");
        }
        Err(err) => {
            tracing::error!(error = %err, "identity service sign-out failed");
            return Err(AppError::upstream("Authentication service unavailable"));
        }
    }

    Ok(Json(MessageResponse::new("Logged out successfully")))
}
