//! Bearer token verification -> AuthCtx in request extensions.
//!
//! Every protected request:
//! 1. `TokenVerifier` (header shape, local `exp` check, one identity-service call)
//! 2. `ensure_user` (first sight creates the `users` row)
//! 3. `AuthCtx` inserted for `AuthCtxExtractor`
//!
//! Failures short-circuit before the handler runs.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::token_verifier::AuthError;
use crate::services::users::ensure_user;
use crate::state::AppState;

/// Protect every route registered on `router` so far.
///
/// `route_layer` keeps unknown paths at 404 instead of 401.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // A non-ASCII header value is as good as a malformed one.
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    let identity = match state.verifier.verify(authorization).await {
        Ok(identity) => identity,
        Err(err) => {
            if !matches!(err, AuthError::Upstream(_)) {
                tracing::warn!(error = %err, "access token verification failed");
            }
            return Err(err.into());
        }
    };

    let ctx = AuthCtx::from(ensure_user(state.users.as_ref(), &identity).await?);
    tracing::debug!(user_id = %ctx.user_id, external_id = %ctx.external_id, "request authenticated");

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
