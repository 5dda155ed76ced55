/*
 * Responsibility
 * - URL structure of the API
 * - Public routes: health, Google sign-in, logout (bearer optional)
 * - Protected routes: everything else, behind middleware::auth::access
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    alt_text::generate_alt_text,
    auth::{google_callback, google_login, logout},
    health::health,
    liked_descriptions::{list_liked_descriptions, save_liked_description},
    user_session::user_session,
};
use crate::middleware;
use crate::state::AppState;

fn protected(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/alt-text", post(generate_alt_text))
        .route("/like-description", post(save_liked_description))
        .route("/liked-descriptions", get(list_liked_descriptions))
        .route("/user-session", get(user_session));

    middleware::auth::access::apply(router, state)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/google", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        .route("/logout", get(logout))
        .merge(protected(state.clone()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{TestApp, get};

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = TestApp::builder().build();
        let (status, body) = app.send_json(get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_paths_are_404_not_401() {
        let app = TestApp::builder().build();
        let res = app.send(get("/nope", None)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
