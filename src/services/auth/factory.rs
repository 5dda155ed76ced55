/// Factory: build the auth-side collaborators from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    GoTrueClient, GoogleOAuthClient, IdentityService, OAuthProvider, OAuthStateSigner,
    TokenVerifier,
};

pub struct AuthServices {
    pub identity: Arc<dyn IdentityService>,
    pub verifier: Arc<TokenVerifier>,
    pub oauth: Arc<dyn OAuthProvider>,
    pub oauth_state: OAuthStateSigner,
}

/// `http` is the identity-timeout client shared by GoTrue and Google calls.
pub fn build_auth_services(config: &Config, http: reqwest::Client) -> AuthServices {
    let identity: Arc<dyn IdentityService> = Arc::new(GoTrueClient::new(
        http.clone(),
        &config.supabase_url,
        config.supabase_anon_key.clone(),
    ));

    let verifier = Arc::new(TokenVerifier::new(
        identity.clone(),
        config.access_token_leeway_seconds,
    ));

    let oauth: Arc<dyn OAuthProvider> = Arc::new(GoogleOAuthClient::new(
        http,
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_uri.clone(),
    ));

    AuthServices {
        identity,
        verifier,
        oauth,
        oauth_state: OAuthStateSigner::new(&config.session_secret),
    }
}
