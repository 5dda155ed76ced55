/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Every external collaborator is an injected trait object, so tests can swap in fakes
 * - Clone is cheap (Arc / Clone-cheap handles inside)
 */
use std::sync::Arc;

use url::Url;

use crate::repos::{LikedDescriptionStore, UserStore};
use crate::services::alt_text::AltTextPipeline;
use crate::services::auth::{IdentityService, OAuthProvider, OAuthStateSigner, TokenVerifier};
use crate::services::id_codec::IdCodec;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub liked_descriptions: Arc<dyn LikedDescriptionStore>,
    pub identity: Arc<dyn IdentityService>,
    pub verifier: Arc<TokenVerifier>,
    pub oauth: Arc<dyn OAuthProvider>,
    pub oauth_state: OAuthStateSigner,
    pub alt_text: Arc<AltTextPipeline>,
    pub id_codec: IdCodec,
    pub frontend_url: Url,
}
