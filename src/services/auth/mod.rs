pub mod factory;
pub mod google;
pub mod identity;
pub mod oauth_state;
pub mod token_verifier;

pub use factory::{AuthServices, build_auth_services};
pub use google::{GoogleOAuthClient, OAuthProvider};
pub use identity::{GoTrueClient, IdentityService};
pub use oauth_state::OAuthStateSigner;
pub use token_verifier::TokenVerifier;
