use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use thiserror::Error;

use crate::error::AppError;
use crate::services::auth::identity::{IdentityError, IdentityService, VerifiedIdentity};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("malformed token")]
    MalformedToken,
    #[error("token expired")]
    Expired,
    #[error("token rejected by identity service")]
    Rejected,
    #[error(transparent)]
    Upstream(IdentityError),
}

impl From<IdentityError> for AuthError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Rejected(_) | IdentityError::InvalidSubject => AuthError::Rejected,
            other => AuthError::Upstream(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingHeader => {
                AppError::unauthorized("Unauthorized: Missing authentication token")
            }
            AuthError::MalformedHeader | AuthError::MalformedToken => {
                AppError::unauthorized("Unauthorized: Malformed authentication token")
            }
            AuthError::Expired => AppError::unauthorized("Unauthorized: Token expired"),
            AuthError::Rejected => AppError::unauthorized("Unauthorized: Invalid session token"),
            AuthError::Upstream(err) => {
                tracing::error!(error = %err, "identity service call failed");
                AppError::upstream("Authentication service unavailable")
            }
        }
    }
}

/// Only the claim needed for the local pre-check; everything else is the identity service's job.
#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<i64>,
}

/// Bearer-token verification.
///
/// Order of checks:
/// 1. header present, `Bearer` scheme (any case), non-empty token
/// 2. JWT structure (header + payload decode)
/// 3. `exp` against the local clock, with no network traffic
/// 4. one call to the identity service
#[derive(Clone)]
pub struct TokenVerifier {
    identity: Arc<dyn IdentityService>,
    leeway_seconds: i64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(identity: Arc<dyn IdentityService>, leeway_seconds: u64) -> Self {
        Self {
            identity,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    pub async fn verify(&self, authorization: Option<&str>) -> Result<VerifiedIdentity, AuthError> {
        let token = bearer_token(authorization)?;
        self.check_expiry(token, chrono::Utc::now().timestamp())?;

        let identity = self.identity.get_user(token).await?;
        Ok(identity)
    }

    fn check_expiry(&self, token: &str, now: i64) -> Result<(), AuthError> {
        let exp = peek_expiry(token)?;
        match exp {
            Some(exp) if exp.saturating_add(self.leeway_seconds) <= now => Err(AuthError::Expired),
            _ => Ok(()),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
/// The scheme name is case-insensitive (RFC 7235).
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingHeader)?;
    let (scheme, token) = value
        .trim_start()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

// Reads `exp` without checking the signature.
fn peek_expiry(token: &str) -> Result<Option<i64>, AuthError> {
    jsonwebtoken::decode_header(token).map_err(|_| AuthError::MalformedToken)?;

    let payload = token.split('.').nth(1).ok_or(AuthError::MalformedToken)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| AuthError::MalformedToken)?;
    let claim: ExpiryClaim =
        serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)?;

    Ok(claim.exp)
}
