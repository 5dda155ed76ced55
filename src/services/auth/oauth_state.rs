//! Stateless CSRF `state` for the Google OAuth round trip.
//!
//! Format: `base64url(nonce:issued_at) "." base64url(HMAC-SHA256(secret, payload))`.
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const MAX_AGE_SECONDS: i64 = 600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OAuthStateError {
    #[error("malformed state")]
    Malformed,
    #[error("state signature mismatch")]
    BadSignature,
    #[error("state expired")]
    Expired,
}

#[derive(Clone)]
pub struct OAuthStateSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for OAuthStateSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthStateSigner").finish_non_exhaustive()
    }
}

impl OAuthStateSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    pub fn issue(&self) -> String {
        self.issue_at(chrono::Utc::now().timestamp())
    }

    pub fn verify(&self, state: &str) -> Result<(), OAuthStateError> {
        self.verify_at(state, chrono::Utc::now().timestamp())
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key length")
    }

    fn issue_at(&self, now: i64) -> String {
        let payload = format!("{}:{}", Uuid::new_v4().simple(), now);
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let tag = mac.finalize().into_bytes();

        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(tag)
        )
    }

    fn verify_at(&self, state: &str, now: i64) -> Result<(), OAuthStateError> {
        let (payload_b64, tag_b64) = state.split_once('.').ok_or(OAuthStateError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| OAuthStateError::Malformed)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|_| OAuthStateError::Malformed)?;

        let mut mac = self.mac();
        mac.update(&payload);
        mac.verify_slice(&tag)
            .map_err(|_| OAuthStateError::BadSignature)?;

        let payload = String::from_utf8(payload).map_err(|_| OAuthStateError::Malformed)?;
        let issued_at: i64 = payload
            .rsplit_once(':')
            .and_then(|(_, ts)| ts.parse().ok())
            .ok_or(OAuthStateError::Malformed)?;

        if now - issued_at > MAX_AGE_SECONDS || issued_at > now + 60 {
            return Err(OAuthStateError::Expired);
        }
        Ok(())
    }
}
