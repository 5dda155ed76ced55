//! Hosted identity service (Supabase GoTrue REST API).
//!
//! The service owns signature verification and session issuance; this module only
//! forwards tokens to it and maps its answers into [`VerifiedIdentity`].
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Display name used when the identity service has none.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Identity established for a request or a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: String,
}

/// Session issued by the identity service after an OAuth login.
#[derive(Debug, Clone)]
pub struct IdentitySession {
    pub access_token: String,
    pub refresh_token: String,
    pub identity: VerifiedIdentity,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity service rejected the token ({0})")]
    Rejected(u16),
    #[error("identity service unavailable ({0})")]
    Unavailable(u16),
    #[error("identity service transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity service returned a non-uuid subject")]
    InvalidSubject,
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn get_user(&self, access_token: &str) -> Result<VerifiedIdentity, IdentityError>;

    async fn sign_in_with_id_token(&self, id_token: &str)
    -> Result<IdentitySession, IdentityError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: GoTrueUserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct GoTrueUserMetadata {
    full_name: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
    picture: Option<String>,
    provider_id: Option<String>,
    sub: Option<String>,
}

impl TryFrom<GoTrueUser> for VerifiedIdentity {
    type Error = IdentityError;

    fn try_from(user: GoTrueUser) -> Result<Self, Self::Error> {
        let subject = Uuid::parse_str(&user.id).map_err(|_| IdentityError::InvalidSubject)?;
        let meta = user.user_metadata;

        let external_id = meta
            .provider_id
            .or(meta.sub)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| subject.to_string());
        let name = meta
            .full_name
            .or(meta.name)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string());
        let avatar_url = meta.avatar_url.or(meta.picture).unwrap_or_default();

        Ok(Self {
            subject,
            external_id,
            email: user.email.unwrap_or_default(),
            name,
            avatar_url,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    refresh_token: String,
    user: GoTrueUser,
}

#[derive(Serialize)]
struct IdTokenGrant<'a> {
    provider: &'static str,
    id_token: &'a str,
}

/// GoTrue client. `apikey` is the project's anon key.
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

impl std::fmt::Debug for GoTrueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the api key
        f.debug_struct("GoTrueClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl GoTrueClient {
    pub fn new(http: reqwest::Client, project_url: &Url, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: project_url.clone(),
            anon_key: anon_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/auth/v1/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        )
    }
}

fn classify(status: StatusCode) -> IdentityError {
    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::NOT_FOUND
        | StatusCode::UNPROCESSABLE_ENTITY => IdentityError::Rejected(status.as_u16()),
        _ => IdentityError::Unavailable(status.as_u16()),
    }
}

#[async_trait]
impl IdentityService for GoTrueClient {
    async fn get_user(&self, access_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let res = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(classify(res.status()));
        }

        let user: GoTrueUser = res.json().await?;
        user.try_into()
    }

    async fn sign_in_with_id_token(
        &self,
        id_token: &str,
    ) -> Result<IdentitySession, IdentityError> {
        let res = self
            .http
            .post(self.endpoint("token"))
            .query(&[("grant_type", "id_token")])
            .header("apikey", &self.anon_key)
            .json(&IdTokenGrant {
                provider: "google",
                id_token,
            })
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(classify(res.status()));
        }

        let session: GoTrueSession = res.json().await?;
        Ok(IdentitySession {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            identity: session.user.try_into()?,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let res = self
            .http
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(classify(res.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_metadata_maps_onto_identity() {
        let user: GoTrueUser = serde_json::from_value(serde_json::json!({
            "id": "7b0c3f5e-2d7a-4a55-9a47-0d6f0cbb7f10",
            "email": "dancer@example.com",
            "user_metadata": {
                "full_name": "Ada Dancer",
                "avatar_url": "https://lh3.example.com/a.png",
                "provider_id": "1098765",
                "sub": "1098765"
            }
        }))
        .unwrap();

        let identity = VerifiedIdentity::try_from(user).unwrap();
        assert_eq!(identity.external_id, "1098765");
        assert_eq!(identity.name, "Ada Dancer");
        assert_eq!(identity.avatar_url, "https://lh3.example.com/a.png");
        assert_eq!(identity.email, "dancer@example.com");
    }

    #[test]
    fn missing_metadata_falls_back_to_subject() {
        let user: GoTrueUser = serde_json::from_value(serde_json::json!({
            "id": "7b0c3f5e-2d7a-4a55-9a47-0d6f0cbb7f10"
        }))
        .unwrap();

        let identity = VerifiedIdentity::try_from(user).unwrap();
        assert_eq!(identity.external_id, "7b0c3f5e-2d7a-4a55-9a47-0d6f0cbb7f10");
        assert_eq!(identity.name, "Anonymous");
        assert_eq!(identity.avatar_url, "");
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let user: GoTrueUser = serde_json::from_value(serde_json::json!({ "id": "abc" })).unwrap();
        assert!(matches!(
            VerifiedIdentity::try_from(user),
            Err(IdentityError::InvalidSubject)
        ));
    }

    #[test]
    fn auth_failures_are_rejections_and_outages_are_not() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED),
            IdentityError::Rejected(401)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY),
            IdentityError::Unavailable(502)
        ));
    }
}
