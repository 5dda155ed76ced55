//! Google OAuth2 authorization-code flow.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("oauth transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("oauth provider answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("oauth provider did not return an id token")]
    MissingIdToken,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn authorization_url(&self, state: &str) -> Url;

    async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, OAuthError>;

    async fn fetch_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, OAuthError>;
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: Url,
}

impl std::fmt::Debug for GoogleOAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthClient")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri.as_str())
            .finish()
    }
}

#[derive(Serialize)]
struct CodeExchange<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'static str,
    code: &'a str,
}

impl GoogleOAuthClient {
    pub fn new(
        http: reqwest::Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Url,
    ) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri,
        }
    }
}

async fn error_for_status(res: reqwest::Response) -> Result<reqwest::Response, OAuthError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    Err(OAuthError::Status { status, body })
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = Url::parse(AUTHORIZE_ENDPOINT).expect("static authorize endpoint");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", state);
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, OAuthError> {
        let res = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&CodeExchange {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                redirect_uri: self.redirect_uri.as_str(),
                grant_type: "authorization_code",
                code,
            })
            .send()
            .await?;

        let tokens: GoogleTokens = error_for_status(res).await?.json().await?;
        if tokens.id_token.as_deref().is_none_or(str::is_empty) {
            return Err(OAuthError::MissingIdToken);
        }
        Ok(tokens)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, OAuthError> {
        let res = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(error_for_status(res).await?.json().await?)
    }
}
