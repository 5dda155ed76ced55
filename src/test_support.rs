//! Fakes for every injected collaborator plus helpers to drive the router in tests.
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use jsonwebtoken::{EncodingKey, Header};
use tower::ServiceExt;
use url::Url;
use uuid::Uuid;

use crate::repos::memory::{MemoryLikedDescriptionRepo, MemoryUserRepo};
use crate::services::alt_text::AltTextPipeline;
use crate::services::auth::google::{GoogleTokens, GoogleUserInfo, OAuthError, OAuthProvider};
use crate::services::auth::identity::{
    IdentityError, IdentityService, IdentitySession, VerifiedIdentity,
};
use crate::services::auth::{OAuthStateSigner, TokenVerifier};
use crate::services::id_codec::IdCodec;
use crate::services::inference::{ChatRequest, InferenceClient, InferenceError};
use crate::state::AppState;

pub const SESSION_SECRET: &str = "test-session-secret-0123456789abcdef";
pub const FRONTEND_URL: &str = "http://localhost:5173";

/// HS256 token carrying only `sub` and `exp`; the signature is never checked locally.
pub fn mint_token(exp: i64) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &serde_json::json!({ "sub": "7b0c3f5e-2d7a-4a55-9a47-0d6f0cbb7f10", "exp": exp }),
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {}", mint_token(chrono::Utc::now().timestamp() + 3600))
}

#[derive(Clone, Copy)]
enum IdentityMode {
    Accept,
    Reject,
    Unavailable,
}

pub struct FakeIdentity {
    mode: IdentityMode,
    identity: VerifiedIdentity,
    get_user_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        Self::with_mode(IdentityMode::Accept)
    }
}

impl FakeIdentity {
    fn with_mode(mode: IdentityMode) -> Self {
        Self {
            mode,
            identity: VerifiedIdentity {
                subject: Uuid::parse_str("7b0c3f5e-2d7a-4a55-9a47-0d6f0cbb7f10").unwrap(),
                external_id: "google-123".into(),
                email: "dancer@example.com".into(),
                name: "Ada Dancer".into(),
                avatar_url: "https://lh3.example.com/a.png".into(),
            },
            get_user_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    /// Accepts every token as this user instead of the default one.
    pub fn as_user(subject: Uuid, external_id: &str) -> Self {
        let mut fake = Self::default();
        fake.identity.subject = subject;
        fake.identity.external_id = external_id.into();
        fake
    }

    pub fn rejecting() -> Self {
        Self::with_mode(IdentityMode::Reject)
    }

    pub fn unavailable() -> Self {
        Self::with_mode(IdentityMode::Unavailable)
    }

    pub fn identity(&self) -> VerifiedIdentity {
        self.identity.clone()
    }

    pub fn get_user_calls(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    fn answer<T>(&self, ok: T) -> Result<T, IdentityError> {
        match self.mode {
            IdentityMode::Accept => Ok(ok),
            IdentityMode::Reject => Err(IdentityError::Rejected(401)),
            IdentityMode::Unavailable => Err(IdentityError::Unavailable(503)),
        }
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn get_user(&self, _access_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(self.identity.clone())
    }

    async fn sign_in_with_id_token(
        &self,
        _id_token: &str,
    ) -> Result<IdentitySession, IdentityError> {
        self.answer(IdentitySession {
            access_token: "session-access".into(),
            refresh_token: "session-refresh".into(),
            identity: self.identity.clone(),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(())
    }
}

type Scripted = Result<Option<String>, InferenceError>;

/// Replays canned completions in order and records every request.
#[derive(Default)]
pub struct ScriptedInference {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedInference {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn complete(&self, request: &ChatRequest) -> Result<Option<String>, InferenceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(InferenceError::NoChoices))
    }
}

/// Google stand-in: the code "bad-code" fails the exchange.
pub struct FakeOAuth;

#[async_trait]
impl OAuthProvider for FakeOAuth {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = Url::parse("https://accounts.google.com/o/oauth2/v2/auth").unwrap();
        url.query_pairs_mut().append_pair("state", state);
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, OAuthError> {
        if code == "bad-code" {
            return Err(OAuthError::Status {
                status: 400,
                body: "invalid_grant".into(),
            });
        }
        Ok(GoogleTokens {
            access_token: "google-access".into(),
            id_token: Some("google-id-token".into()),
        })
    }

    async fn fetch_user_info(&self, _access_token: &str) -> Result<GoogleUserInfo, OAuthError> {
        Ok(GoogleUserInfo {
            sub: "google-123".into(),
            email: "dancer@example.com".into(),
            name: "Ada Dancer".into(),
            picture: Some("https://lh3.example.com/a.png".into()),
        })
    }
}

#[derive(Default)]
pub struct TestAppBuilder {
    identity: Option<FakeIdentity>,
    script: Vec<Scripted>,
    failing_storage: bool,
    storage: Option<(Arc<MemoryUserRepo>, Arc<MemoryLikedDescriptionRepo>)>,
}

impl TestAppBuilder {
    pub fn identity(mut self, identity: FakeIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn inference(mut self, script: Vec<Scripted>) -> Self {
        self.script = script;
        self
    }

    pub fn failing_storage(mut self) -> Self {
        self.failing_storage = true;
        self
    }

    /// Reuse another app's repositories, so two callers see one database.
    pub fn storage_of(mut self, other: &TestApp) -> Self {
        self.storage = Some((other.users.clone(), other.liked.clone()));
        self
    }

    pub fn build(self) -> TestApp {
        let (users, liked) = match self.storage {
            Some(shared) => shared,
            None => {
                let users = Arc::new(MemoryUserRepo::default());
                let liked = Arc::new(if self.failing_storage {
                    MemoryLikedDescriptionRepo::failing(users.clone())
                } else {
                    MemoryLikedDescriptionRepo::new(users.clone())
                });
                (users, liked)
            }
        };
        let identity = Arc::new(self.identity.unwrap_or_default());
        let inference = Arc::new(ScriptedInference::new(self.script));

        let state = AppState {
            users: users.clone(),
            liked_descriptions: liked.clone(),
            identity: identity.clone(),
            verifier: Arc::new(TokenVerifier::new(identity.clone(), 0)),
            oauth: Arc::new(FakeOAuth),
            oauth_state: OAuthStateSigner::new(SESSION_SECRET),
            alt_text: Arc::new(AltTextPipeline::new(inference.clone(), "gpt-4o-mini")),
            id_codec: IdCodec::new(
                10,
                "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
            )
            .unwrap(),
            frontend_url: Url::parse(FRONTEND_URL).unwrap(),
        };

        TestApp {
            state,
            users,
            liked,
            identity,
            inference,
        }
    }
}

pub struct TestApp {
    pub state: AppState,
    pub users: Arc<MemoryUserRepo>,
    pub liked: Arc<MemoryLikedDescriptionRepo>,
    pub identity: Arc<FakeIdentity>,
    pub inference: Arc<ScriptedInference>,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    pub fn router(&self) -> Router {
        crate::api::router(self.state.clone())
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router().oneshot(req).await.unwrap()
    }

    pub async fn send_json(&self, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = self.send(req).await;
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, authorization: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
