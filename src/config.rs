/*
 * Responsibility
 * - Load settings from the environment (.env supported via dotenvy)
 * - Validate them up front: missing store/auth/inference credentials abort startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    pub supabase_url: Url,
    pub supabase_anon_key: String,

    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: Url,

    pub openai_api_key: String,
    pub openai_base_url: Url,
    pub openai_model: String,

    pub frontend_url: Url,
    pub cors_allowed_origins: Vec<String>,
    pub session_secret: String,

    pub identity_timeout: Duration,
    pub inference_timeout: Duration,
    pub request_timeout: Duration,
    pub access_token_leeway_seconds: u64,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database_max_connections", &self.database_max_connections)
            .field("run_migrations", &self.run_migrations)
            .field("supabase_url", &self.supabase_url.as_str())
            .field("google_redirect_uri", &self.google_redirect_uri.as_str())
            .field("openai_base_url", &self.openai_base_url.as_str())
            .field("openai_model", &self.openai_model)
            .field("frontend_url", &self.frontend_url.as_str())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("identity_timeout", &self.identity_timeout)
            .field("inference_timeout", &self.inference_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let required_url = |key: &'static str| -> Result<Url, ConfigError> {
            Url::parse(&required(key)?).map_err(|_| ConfigError::Invalid(key))
        };
        let seconds = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|n| *n > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::Invalid(key)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let database_url = required("DATABASE_URL")?;
        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(5);
        let run_migrations = lookup("RUN_MIGRATIONS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let supabase_url = required_url("SUPABASE_URL")?;
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;

        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let google_client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let google_redirect_uri = required_url("GOOGLE_REDIRECT_URI")?;

        let openai_api_key = required("OPENAI_API_KEY")?;
        let openai_base_url = match lookup("OPENAI_BASE_URL") {
            Some(raw) => Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("OPENAI_BASE_URL"))?,
            None => Url::parse("https://api.openai.com/v1/")
                .map_err(|_| ConfigError::Invalid("OPENAI_BASE_URL"))?,
        };
        let openai_model = lookup("OPENAI_MODEL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        let frontend_url = required_url("FRONTEND_URL")?;
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(ConfigError::Invalid("SESSION_SECRET"));
        }

        let identity_timeout = seconds("IDENTITY_TIMEOUT_SECONDS", 10)?;
        let inference_timeout = seconds("INFERENCE_TIMEOUT_SECONDS", 60)?;
        let request_timeout = seconds("REQUEST_TIMEOUT_SECONDS", 120)?;

        let access_token_leeway_seconds = lookup("ACCESS_TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let sqids_min_length = lookup("SQIDS_MIN_LENGTH")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(10);
        let sqids_alphabet = lookup("SQIDS_ALPHABET").unwrap_or_else(|| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            run_migrations,
            supabase_url,
            supabase_anon_key,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            openai_api_key,
            openai_base_url,
            openai_model,
            frontend_url,
            cors_allowed_origins,
            session_secret,
            identity_timeout,
            inference_timeout,
            request_timeout,
            access_token_leeway_seconds,
            sqids_min_length,
            sqids_alphabet,
        })
    }

    /// Origins allowed by CORS in production: the frontend plus any extra configured ones.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.origin().ascii_serialization()];
        for origin in &self.cors_allowed_origins {
            if !origins.contains(origin) {
                origins.push(origin.clone());
            }
        }
        origins
    }
}
