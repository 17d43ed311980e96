//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PANTRY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `LLM_API_KEY` - Language model API key
//!
//! ## Optional
//! - `PANTRY_HOST` - Bind address (default: 127.0.0.1)
//! - `PANTRY_PORT` - Listen port (default: 3000)
//! - `LLM_MODEL` - Model ID (default: claude-sonnet-4-20250514)
//! - `LLM_API_URL` - Messages endpoint (default: Anthropic's public API)
//! - `RECIPE_CACHE_TTL_SECS` - Recipe suggestion cache lifetime (default: 600)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated list of allowed browser origins
//! - `TRUST_PROXY_HEADERS` - `true` to rate limit on proxy-reported client IPs
//!   instead of the peer address (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::collections::HashSet;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_LLM_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_RECIPE_CACHE_TTL_SECS: u64 = 600;

/// Shortest API key accepted.
const MIN_API_KEY_LENGTH: usize = 20;

/// Fewest distinct characters an API key may contain.
const MIN_DISTINCT_CHARS: usize = 10;

/// Fragments that mark a value copied from a sample `.env` file.
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "placeholder",
    "example",
    "xxxx",
    "todo",
    "<",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Language model configuration
    pub llm: LlmConfig,
    /// How long recipe suggestions stay cached
    pub recipe_cache_ttl: Duration,
    /// Browser origins allowed by CORS (empty disables CORS headers)
    pub cors_allowed_origins: Vec<String>,
    /// Whether a trusted proxy sets the client IP headers
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Language model API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_url: Url,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_url", &self.api_url.as_str())
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::load(&Env::new(|key| std::env::var(key).ok()))
    }

    fn load(env: &Env<'_>) -> Result<Self, ConfigError> {
        let database_url = env
            .first_of(&["PANTRY_DATABASE_URL", "DATABASE_URL"])
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("PANTRY_DATABASE_URL".to_string()))?;

        let llm = LlmConfig {
            api_key: checked_secret(env, "LLM_API_KEY")?,
            model: env.get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_url: env.parse_or("LLM_API_URL", || {
                Url::parse(DEFAULT_LLM_API_URL).map_err(|e| e.to_string())
            })?,
        };

        let ttl_secs = env.parse_or("RECIPE_CACHE_TTL_SECS", || {
            Ok::<_, String>(DEFAULT_RECIPE_CACHE_TTL_SECS)
        })?;

        Ok(Self {
            database_url,
            host: env.parse_or("PANTRY_HOST", || Ok::<_, String>(IpAddr::from([127, 0, 0, 1])))?,
            port: env.parse_or("PANTRY_PORT", || Ok::<_, String>(3000))?,
            llm,
            recipe_cache_ttl: Duration::from_secs(ttl_secs),
            cors_allowed_origins: env
                .get("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            trust_proxy_headers: env.parse_or("TRUST_PROXY_HEADERS", || Ok::<_, String>(false))?,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            // Sample rates are best effort; a typo should not stop the server.
            sentry_sample_rate: env
                .get("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: env
                .get("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.1),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Environment Access
// =============================================================================

/// Variable lookup with blank values treated as unset.
struct Env<'a> {
    lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
}

impl<'a> Env<'a> {
    fn new(lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// First set variable among `keys`.
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Parse `key`, or build the default when it is unset.
    fn parse_or<T, E>(
        &self,
        key: &str,
        default: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
        E: Display,
    {
        let invalid = |e: &dyn Display| ConfigError::InvalidEnvVar(key.to_string(), e.to_string());
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|e| invalid(&e)),
            None => default().map_err(|e| invalid(&e)),
        }
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a required secret and reject obvious placeholders.
fn checked_secret(env: &Env<'_>, key: &str) -> Result<SecretString, ConfigError> {
    let value = env
        .get(key)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
    check_secret(&value).map_err(|reason| ConfigError::InsecureSecret(key.to_string(), reason))?;
    Ok(SecretString::from(value))
}

fn check_secret(value: &str) -> Result<(), String> {
    let lower = value.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(format!("looks like a placeholder (contains '{marker}')"));
    }

    if value.chars().count() < MIN_API_KEY_LENGTH {
        return Err(format!("shorter than {MIN_API_KEY_LENGTH} characters"));
    }

    let distinct = value.chars().collect::<HashSet<_>>().len();
    if distinct < MIN_DISTINCT_CHARS {
        return Err(format!(
            "only {distinct} distinct characters; use the key issued by your provider"
        ));
    }

    Ok(())
}
