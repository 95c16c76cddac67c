//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults suit a backend running locally.
//!
//! - `STOREFRONT_API_URL` - Backend REST base URL (default: `http://localhost:8080/api`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://<host>:<port>`)
//! - `STOREFRONT_DATABASE_URL` / `DATABASE_URL` - `PostgreSQL` URL for the session
//!   store; sessions stay in memory when unset
//! - `STOREFRONT_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `STOREFRONT_CATALOG_CACHE_SECS` - Catalogue cache TTL, 0 disables (default: 300)
//! - `STOREFRONT_CURRENCY` - Currency used to display catalogue prices (default: USD)
//! - `STOREFRONT_RATE_LIMIT` - Rate limit `/auth` endpoints (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use ecom_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default backend REST base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// `PostgreSQL` URL for persistent sessions (contains password)
    pub database_url: Option<SecretString>,
    /// Backend REST API configuration
    pub backend: BackendConfig,
    /// Currency used to format catalogue and cart prices
    pub currency: CurrencyCode,
    /// Whether `/auth` endpoints are rate limited
    pub rate_limit: bool,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Backend REST API configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL every endpoint path is appended to
    pub api_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Time-to-live of cached catalogue reads (zero disables the cache)
    pub catalog_cache_ttl: Duration,
}

/// Sentry configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host: IpAddr = parse_env_or("STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port: u16 = parse_env_or("STOREFRONT_PORT", 3000)?;
        let base_url = get_optional_env("STOREFRONT_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        let api_url = get_env_or_default("STOREFRONT_API_URL", DEFAULT_API_URL);
        let api_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e.to_string())
        })?;

        let backend = BackendConfig {
            api_url,
            timeout: Duration::from_secs(parse_env_or("STOREFRONT_API_TIMEOUT_SECS", 10)?),
            catalog_cache_ttl: Duration::from_secs(parse_env_or(
                "STOREFRONT_CATALOG_CACHE_SECS",
                300,
            )?),
        };

        let sentry = SentryConfig {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_env_or("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: parse_env_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            database_url: get_database_url("STOREFRONT_DATABASE_URL"),
            backend,
            currency: parse_env_or("STOREFRONT_CURRENCY", CurrencyCode::USD)?,
            rate_limit: parse_env_or("STOREFRONT_RATE_LIMIT", true)?,
            sentry,
        })
    }

    /// Configuration for a storefront on localhost talking to `api_url`.
    ///
    /// Uses in-memory sessions, no rate limiting, no catalogue cache, and an
    /// ephemeral port. Intended for local runs and tests.
    #[must_use]
    pub fn local(api_url: Url) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            database_url: None,
            backend: BackendConfig {
                api_url,
                timeout: Duration::from_secs(5),
                catalog_cache_ttl: Duration::ZERO,
            },
            currency: CurrencyCode::USD,
            rate_limit: false,
            sentry: SentryConfig::default(),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must be marked `Secure`.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Get an optional, non-empty environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
