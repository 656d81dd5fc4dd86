//! Bridge configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BRIDGE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BRIDGE_BASE_URL` - Public URL of this service (OAuth `redirect_uri` base)
//! - `FRONTEND_URL` - Headless frontend home page
//! - `TIENDANUBE_CLIENT_ID` - OAuth app client ID
//! - `TIENDANUBE_CLIENT_SECRET` - OAuth app client secret
//! - `TIENDANUBE_SERVICE_STORE_ID` - Store used by the Merchant-API checkout
//! - `TIENDANUBE_SERVICE_ACCESS_TOKEN` - Service bearer token for that store
//! - `TIENDANUBE_STOREFRONT_URL` - Storefront origin for session-proxy checkout
//!
//! ## Optional
//! - `BRIDGE_HOST` - Bind address (default: 127.0.0.1)
//! - `BRIDGE_PORT` - Listen port (default: 3000)
//! - `BRIDGE_CORS_ORIGINS` - Comma-separated allowed origins (default: `FRONTEND_URL`)
//! - `BRIDGE_ADMIN_TOKEN` - Required `x-admin-token` for store administration
//! - `TIENDANUBE_AUTH_URL` - Authorization server (default: <https://www.tiendanube.com>)
//! - `TIENDANUBE_API_URL` - Commerce API base (default: <https://api.tiendanube.com/v1>)
//! - `TIENDANUBE_USER_AGENT` - Identifying user agent for API calls
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use checkout_bridge_core::StoreId;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

const DEFAULT_AUTH_URL: &str = "https://www.tiendanube.com";
const DEFAULT_API_URL: &str = "https://api.tiendanube.com/v1";
const DEFAULT_USER_AGENT: &str = "Checkout Bridge (soporte@example.com)";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
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

/// Bridge application configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this service, without trailing slash
    pub base_url: String,
    /// Headless frontend home, without trailing slash
    pub frontend_url: String,
    /// Origins allowed to call the JSON endpoints from a browser
    pub cors_origins: Vec<String>,
    /// Shared secret guarding store administration endpoints
    pub admin_token: Option<SecretString>,
    /// Platform configuration
    pub tiendanube: TiendanubeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Tiendanube platform configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct TiendanubeConfig {
    /// OAuth app client ID
    pub client_id: String,
    /// OAuth app client secret
    pub client_secret: SecretString,
    /// Authorization server base URL
    pub auth_url: String,
    /// Commerce API base URL (includes version segment)
    pub api_url: String,
    /// User agent sent on API calls
    pub user_agent: String,
    /// Storefront origin the session proxy replays against
    pub storefront_url: String,
    /// Static credential for Merchant-API checkout
    pub service: ServiceCredential,
}

impl std::fmt::Debug for TiendanubeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiendanubeConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .field("storefront_url", &self.storefront_url)
            .field("service", &self.service)
            .finish()
    }
}

/// Service-level store/token pair used by the Merchant-API strategy.
///
/// Distinct from the per-store OAuth credentials in the Credential Store.
#[derive(Clone)]
pub struct ServiceCredential {
    /// Store the carts are created on
    pub store_id: StoreId,
    /// Bearer token for that store
    pub access_token: SecretString,
}

impl std::fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredential")
            .field("store_id", &self.store_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BRIDGE_DATABASE_URL")?;
        let host = get_env_or_default("BRIDGE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BRIDGE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BRIDGE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BRIDGE_PORT".to_string(), e.to_string()))?;
        let base_url = get_url("BRIDGE_BASE_URL", None)?;
        let frontend_url = get_url("FRONTEND_URL", None)?;
        let cors_origins = get_optional_env("BRIDGE_CORS_ORIGINS").map_or_else(
            || vec![frontend_url.clone()],
            |raw| parse_origins(&raw),
        );
        let admin_token = get_optional_env("BRIDGE_ADMIN_TOKEN")
            .map(|token| {
                validate_secret_strength(&token, "BRIDGE_ADMIN_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        let tiendanube = TiendanubeConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            frontend_url,
            cors_origins,
            admin_token,
            tiendanube,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// OAuth `redirect_uri` registered with the platform.
    #[must_use]
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/callback", self.base_url)
    }
}

impl TiendanubeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store_id = get_required_env("TIENDANUBE_SERVICE_STORE_ID")?;
        let store_id = StoreId::parse(&store_id).map_err(|e| {
            ConfigError::InvalidEnvVar("TIENDANUBE_SERVICE_STORE_ID".to_string(), e.to_string())
        })?;

        Ok(Self {
            client_id: get_required_env("TIENDANUBE_CLIENT_ID")?,
            client_secret: get_validated_secret("TIENDANUBE_CLIENT_SECRET")?,
            auth_url: get_url("TIENDANUBE_AUTH_URL", Some(DEFAULT_AUTH_URL))?,
            api_url: get_url("TIENDANUBE_API_URL", Some(DEFAULT_API_URL))?,
            user_agent: get_env_or_default("TIENDANUBE_USER_AGENT", DEFAULT_USER_AGENT),
            storefront_url: get_url("TIENDANUBE_STOREFRONT_URL", None)?,
            service: ServiceCredential {
                store_id,
                access_token: get_validated_secret("TIENDANUBE_SERVICE_ACCESS_TOKEN")?,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an absolute http(s) URL, normalized without a trailing slash.
fn get_url(key: &str, default: Option<&str>) -> Result<String, ConfigError> {
    let raw = match default {
        Some(default) => get_env_or_default(key, default),
        None => get_required_env(key)?,
    };
    normalize_url(&raw).map_err(|reason| ConfigError::InvalidEnvVar(key.to_string(), reason))
}

/// Get a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

fn normalize_url(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("must have a host".to_string());
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Platform tokens are hex, so 3.0 bits/char is the realistic floor.
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the value issued by the platform."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
