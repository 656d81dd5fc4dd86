//! Tiendanube platform HTTP client.
//!
//! # Endpoints
//!
//! - Authorization server: `/apps/{client_id}/authorize`, `/apps/authorize/token`
//! - Commerce API (bearer token): `/{store_id}/store`, `/{store_id}/carts`
//! - Storefront (shopper session cookie): `/comprar/`
//!
//! One `reqwest::Client` is shared by all calls. No call sets a timeout or
//! retries; failures are reported to the caller as-is.

mod api;
mod oauth;
mod storefront;

pub use api::{CartLine, CreatedCart, StoreProfile};
pub use oauth::{AccessGrant, TokenExchange};
pub use storefront::SessionCookie;

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;

use crate::config::TiendanubeConfig;

/// Errors that can occur when talking to the platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("platform returned {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body, preserved for diagnosis.
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required field was absent from an otherwise valid response.
    #[error("response missing field '{0}'")]
    MissingField(&'static str),
}

/// Tiendanube client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct TiendanubeClient {
    inner: Arc<TiendanubeClientInner>,
}

struct TiendanubeClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    auth_url: String,
    api_url: String,
    user_agent: String,
    storefront_url: String,
}

impl TiendanubeClient {
    /// Create a new platform client.
    #[must_use]
    pub fn new(config: &TiendanubeConfig) -> Self {
        Self {
            inner: Arc::new(TiendanubeClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                auth_url: config.auth_url.clone(),
                api_url: config.api_url.clone(),
                user_agent: config.user_agent.clone(),
                storefront_url: config.storefront_url.clone(),
            }),
        }
    }
}

/// Read a response body, turning non-success statuses into
/// [`PlatformError::Rejected`] with the raw text preserved.
async fn read_success_body(response: reqwest::Response) -> Result<String, PlatformError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(PlatformError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
