//! OAuth authorization-code flow against the platform's authorization server.

use checkout_bridge_core::StoreId;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::{PlatformError, TiendanubeClient};

/// Result of a token exchange the platform answered.
///
/// A response without `access_token` is not an error here: the caller
/// relays the platform's payload verbatim.
#[derive(Debug)]
pub enum TokenExchange {
    /// The platform issued a credential.
    Granted(AccessGrant),
    /// The platform answered without a credential; raw payload attached.
    Rejected(Value),
}

/// A credential issued by the token endpoint.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct AccessGrant {
    /// Store the credential is scoped to (`user_id` in the response).
    pub store_id: StoreId,
    /// Bearer token.
    pub access_token: SecretString,
    /// Comma-separated scopes, if reported.
    pub scope: Option<String>,
    /// Store display name, if reported.
    pub organization: Option<String>,
}

impl std::fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGrant")
            .field("store_id", &self.store_id)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("organization", &self.organization)
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
    code: &'a str,
}

impl TiendanubeClient {
    /// Generate the OAuth authorization URL.
    ///
    /// Redirect the merchant to this URL to begin the install flow. `state`
    /// is echoed back on the callback.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, scopes: &[&str], state: &str) -> String {
        let scope = scopes.join(",");
        format!(
            "{}/apps/{}/authorize?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.inner.auth_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// The platform's HTTP status is not consulted: whether a credential was
    /// issued is decided by the presence of `access_token` in the body.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Http` if the request fails, `Parse` if the
    /// body is not JSON, or `MissingField` if a token was issued without a
    /// usable `user_id`.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchange, PlatformError> {
        let url = format!("{}/apps/authorize/token", self.inner.auth_url);

        let request = TokenRequest {
            client_id: &self.inner.client_id,
            client_secret: self.inner.client_secret.expose_secret(),
            grant_type: "authorization_code",
            code,
        };

        let response = self.inner.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)?;

        tracing::debug!(%status, "token endpoint answered");
        parse_token_response(payload)
    }
}

fn parse_token_response(payload: Value) -> Result<TokenExchange, PlatformError> {
    let Some(access_token) = payload
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
    else {
        return Ok(TokenExchange::Rejected(payload));
    };

    let raw_store_id = match payload.get("user_id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return Err(PlatformError::MissingField("user_id")),
    };
    let store_id = StoreId::parse(&raw_store_id).map_err(|_| PlatformError::MissingField("user_id"))?;

    Ok(TokenExchange::Granted(AccessGrant {
        store_id,
        access_token: SecretString::from(access_token),
        scope: payload
            .get("scope")
            .and_then(Value::as_str)
            .map(String::from),
        organization: payload
            .get("organization")
            .and_then(Value::as_str)
            .filter(|o| !o.trim().is_empty())
            .map(String::from),
    }))
}
