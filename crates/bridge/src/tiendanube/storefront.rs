//! Storefront add-to-cart replayed inside a shopper's browser session.
//!
//! The request is made to look like the storefront's own AJAX add-to-cart
//! (same-origin `Origin`/`Referer`, browser user agent) so the platform
//! attributes it to the shopper's session rather than to a bot.

use axum::http::HeaderValue;
use checkout_bridge_core::CartLineItem;
use reqwest::header::{ACCEPT, COOKIE, ORIGIN, REFERER, USER_AGENT};
use serde_json::Value;
use tracing::instrument;

use super::{PlatformError, TiendanubeClient, read_success_body};

/// Desktop browser user agent presented to the storefront.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// The shopper's storefront session, forwarded verbatim.
///
/// Opaque: the raw header bytes are never parsed, never modified, never
/// logged. Non-ASCII (obs-text) bytes pass through untouched.
#[derive(Clone)]
pub struct SessionCookie(HeaderValue);

impl SessionCookie {
    /// Wrap a raw `Cookie` header value. Blank or non-header-safe values are
    /// rejected.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        HeaderValue::from_str(raw)
            .ok()
            .and_then(|value| Self::from_header(&value))
    }

    /// Wrap an inbound `Cookie` header as-is. Blank values are rejected.
    #[must_use]
    pub fn from_header(value: &HeaderValue) -> Option<Self> {
        if value.as_bytes().trim_ascii().is_empty() {
            return None;
        }
        let mut value = value.clone();
        value.set_sensitive(true);
        Some(Self(value))
    }

    fn header(&self) -> HeaderValue {
        self.0.clone()
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionCookie([REDACTED])")
    }
}

impl TiendanubeClient {
    /// Add one line to the shopper's storefront cart.
    ///
    /// Returns the storefront's JSON body unmodified. A success body that is
    /// not JSON is returned as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Rejected` with the raw body on a non-success
    /// status, `Http` on transport failure.
    #[instrument(skip(self, cookie), fields(variant = %item.variant_id, quantity = %item.quantity))]
    pub async fn add_to_storefront_cart(
        &self,
        cookie: &SessionCookie,
        item: &CartLineItem,
    ) -> Result<Value, PlatformError> {
        let origin = &self.inner.storefront_url;
        let url = format!("{origin}/comprar/");
        let quantity = item.quantity.to_string();
        let form = [
            ("add_to_cart", item.variant_id.as_str()),
            ("quantity", quantity.as_str()),
        ];

        let response = self
            .inner
            .client
            .post(&url)
            .header(COOKIE, cookie.header())
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ORIGIN, origin.as_str())
            .header(REFERER, format!("{origin}/"))
            .header(ACCEPT, "application/json, text/javascript, */*; q=0.01")
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_rejects_blank() {
        assert!(SessionCookie::new("").is_none());
        assert!(SessionCookie::new("   ").is_none());
        assert!(SessionCookie::new("PHPSESSID=abc").is_some());
    }

    #[test]
    fn test_session_cookie_debug_is_redacted() {
        let cookie = SessionCookie::from_header(&HeaderValue::from_static(
            "store_session=very-private-value",
        ))
        .unwrap();
        let debug = format!("{cookie:?}");
        assert!(!debug.contains("very-private-value"));
        assert_eq!(cookie.header(), "store_session=very-private-value");
        assert!(cookie.header().is_sensitive());
    }

    #[test]
    fn test_session_cookie_keeps_non_ascii_bytes() {
        let raw = HeaderValue::from_bytes(b"s=caf\xe9").unwrap();
        let cookie = SessionCookie::from_header(&raw).unwrap();
        assert_eq!(cookie.header().as_bytes(), b"s=caf\xe9");
    }
}
