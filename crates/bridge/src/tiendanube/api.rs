//! Authenticated commerce API calls.

use checkout_bridge_core::{Cart, Email, StoreId};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::{PlatformError, TiendanubeClient, read_success_body};

/// Display metadata for a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreProfile {
    /// Preferred storefront host: first custom domain, else the platform one.
    pub domain: Option<String>,
    /// Logo URL.
    pub logo: Option<String>,
}

/// A cart line in the commerce API's wire format.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CartLine {
    pub variant_id: Value,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
struct CreateCartRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    products: Vec<CartLine>,
}

/// A cart created through the commerce API.
#[derive(Debug, Clone)]
pub struct CreatedCart {
    /// Hosted checkout URL, if the response carried one.
    pub checkout_url: Option<String>,
    /// Full response body.
    pub raw: Value,
}

impl TiendanubeClient {
    /// Fetch a store's domain and logo.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the request fails, the platform rejects it,
    /// or the body is not JSON.
    #[instrument(skip(self, access_token))]
    pub async fn get_store_profile(
        &self,
        store_id: &StoreId,
        access_token: &str,
    ) -> Result<StoreProfile, PlatformError> {
        let url = format!("{}/{}/store", self.inner.api_url, store_id);

        let response = self
            .inner
            .client
            .get(&url)
            .header("Authentication", format!("bearer {access_token}"))
            .header(reqwest::header::USER_AGENT, &self.inner.user_agent)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let payload: Value = serde_json::from_str(&body)?;
        Ok(parse_store_profile(&payload))
    }

    /// Create a cart on `store_id` and return its checkout URL.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Rejected` with the platform's raw body on a
    /// non-success status, `Http` on transport failure, `Parse` if the body
    /// is not JSON.
    #[instrument(skip(self, access_token, email), fields(lines = cart.len()))]
    pub async fn create_cart(
        &self,
        store_id: &StoreId,
        access_token: &str,
        cart: &Cart,
        email: Option<&Email>,
    ) -> Result<CreatedCart, PlatformError> {
        let url = format!("{}/{}/carts", self.inner.api_url, store_id);

        let request = CreateCartRequest {
            email: email.map(Email::as_str),
            products: cart_lines(cart),
        };

        let response = self
            .inner
            .client
            .post(&url)
            .header("Authentication", format!("bearer {access_token}"))
            .header(reqwest::header::USER_AGENT, &self.inner.user_agent)
            .json(&request)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let raw: Value = serde_json::from_str(&body)?;

        Ok(CreatedCart {
            checkout_url: extract_checkout_url(&raw),
            raw,
        })
    }
}

/// Variant ids go out as JSON numbers when they fit, as strings otherwise.
fn cart_lines(cart: &Cart) -> Vec<CartLine> {
    cart.items()
        .iter()
        .map(|item| CartLine {
            variant_id: item
                .variant_id
                .as_str()
                .parse::<u64>()
                .map_or_else(|_| Value::from(item.variant_id.as_str()), Value::from),
            quantity: item.quantity.get(),
        })
        .collect()
}

/// `checkout_url`, falling back to `checkout.url`.
pub(crate) fn extract_checkout_url(payload: &Value) -> Option<String> {
    payload
        .get("checkout_url")
        .and_then(Value::as_str)
        .or_else(|| payload.pointer("/checkout/url").and_then(Value::as_str))
        .filter(|url| !url.is_empty())
        .map(String::from)
}

fn parse_store_profile(payload: &Value) -> StoreProfile {
    let custom_domain = payload
        .get("domains")
        .and_then(Value::as_array)
        .and_then(|domains| domains.iter().find_map(Value::as_str))
        .filter(|d| !d.is_empty());
    let original_domain = payload
        .get("original_domain")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty());

    StoreProfile {
        domain: custom_domain.or(original_domain).map(String::from),
        logo: payload
            .get("logo")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .map(String::from),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use checkout_bridge_core::CartLineItem;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extract_checkout_url_top_level() {
        let payload = json!({"checkout_url": "https://a.example/checkout/1"});
        assert_eq!(
            extract_checkout_url(&payload).as_deref(),
            Some("https://a.example/checkout/1")
        );
    }

    #[test]
    fn test_extract_checkout_url_nested_fallback() {
        let payload = json!({"id": 9, "checkout": {"url": "https://a.example/checkout/9"}});
        assert_eq!(
            extract_checkout_url(&payload).as_deref(),
            Some("https://a.example/checkout/9")
        );
    }

    #[test]
    fn test_extract_checkout_url_absent() {
        assert!(extract_checkout_url(&json!({"id": 9})).is_none());
        assert!(extract_checkout_url(&json!({"checkout_url": ""})).is_none());
    }

    #[test]
    fn test_cart_lines_numeric_variants() {
        let cart = Cart::new(vec![
            CartLineItem::parse("1001", "2").unwrap(),
            CartLineItem::parse("99999999999999999999999", "1").unwrap(),
        ])
        .unwrap();

        let lines = cart_lines(&cart);
        assert_eq!(lines[0].variant_id, json!(1001));
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[1].variant_id, json!("99999999999999999999999"));
    }

    #[test]
    fn test_parse_store_profile_prefers_custom_domain() {
        let profile = parse_store_profile(&json!({
            "original_domain": "mitienda.mitiendanube.com",
            "domains": ["www.mitienda.com.ar"],
            "logo": "https://cdn.example/logo.png"
        }));
        assert_eq!(profile.domain.as_deref(), Some("www.mitienda.com.ar"));
        assert_eq!(profile.logo.as_deref(), Some("https://cdn.example/logo.png"));

        let fallback = parse_store_profile(&json!({
            "original_domain": "mitienda.mitiendanube.com",
            "domains": []
        }));
        assert_eq!(fallback.domain.as_deref(), Some("mitienda.mitiendanube.com"));
        assert!(fallback.logo.is_none());
    }
}
