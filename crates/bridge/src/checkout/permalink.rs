//! Credential-free checkout through the platform's cart permalink.

use checkout_bridge_core::Cart;
use url::{Host, Url};

use super::{CheckoutError, CheckoutOutcome, CheckoutResult, CheckoutStrategy};

/// Query string the platform expects on a cart permalink.
const PERMALINK_QUERY: &str = "storefront=permalink&from_store=1&country=AR";

/// Builds `https://{domain}/cart/add/{pairs}?...` for the browser to follow.
///
/// No platform call is made; the storefront materialises the checkout when
/// the shopper lands on the URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermalinkStrategy;

impl CheckoutStrategy for PermalinkStrategy {
    type Context = str;

    async fn attempt(&self, cart: &Cart, domain: &str) -> CheckoutResult {
        let domain = normalize_domain(domain)
            .ok_or_else(|| CheckoutError::InvalidContext(format!("invalid store domain '{domain}'")))?;
        Ok(CheckoutOutcome::CheckoutUrl(permalink_url(&domain, cart)))
    }
}

/// Permalink URL for `cart` on an already-normalized `domain`.
#[must_use]
pub fn permalink_url(domain: &str, cart: &Cart) -> String {
    format!(
        "https://{domain}/cart/add/{}?{PERMALINK_QUERY}",
        cart.to_permalink_token()
    )
}

/// Reduce a stored domain to a bare host (optionally with port).
///
/// Accepts `shop.example`, `https://shop.example/` and the like. Returns
/// `None` for anything that is not a plain host: paths, queries, fragments,
/// userinfo, empty or malformed labels, and non-numeric ports.
#[must_use]
pub fn normalize_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let authority = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let authority = authority.strip_suffix('/').unwrap_or(authority);
    if authority.is_empty() || authority.ends_with(':') {
        return None;
    }

    let url = Url::parse(&format!("https://{authority}")).ok()?;
    if url.path() != "/"
        || url.query().is_some()
        || url.fragment().is_some()
        || !url.username().is_empty()
        || url.password().is_some()
    {
        return None;
    }

    let host = match url.host()? {
        Host::Domain(domain) if domain.split('.').all(is_host_label) => domain.to_string(),
        Host::Domain(_) => return None,
        Host::Ipv4(_) | Host::Ipv6(_) => url.host_str()?.to_string(),
    };

    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    })
}

fn is_host_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use checkout_bridge_core::CartLineItem;

    use super::*;

    fn two_line_cart() -> Cart {
        Cart::new(vec![
            CartLineItem::parse("1001", "2").unwrap(),
            CartLineItem::parse("1002", "1").unwrap(),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_attempt_builds_permalink() {
        let outcome = PermalinkStrategy
            .attempt(&two_line_cart(), "shop.example")
            .await
            .unwrap();

        assert_eq!(
            outcome.checkout_url(),
            Some(
                "https://shop.example/cart/add/1001:2,1002:1?storefront=permalink&from_store=1&country=AR"
            )
        );
    }

    #[tokio::test]
    async fn test_attempt_rejects_unusable_domain() {
        let err = PermalinkStrategy
            .attempt(&two_line_cart(), "evil.example/phish?x=")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidContext(_)));
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("shop.example").as_deref(), Some("shop.example"));
        assert_eq!(
            normalize_domain(" https://WWW.Shop.Example/ ").as_deref(),
            Some("www.shop.example")
        );
        assert_eq!(
            normalize_domain("http://localhost:8080").as_deref(),
            Some("localhost:8080")
        );
        assert!(normalize_domain("").is_none());
        assert!(normalize_domain("https://").is_none());
        assert!(normalize_domain("shop.example/path").is_none());
        assert!(normalize_domain("user@shop.example").is_none());
        assert_eq!(normalize_domain("shop.example:443").as_deref(), Some("shop.example"));
    }

    #[test]
    fn test_normalize_domain_rejects_malformed_hosts() {
        for bad in [
            "shop.example:",
            "a:b:c",
            "shop..example",
            "shop.example:notaport",
            "shop.example.",
            "-shop.example",
            "shop_1.example",
            "shop.example#top",
            "shop.example?x=1",
        ] {
            assert!(normalize_domain(bad).is_none(), "{bad:?} should be rejected");
        }
    }
}
