//! Hosted checkout through the commerce API, using the service credential.

use checkout_bridge_core::{Cart, Email};
use secrecy::ExposeSecret;
use tracing::instrument;

use super::{CheckoutError, CheckoutOutcome, CheckoutResult, CheckoutStrategy};
use crate::config::ServiceCredential;
use crate::tiendanube::TiendanubeClient;

/// Creates a cart on the service store and returns its hosted checkout URL.
///
/// The credential is injected at construction and never looked up per call.
/// The Credential Store is not consulted.
#[derive(Clone)]
pub struct MerchantApiStrategy {
    client: TiendanubeClient,
    credential: ServiceCredential,
}

impl MerchantApiStrategy {
    /// Create the strategy with its service credential.
    #[must_use]
    pub const fn new(client: TiendanubeClient, credential: ServiceCredential) -> Self {
        Self { client, credential }
    }
}

impl CheckoutStrategy for MerchantApiStrategy {
    type Context = Option<Email>;

    #[instrument(skip_all, fields(store_id = %self.credential.store_id, lines = cart.len()))]
    async fn attempt(&self, cart: &Cart, email: &Option<Email>) -> CheckoutResult {
        let created = self
            .client
            .create_cart(
                &self.credential.store_id,
                self.credential.access_token.expose_secret(),
                cart,
                email.as_ref(),
            )
            .await?;

        created
            .checkout_url
            .map(CheckoutOutcome::CheckoutUrl)
            .ok_or(CheckoutError::MissingCheckoutUrl { raw: created.raw })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use checkout_bridge_core::CartLineItem;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::tiendanube::PlatformError;
    use crate::tiendanube::tests::config;

    fn strategy(server: &MockServer) -> MerchantApiStrategy {
        let config = config(&server.uri());
        MerchantApiStrategy::new(TiendanubeClient::new(&config), config.service)
    }

    fn cart() -> Cart {
        Cart::single(CartLineItem::parse("1001", "2").unwrap())
    }

    #[tokio::test]
    async fn test_attempt_returns_checkout_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/123456/carts"))
            .and(header("Authentication", "bearer c0ffee1234abcd5678ef90aa11bb22cc"))
            .and(body_json(json!({
                "email": "ana@example.com",
                "products": [{"variant_id": 1001, "quantity": 2}]
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"checkout_url": "https://shop.example/checkout/v3/1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let email = Email::parse("ana@example.com").ok();
        let outcome = strategy(&server).attempt(&cart(), &email).await.unwrap();

        assert_eq!(
            outcome.checkout_url(),
            Some("https://shop.example/checkout/v3/1")
        );
    }

    #[tokio::test]
    async fn test_attempt_falls_back_to_nested_checkout_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/123456/carts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 77,
                "checkout": {"url": "https://shop.example/checkout/v3/77"}
            })))
            .mount(&server)
            .await;

        let outcome = strategy(&server).attempt(&cart(), &None).await.unwrap();

        assert_eq!(
            outcome,
            CheckoutOutcome::CheckoutUrl("https://shop.example/checkout/v3/77".to_string())
        );
    }

    #[tokio::test]
    async fn test_attempt_without_checkout_url_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/123456/carts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
            .mount(&server)
            .await;

        let err = strategy(&server).attempt(&cart(), &None).await.unwrap_err();

        assert!(matches!(err, CheckoutError::MissingCheckoutUrl { raw } if raw == json!({"id": 5})));
    }

    #[tokio::test]
    async fn test_attempt_propagates_platform_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/123456/carts"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string(r#"{"code":422,"message":"Unprocessable"}"#),
            )
            .mount(&server)
            .await;

        let err = strategy(&server).attempt(&cart(), &None).await.unwrap_err();

        match err {
            CheckoutError::Platform(PlatformError::Rejected { status, body }) => {
                assert_eq!(status, 422);
                assert!(body.contains("Unprocessable"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
