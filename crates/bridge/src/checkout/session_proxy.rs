//! Add-to-cart replayed inside the shopper's own storefront session.

use checkout_bridge_core::Cart;
use serde_json::Value;
use tracing::instrument;

use super::{CheckoutOutcome, CheckoutResult, CheckoutStrategy};
use crate::tiendanube::{SessionCookie, TiendanubeClient};

/// Forwards the shopper's session cookie to the storefront cart endpoint.
///
/// Needs no merchant credential and never touches the Credential Store. It
/// can only act within the one session it was handed.
#[derive(Clone)]
pub struct SessionProxyStrategy {
    client: TiendanubeClient,
}

impl SessionProxyStrategy {
    /// Create the strategy.
    #[must_use]
    pub const fn new(client: TiendanubeClient) -> Self {
        Self { client }
    }
}

impl CheckoutStrategy for SessionProxyStrategy {
    type Context = SessionCookie;

    /// Lines are replayed in order. The first failure aborts the attempt;
    /// otherwise the storefront's response to the last line is relayed.
    #[instrument(skip_all, fields(lines = cart.len()))]
    async fn attempt(&self, cart: &Cart, cookie: &SessionCookie) -> CheckoutResult {
        let mut last = Value::Null;
        for item in cart {
            last = self.client.add_to_storefront_cart(cookie, item).await?;
        }
        Ok(CheckoutOutcome::PlatformResponse(last))
    }
}
