//! Checkout strategies.
//!
//! Three interchangeable ways to turn a [`Cart`] into a live checkout on the
//! platform. They differ only in the context they need:
//!
//! | Strategy                   | Context                  | Result                |
//! |----------------------------|--------------------------|-----------------------|
//! | [`MerchantApiStrategy`]    | service bearer token     | hosted checkout URL   |
//! | [`SessionProxyStrategy`]   | shopper session cookie   | storefront response   |
//! | [`PermalinkStrategy`]      | store domain             | permalink URL         |
//!
//! Callers pick a strategy by the context they hold, through
//! [`CheckoutContext`] and [`CheckoutStrategies::attempt`]. Every attempt is
//! single-shot: no retries, no partial results.

mod merchant_api;
mod permalink;
mod session_proxy;

pub use merchant_api::MerchantApiStrategy;
pub use permalink::{PermalinkStrategy, normalize_domain, permalink_url};
pub use session_proxy::SessionProxyStrategy;

use std::future::Future;

use checkout_bridge_core::{Cart, Email};
use serde_json::Value;
use thiserror::Error;

use crate::config::ServiceCredential;
use crate::tiendanube::{PlatformError, SessionCookie, TiendanubeClient};

/// What a successful attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Absolute URL the shopper's browser should navigate to.
    CheckoutUrl(String),
    /// The platform's own response, relayed unmodified.
    PlatformResponse(Value),
}

impl CheckoutOutcome {
    /// The checkout URL, if this outcome is one.
    #[must_use]
    pub fn checkout_url(&self) -> Option<&str> {
        match self {
            Self::CheckoutUrl(url) => Some(url),
            Self::PlatformResponse(_) => None,
        }
    }
}

/// Errors a checkout attempt can fail with.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The caller's context cannot be used (blank cookie, bad domain).
    #[error("invalid checkout context: {0}")]
    InvalidContext(String),

    /// The platform call failed or was rejected.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The platform accepted the cart but returned no checkout URL.
    #[error("platform response did not include a checkout URL")]
    MissingCheckoutUrl {
        /// The response that lacked it.
        raw: Value,
    },
}

/// Result type alias for checkout attempts.
pub type CheckoutResult = Result<CheckoutOutcome, CheckoutError>;

/// One way of converting a cart into a platform checkout.
pub trait CheckoutStrategy {
    /// What the strategy needs besides the cart.
    type Context: ?Sized + Sync;

    /// Attempt the checkout once.
    fn attempt(
        &self,
        cart: &Cart,
        context: &Self::Context,
    ) -> impl Future<Output = CheckoutResult> + Send;
}

/// The context a caller holds, which selects the strategy.
#[derive(Debug, Clone)]
pub enum CheckoutContext {
    /// Use the configured service credential; optionally prefill an email.
    ServiceCredential {
        /// Shopper email attached to the cart.
        email: Option<Email>,
    },
    /// Replay inside the shopper's storefront session.
    ShopperSession(SessionCookie),
    /// Build a permalink for this storefront host.
    StoreDomain(String),
}

impl CheckoutContext {
    /// Short name for logs.
    #[must_use]
    pub const fn strategy_name(&self) -> &'static str {
        match self {
            Self::ServiceCredential { .. } => "merchant_api",
            Self::ShopperSession(_) => "session_proxy",
            Self::StoreDomain(_) => "permalink",
        }
    }
}

/// All three strategies, dispatched by [`CheckoutContext`].
#[derive(Clone)]
pub struct CheckoutStrategies {
    merchant_api: MerchantApiStrategy,
    session_proxy: SessionProxyStrategy,
    permalink: PermalinkStrategy,
}

impl CheckoutStrategies {
    /// Build the strategies around one platform client.
    #[must_use]
    pub fn new(client: TiendanubeClient, service: ServiceCredential) -> Self {
        Self {
            merchant_api: MerchantApiStrategy::new(client.clone(), service),
            session_proxy: SessionProxyStrategy::new(client),
            permalink: PermalinkStrategy,
        }
    }

    /// Attempt a checkout with whichever strategy `context` selects.
    ///
    /// # Errors
    ///
    /// Returns the selected strategy's [`CheckoutError`].
    pub async fn attempt(&self, cart: &Cart, context: &CheckoutContext) -> CheckoutResult {
        let result = match context {
            CheckoutContext::ServiceCredential { email } => {
                self.merchant_api.attempt(cart, email).await
            }
            CheckoutContext::ShopperSession(cookie) => {
                self.session_proxy.attempt(cart, cookie).await
            }
            CheckoutContext::StoreDomain(domain) => self.permalink.attempt(cart, domain.as_str()).await,
        };

        match &result {
            Ok(_) => tracing::info!(
                strategy = context.strategy_name(),
                lines = cart.len(),
                "checkout attempt succeeded"
            ),
            Err(e) => tracing::warn!(
                strategy = context.strategy_name(),
                error = %e,
                "checkout attempt failed"
            ),
        }

        result
    }
}
