//! Permalink checkout and the intermediary redirect page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use checkout_bridge_core::{Cart, StoreId};
use serde::Deserialize;
use tracing::instrument;

use crate::checkout::{CheckoutContext, CheckoutOutcome};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for `/comprar/{pairs}`.
#[derive(Debug, Deserialize)]
pub struct PermalinkParams {
    shop: Option<String>,
}

/// Query parameters for `/checkout-redirect`.
#[derive(Debug, Deserialize)]
pub struct IntermediaryParams {
    cart: Option<String>,
    shop: Option<String>,
}

/// Page that moves the shopper's browser onto the bridge's origin.
#[derive(Template, WebTemplate)]
#[template(path = "checkout_redirect.html")]
pub struct CheckoutRedirectTemplate {
    /// Same-origin path to `/comprar/{pairs}?shop=`.
    pub target: String,
}

fn required(value: Option<String>, name: &str, hint: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request_with_hint(format!("Missing {name} parameter"), hint))
}

fn parse_store(shop: &str) -> Result<StoreId> {
    StoreId::parse(shop).map_err(|e| AppError::bad_request(e.to_string()))
}

fn parse_cart(token: &str) -> Result<Cart> {
    Cart::from_path_token(token).map_err(|e| {
        AppError::bad_request_with_hint(e.to_string(), "Use /comprar/VARIANT-QTY-VARIANT-QTY?shop=STORE_ID")
    })
}

/// Redirect to the store's cart permalink.
///
/// An unknown store, or one without a usable domain, sends the shopper back
/// to the frontend instead.
#[instrument(skip(state))]
pub async fn permalink_checkout(
    State(state): State<AppState>,
    Path(pairs): Path<String>,
    Query(params): Query<PermalinkParams>,
) -> Result<Redirect> {
    let shop = required(
        params.shop,
        "shop",
        "Use /comprar/VARIANT-QTY?shop=STORE_ID",
    )?;
    let cart = parse_cart(&pairs)?;
    let store_id = parse_store(&shop)?;

    let Some(domain) = state.resolver().resolve_domain(&store_id).await? else {
        tracing::warn!(%store_id, "store not found or has no domain; sending shopper home");
        return Ok(Redirect::to(&state.config().frontend_url));
    };

    let outcome = state
        .checkout()
        .attempt(&cart, &CheckoutContext::StoreDomain(domain))
        .await?;

    match outcome {
        CheckoutOutcome::CheckoutUrl(url) => Ok(Redirect::to(&url)),
        CheckoutOutcome::PlatformResponse(_) => {
            Err(AppError::Internal("permalink produced no URL".to_string()))
        }
    }
}

/// Render the intermediary page forwarding to `/comprar/{pairs}?shop=`.
#[instrument(skip_all)]
pub async fn checkout_redirect(
    Query(params): Query<IntermediaryParams>,
) -> Result<CheckoutRedirectTemplate> {
    let hint = "Use /checkout-redirect?cart=VARIANT-QTY&shop=STORE_ID";
    let token = required(params.cart, "cart", hint)?;
    let shop = required(params.shop, "shop", hint)?;

    let cart = parse_cart(&token)?;
    let store_id = parse_store(&shop)?;

    Ok(CheckoutRedirectTemplate {
        target: format!("/comprar/{}?shop={}", cart.to_path_token(), store_id),
    })
}
