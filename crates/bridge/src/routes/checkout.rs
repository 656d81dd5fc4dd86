//! Checkout handlers for the two API-backed strategies.
//!
//! `POST /checkout` uses the service credential; `POST /bridge` replays the
//! request inside the shopper's storefront session.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header::COOKIE},
};
use checkout_bridge_core::{Cart, CartLineItem, Email};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::checkout::{CheckoutContext, CheckoutOutcome};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::tiendanube::SessionCookie;

/// Body for `/checkout` and `/bridge`.
///
/// `variantId` and `quantity` may be JSON numbers or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    variant_id: Option<Value>,
    quantity: Option<Value>,
    email: Option<String>,
}

impl CheckoutRequest {
    fn line_item(&self) -> Result<CartLineItem> {
        let (Some(variant), Some(quantity)) = (
            self.variant_id.as_ref().and_then(scalar_text),
            self.quantity.as_ref().and_then(scalar_text),
        ) else {
            return Err(AppError::bad_request_with_hint(
                "Missing variantId or quantity",
                r#"Send {"variantId": 1001, "quantity": 1}"#,
            ));
        };

        CartLineItem::parse(&variant, &quantity).map_err(|e| AppError::bad_request(e.to_string()))
    }

    fn email(&self) -> Result<Option<Email>> {
        self.email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(Email::parse)
            .transpose()
            .map_err(|e| AppError::bad_request(e.to_string()))
    }
}

/// Numbers and strings are accepted; everything else counts as missing.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_body(payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>) -> Result<CheckoutRequest> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// Create a hosted checkout with the service credential.
#[instrument(skip_all)]
pub async fn merchant_checkout(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = parse_body(payload)?;
    let cart = Cart::single(request.line_item()?);
    let email = request.email()?;

    let outcome = state
        .checkout()
        .attempt(&cart, &CheckoutContext::ServiceCredential { email })
        .await?;

    match outcome {
        CheckoutOutcome::CheckoutUrl(url) => Ok(Json(json!({ "checkoutUrl": url }))),
        CheckoutOutcome::PlatformResponse(raw) => Err(AppError::Upstream {
            message: "Platform response did not include a checkout URL".to_string(),
            details: raw.to_string(),
        }),
    }
}

/// Add to the shopper's storefront cart using their own session cookie.
///
/// The cookie is checked before anything else; without it no outbound call
/// is made.
#[instrument(skip_all)]
pub async fn session_bridge(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let cookie = headers
        .get(COOKIE)
        .and_then(SessionCookie::from_header)
        .ok_or_else(|| {
            AppError::bad_request_with_hint(
                "Missing Cookie header",
                "Forward the shopper's storefront session cookie",
            )
        })?;

    let request = parse_body(payload)?;
    let cart = Cart::single(request.line_item()?);

    let response = match state
        .checkout()
        .attempt(&cart, &CheckoutContext::ShopperSession(cookie))
        .await?
    {
        CheckoutOutcome::PlatformResponse(value) => value,
        CheckoutOutcome::CheckoutUrl(url) => Value::String(url),
    };

    Ok(Json(json!({
        "success": true,
        "message": "Product added to cart",
        "tiendanube_response": response,
    })))
}
