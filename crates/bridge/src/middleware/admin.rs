//! Admin token guard for the store management routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Reject the request unless `x-admin-token` matches the configured token.
///
/// With no token configured the routes are open.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config().admin_token.as_ref() else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .map(|v| v.as_bytes())
        .unwrap_or_default();

    if bool::from(presented.ct_eq(expected.expose_secret().as_bytes())) {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "admin token rejected");
        AppError::Unauthorized("Invalid or missing admin token".to_string()).into_response()
    }
}
