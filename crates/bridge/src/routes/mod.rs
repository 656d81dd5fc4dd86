//! HTTP route handlers for the bridge.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness
//! GET    /health/ready          - Credential Store reachable
//!
//! # OAuth
//! GET    /install?shop=         - Redirect to platform authorization
//! GET    /callback?code=        - Exchange code, store credential
//!
//! # Checkout
//! POST   /checkout              - Merchant-API strategy (service credential)
//! POST   /bridge                - Session-Proxy strategy (shopper cookie)
//! GET    /comprar/{pairs}?shop= - Permalink strategy (redirect)
//! GET    /checkout-redirect     - Intermediary page to /comprar
//!
//! # Stores (x-admin-token when configured)
//! GET    /store/{storeId}       - Store metadata
//! PUT    /store/domain          - Set storefront domain
//! DELETE /store?storeId=        - Remove credential
//! ```

pub mod checkout;
pub mod oauth;
pub mod permalink;
pub mod stores;

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{ADMIN_TOKEN_HEADER, request_id_middleware, require_admin_token};
use crate::state::AppState;

/// Create the store management routes, guarded by the admin token.
pub fn store_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", delete(stores::delete))
        .route("/domain", put(stores::update_domain))
        .route("/{store_id}", get(stores::show))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_token,
        ))
}

/// Create all routes for the bridge.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // OAuth
        .route("/install", get(oauth::install))
        .route("/callback", get(oauth::callback))
        // Checkout strategies
        .route("/checkout", post(checkout::merchant_checkout))
        .route("/bridge", post(checkout::session_bridge))
        .route("/comprar/{pairs}", get(permalink::permalink_checkout))
        .route("/checkout-redirect", get(permalink::checkout_redirect))
        // Store management
        .nest("/store", store_routes(state))
}

/// Build the full application: routes, health checks and middleware.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes(&state))
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// CORS for the headless frontend. Unparseable origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ADMIN_TOKEN_HEADER)])
        .allow_credentials(true)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 if the Credential Store does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.stores().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
