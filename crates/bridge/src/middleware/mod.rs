//! HTTP middleware for the bridge.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (headless frontend origins)
//! 5. Admin token (store management routes only)

pub mod admin;
pub mod request_id;

pub use admin::{ADMIN_TOKEN_HEADER, require_admin_token};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
