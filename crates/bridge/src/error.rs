//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before the JSON error body is sent.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::db::RepositoryError;
use crate::services::InstallError;
use crate::tiendanube::PlatformError;

/// Application-level error type for the bridge.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid client input.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable description.
        message: String,
        /// Usage hint, when one helps.
        hint: Option<String>,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Admin token missing or wrong.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The platform rejected or failed a call. `details` is its raw text.
    #[error("Upstream error: {message}")]
    Upstream {
        /// What we were doing.
        message: String,
        /// Platform's raw error body.
        details: String,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A 400 without a hint.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            hint: None,
        }
    }

    /// A 400 with a usage hint.
    pub fn bad_request_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream { .. } | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Rejected { status, body } => Self::Upstream {
                message: format!("Platform rejected the request with status {status}"),
                details: body,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::InvalidContext(message) => Self::bad_request(message),
            CheckoutError::Platform(e) => e.into(),
            CheckoutError::MissingCheckoutUrl { raw } => Self::Upstream {
                message: "Platform response did not include a checkout URL".to_string(),
                details: raw.to_string(),
            },
        }
    }
}

impl From<InstallError> for AppError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::Platform(e) => Self::Internal(e.to_string()),
            InstallError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Upstream { .. }
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = match self {
            Self::BadRequest {
                message,
                hint: Some(hint),
            } => json!({ "error": message, "hint": hint }),
            Self::BadRequest {
                message,
                hint: None,
            } => json!({ "error": message }),
            Self::Upstream { message, details } => json!({ "error": message, "details": details }),
            Self::NotFound(message) | Self::Unauthorized(message) | Self::Internal(message) => {
                json!({ "error": message })
            }
            Self::Database(e) => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
