//! OAuth install flow handlers.
//!
//! `GET /install?shop=` sends the merchant to the platform's consent page;
//! `GET /callback?code=` finishes the exchange and stores the credential.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use checkout_bridge_core::StoreId;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::{INSTALL_SCOPES, InstallOutcome};
use crate::state::AppState;

/// Query parameters for `/install`.
#[derive(Debug, Deserialize)]
pub struct InstallParams {
    shop: Option<String>,
}

/// Query parameters for `/callback`.
#[derive(Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl std::fmt::Debug for CallbackParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackParams")
            .field("code", &self.code.as_ref().map(|_| "[REDACTED]"))
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Redirect the merchant to the platform's authorization page.
///
/// The store id travels as `state` and is echoed back on the callback.
#[instrument(skip(state))]
pub async fn install(
    State(state): State<AppState>,
    Query(params): Query<InstallParams>,
) -> Result<Redirect> {
    let shop = params
        .shop
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            AppError::bad_request_with_hint("Missing shop parameter", "Use /install?shop=STORE_ID")
        })?;
    let store_id = StoreId::parse(shop.trim()).map_err(|e| {
        AppError::bad_request_with_hint(e.to_string(), "Use /install?shop=STORE_ID")
    })?;

    let url = state.tiendanube().authorization_url(
        &state.config().oauth_redirect_uri(),
        INSTALL_SCOPES,
        store_id.as_str(),
    );

    tracing::info!(%store_id, "redirecting to platform authorization");
    Ok(Redirect::to(&url))
}

/// Finish the install: exchange the code and store the credential.
///
/// A platform that answers without a token gets its payload echoed in a 200
/// `{error, data}` body; nothing is written in that case.
#[instrument(skip(state))]
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = params.error {
        tracing::warn!(%error, "merchant did not authorize the app");
        return Err(AppError::bad_request(
            params.error_description.unwrap_or(error),
        ));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing code parameter"))?;

    match state.installer().complete(&code).await? {
        InstallOutcome::Installed(record) => {
            let target = format!(
                "{}/?shop={}",
                state.config().frontend_url,
                urlencoding::encode(record.store_id.as_str())
            );
            Ok(Redirect::to(&target).into_response())
        }
        InstallOutcome::Rejected(payload) => Ok(Json(json!({
            "error": "Token exchange rejected by platform",
            "data": payload,
        }))
        .into_response()),
    }
}
