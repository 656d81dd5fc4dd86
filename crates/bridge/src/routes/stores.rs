//! Store management handlers (admin).

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use checkout_bridge_core::StoreId;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::checkout::normalize_domain;
use crate::db::StoreSummary;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Message returned for unknown stores.
pub const STORE_NOT_FOUND: &str = "Store no encontrado";

/// Query parameters for `DELETE /store`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    store_id: Option<String>,
}

/// Body for `PUT /store/domain`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainUpdate {
    store_id: Option<String>,
    domain: Option<String>,
}

fn parse_store_id(raw: Option<&str>) -> Result<StoreId> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing storeId"))?;
    StoreId::parse(raw).map_err(|e| AppError::bad_request(e.to_string()))
}

/// Store metadata, never the token.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<Json<StoreSummary>> {
    let store_id = parse_store_id(Some(&store_id))?;
    state
        .resolver()
        .resolve(&store_id)
        .await?
        .map(|record| Json(record.summary()))
        .ok_or_else(|| AppError::NotFound(STORE_NOT_FOUND.to_string()))
}

/// Set the storefront domain used for permalinks.
#[instrument(skip_all)]
pub async fn update_domain(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DomainUpdate>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(update) = payload.map_err(|r| AppError::bad_request(r.body_text()))?;
    let store_id = parse_store_id(update.store_id.as_deref())?;
    let domain = update
        .domain
        .as_deref()
        .and_then(normalize_domain)
        .ok_or_else(|| {
            AppError::bad_request_with_hint("Missing or invalid domain", "Send a bare host such as shop.example")
        })?;

    if !state
        .stores()
        .update_domain(&store_id, &domain, Utc::now())
        .await?
    {
        return Err(AppError::NotFound(STORE_NOT_FOUND.to_string()));
    }

    tracing::info!(%store_id, %domain, "store domain updated");
    Ok(Json(json!({
        "success": true,
        "storeId": store_id,
        "domain": domain,
    })))
}

/// Remove a store's credential.
///
/// An unknown store is a 404 `{success: false, error}`, not a failure.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<Response> {
    let store_id = parse_store_id(params.store_id.as_deref())?;

    let Some(record) = state.stores().delete(&store_id).await? else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": STORE_NOT_FOUND })),
        )
            .into_response());
    };

    tracing::info!(%store_id, "store credential deleted");
    Ok(Json(json!({
        "success": true,
        "deletedStore": record.summary(),
        "deletedCount": 1,
    }))
    .into_response())
}
