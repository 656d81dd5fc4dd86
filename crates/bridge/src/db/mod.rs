//! Credential Store.
//!
//! Durable mapping from platform store identifier to its OAuth credential and
//! display metadata. This is the only shared state in the bridge; nothing
//! caches records beyond a single request.
//!
//! ## Table
//!
//! - `stores` - one row per store, upserted on `store_id`
//!
//! # Backends
//!
//! - [`PgStoreRepository`] - `PostgreSQL`, used by the server binary
//! - [`MemoryStoreRepository`] - in-process map for tests and local runs
//!
//! # Migrations
//!
//! Migrations are stored in `crates/bridge/migrations/` and run via:
//! ```bash
//! cargo run -p checkout-bridge-cli -- migrate
//! ```

pub mod memory;
pub mod stores;

use std::time::Duration;

use async_trait::async_trait;
use checkout_bridge_core::StoreId;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryStoreRepository;
pub use stores::PgStoreRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

// =============================================================================
// Types
// =============================================================================

/// One tenant store's credential and metadata.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StoreCredentialRecord {
    /// Platform-assigned store identifier (unique key).
    pub store_id: StoreId,
    /// OAuth bearer token scoped to this store (redacted in debug output).
    pub access_token: SecretString,
    /// Display name.
    pub shop_name: String,
    /// Scopes granted at authorization time; empty when the platform sent none.
    pub scopes: Vec<String>,
    /// Custom storefront domain, if known.
    pub domain: Option<String>,
    /// Logo URL, if known.
    pub logo: Option<String>,
    /// Time of the last successful write.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for StoreCredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentialRecord")
            .field("store_id", &self.store_id)
            .field("access_token", &"[REDACTED]")
            .field("shop_name", &self.shop_name)
            .field("scopes", &self.scopes)
            .field("domain", &self.domain)
            .field("logo", &self.logo)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl StoreCredentialRecord {
    /// Public view of the record, without the access token.
    #[must_use]
    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            store_id: self.store_id.clone(),
            shop_name: self.shop_name.clone(),
            domain: self.domain.clone(),
            logo: self.logo.clone(),
            scopes: self.scopes.clone(),
            updated_at: self.updated_at,
        }
    }

}

/// Token-free projection of [`StoreCredentialRecord`] for API responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub store_id: StoreId,
    pub shop_name: String,
    pub domain: Option<String>,
    pub logo: Option<String>,
    pub scopes: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by a successful OAuth exchange.
///
/// `domain` and `logo` are best-effort; `None` keeps whatever the existing
/// record holds.
#[derive(Clone)]
pub struct CredentialUpsert {
    pub store_id: StoreId,
    pub access_token: SecretString,
    pub shop_name: String,
    pub scopes: Vec<String>,
    pub domain: Option<String>,
    pub logo: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for CredentialUpsert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialUpsert")
            .field("store_id", &self.store_id)
            .field("access_token", &"[REDACTED]")
            .field("shop_name", &self.shop_name)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Storage operations on store credentials.
///
/// Every method performs one read or one write; `delete` reads and removes
/// the row in a single transaction. Concurrent upserts for the same store are
/// last-writer-wins.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Point lookup by exact store id. Absence is `Ok(None)`.
    async fn find(&self, store_id: &StoreId)
    -> Result<Option<StoreCredentialRecord>, RepositoryError>;

    /// Insert or overwrite the credential for `upsert.store_id`.
    async fn upsert_credential(
        &self,
        upsert: &CredentialUpsert,
    ) -> Result<StoreCredentialRecord, RepositoryError>;

    /// Set the custom domain. Returns `false` if the store is unknown.
    async fn update_domain(
        &self,
        store_id: &StoreId,
        domain: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// Remove a store unconditionally, returning the deleted record.
    ///
    /// A record that fails to decode is reported as
    /// [`RepositoryError::DataCorruption`] and left in place.
    async fn delete(
        &self,
        store_id: &StoreId,
    ) -> Result<Option<StoreCredentialRecord>, RepositoryError>;

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Join scopes for storage; `None` when empty.
pub(crate) fn join_scopes(scopes: &[String]) -> Option<String> {
    if scopes.is_empty() {
        None
    } else {
        Some(scopes.join(","))
    }
}

/// Split a stored or platform-reported scope string.
#[must_use]
pub fn split_scopes(scope: Option<&str>) -> Vec<String> {
    scope
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_scopes() {
        assert_eq!(
            split_scopes(Some("read_products, read_orders,,write_orders")),
            vec!["read_products", "read_orders", "write_orders"]
        );
        assert!(split_scopes(None).is_empty());
    }

    #[test]
    fn test_join_scopes() {
        assert_eq!(join_scopes(&[]), None);
        assert_eq!(
            join_scopes(&["a".to_string(), "b".to_string()]).as_deref(),
            Some("a,b")
        );
    }

    #[test]
    fn test_record_debug_redacts_token() {
        let record = StoreCredentialRecord {
            store_id: StoreId::parse("42").unwrap(),
            access_token: SecretString::from("tok_very_private"),
            shop_name: "Tienda".to_string(),
            scopes: vec!["write_orders".to_string()],
            domain: None,
            logo: None,
            updated_at: Utc::now(),
        };
        let debug = format!("{record:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok_very_private"));
    }
}
