//! In-process backend for the Credential Store.
//!
//! Same upsert semantics as the `PostgreSQL` backend, including keeping an
//! existing domain/logo when the upsert carries none. Not durable.

use std::collections::HashMap;

use async_trait::async_trait;
use checkout_bridge_core::StoreId;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CredentialUpsert, RepositoryError, StoreCredentialRecord, StoreRepository};

/// Map-backed store repository.
#[derive(Debug, Default)]
pub struct MemoryStoreRepository {
    records: RwLock<HashMap<StoreId, StoreCredentialRecord>>,
}

impl MemoryStoreRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StoreRepository for MemoryStoreRepository {
    async fn find(
        &self,
        store_id: &StoreId,
    ) -> Result<Option<StoreCredentialRecord>, RepositoryError> {
        Ok(self.records.read().await.get(store_id).cloned())
    }

    async fn upsert_credential(
        &self,
        upsert: &CredentialUpsert,
    ) -> Result<StoreCredentialRecord, RepositoryError> {
        let mut records = self.records.write().await;
        let previous = records.get(&upsert.store_id);

        let record = StoreCredentialRecord {
            store_id: upsert.store_id.clone(),
            access_token: upsert.access_token.clone(),
            shop_name: upsert.shop_name.clone(),
            scopes: upsert.scopes.clone(),
            domain: upsert
                .domain
                .clone()
                .or_else(|| previous.and_then(|p| p.domain.clone())),
            logo: upsert
                .logo
                .clone()
                .or_else(|| previous.and_then(|p| p.logo.clone())),
            updated_at: upsert.updated_at,
        };

        records.insert(record.store_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_domain(
        &self,
        store_id: &StoreId,
        domain: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(store_id).is_some_and(|record| {
            record.domain = Some(domain.to_string());
            record.updated_at = updated_at;
            true
        }))
    }

    async fn delete(
        &self,
        store_id: &StoreId,
    ) -> Result<Option<StoreCredentialRecord>, RepositoryError> {
        Ok(self.records.write().await.remove(store_id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
