//! Store credential resolution.

use checkout_bridge_core::StoreId;
use tracing::instrument;

use crate::checkout::normalize_domain;
use crate::db::{RepositoryError, StoreCredentialRecord, StoreRepository};

/// Point lookups against the Credential Store.
///
/// An absent store is `Ok(None)`, never an error. No secondary indices, no
/// fallback search, no caching.
pub struct CredentialResolver<'a> {
    stores: &'a dyn StoreRepository,
}

impl<'a> CredentialResolver<'a> {
    /// Create a resolver over `stores`.
    #[must_use]
    pub const fn new(stores: &'a dyn StoreRepository) -> Self {
        Self { stores }
    }

    /// Look up the credential record for `store_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only if the store itself fails.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        store_id: &StoreId,
    ) -> Result<Option<StoreCredentialRecord>, RepositoryError> {
        let record = self.stores.find(store_id).await?;
        if record.is_none() {
            tracing::debug!("store not registered");
        }
        Ok(record)
    }

    /// Resolve the storefront host for `store_id`.
    ///
    /// `None` when the store is unknown or has no usable domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only if the store itself fails.
    pub async fn resolve_domain(&self, store_id: &StoreId) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .resolve(store_id)
            .await?
            .and_then(|record| record.domain)
            .as_deref()
            .and_then(normalize_domain))
    }
}
