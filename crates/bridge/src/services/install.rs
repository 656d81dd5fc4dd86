//! OAuth install: exchange an authorization code and persist the credential.

use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::db::{
    CredentialUpsert, RepositoryError, StoreCredentialRecord, StoreRepository, split_scopes,
};
use crate::tiendanube::{PlatformError, StoreProfile, TiendanubeClient, TokenExchange};

/// Shop name stored when the platform reports none.
pub const DEFAULT_SHOP_NAME: &str = "Tienda Nueva";

/// Scopes requested at install time.
pub const INSTALL_SCOPES: &[&str] = &["read_products", "read_orders", "write_orders"];

/// Errors that can occur while completing an install.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The token endpoint could not be reached or answered garbage.
    #[error("token exchange failed: {0}")]
    Platform(#[from] PlatformError),

    /// The credential could not be stored.
    #[error("failed to store credential: {0}")]
    Repository(#[from] RepositoryError),
}

/// How an install attempt ended.
#[derive(Debug)]
pub enum InstallOutcome {
    /// A credential was issued and stored.
    Installed(StoreCredentialRecord),
    /// The platform declined; its payload is relayed as-is. Nothing was written.
    Rejected(Value),
}

/// Completes the OAuth install flow.
pub struct InstallService<'a> {
    client: &'a TiendanubeClient,
    stores: &'a dyn StoreRepository,
}

impl<'a> InstallService<'a> {
    /// Create a new install service.
    #[must_use]
    pub const fn new(client: &'a TiendanubeClient, stores: &'a dyn StoreRepository) -> Self {
        Self { client, stores }
    }

    /// Exchange `code` for a credential and upsert it.
    ///
    /// Domain and logo come from a best-effort store profile fetch; when
    /// that fails the install still succeeds and previously stored values
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::Platform` if the exchange itself fails, or
    /// `InstallError::Repository` if the upsert fails.
    #[instrument(skip(self, code))]
    pub async fn complete(&self, code: &str) -> Result<InstallOutcome, InstallError> {
        let grant = match self.client.exchange_code(code).await? {
            TokenExchange::Granted(grant) => grant,
            TokenExchange::Rejected(payload) => {
                tracing::warn!("platform declined authorization code");
                return Ok(InstallOutcome::Rejected(payload));
            }
        };

        let profile = match self
            .client
            .get_store_profile(&grant.store_id, grant.access_token.expose_secret())
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(store_id = %grant.store_id, error = %e, "store profile unavailable");
                StoreProfile::default()
            }
        };

        let upsert = CredentialUpsert {
            store_id: grant.store_id,
            access_token: grant.access_token,
            shop_name: grant
                .organization
                .unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string()),
            scopes: split_scopes(grant.scope.as_deref()),
            domain: profile.domain,
            logo: profile.logo,
            updated_at: Utc::now(),
        };

        let record = self.stores.upsert_credential(&upsert).await?;
        tracing::info!(store_id = %record.store_id, "store credential saved");

        Ok(InstallOutcome::Installed(record))
    }
}
