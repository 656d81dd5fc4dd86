//! Application state shared across handlers.

use std::sync::Arc;

use crate::checkout::CheckoutStrategies;
use crate::config::BridgeConfig;
use crate::db::StoreRepository;
use crate::services::{CredentialResolver, InstallService};
use crate::tiendanube::TiendanubeClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The Credential Store is held as a trait
/// object so the binary can run on `PostgreSQL` and tests on memory.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BridgeConfig,
    stores: Arc<dyn StoreRepository>,
    tiendanube: TiendanubeClient,
    checkout: CheckoutStrategies,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The service credential is injected into the Merchant-API strategy
    /// here, once.
    #[must_use]
    pub fn new(config: BridgeConfig, stores: Arc<dyn StoreRepository>) -> Self {
        let tiendanube = TiendanubeClient::new(&config.tiendanube);
        let checkout = CheckoutStrategies::new(tiendanube.clone(), config.tiendanube.service.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                tiendanube,
                checkout,
            }),
        }
    }

    /// Get a reference to the bridge configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Get the Credential Store.
    #[must_use]
    pub fn stores(&self) -> &dyn StoreRepository {
        self.inner.stores.as_ref()
    }

    /// Get the platform client.
    #[must_use]
    pub fn tiendanube(&self) -> &TiendanubeClient {
        &self.inner.tiendanube
    }

    /// Get the checkout strategies.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutStrategies {
        &self.inner.checkout
    }

    /// A resolver over the Credential Store.
    #[must_use]
    pub fn resolver(&self) -> CredentialResolver<'_> {
        CredentialResolver::new(self.stores())
    }

    /// An install service over the platform client and Credential Store.
    #[must_use]
    pub fn installer(&self) -> InstallService<'_> {
        InstallService::new(self.tiendanube(), self.stores())
    }
}
