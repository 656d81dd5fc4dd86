//! Store credential management commands.

use checkout_bridge::checkout::normalize_domain;
use checkout_bridge::db::{PgStoreRepository, StoreRepository};
use checkout_bridge_core::StoreId;
use chrono::Utc;

use super::{CommandError, connect};

async fn repository() -> Result<PgStoreRepository, CommandError> {
    Ok(PgStoreRepository::new(connect().await?))
}

/// Print a store's metadata as JSON.
pub async fn show(store_id: &str) -> Result<(), CommandError> {
    let store_id = StoreId::parse(store_id)?;
    let record = repository()
        .await?
        .find(&store_id)
        .await?
        .ok_or_else(|| CommandError::StoreNotFound(store_id.to_string()))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&record.summary())?);
    }
    Ok(())
}

/// Delete a store's credential.
pub async fn delete(store_id: &str) -> Result<(), CommandError> {
    let store_id = StoreId::parse(store_id)?;
    repository()
        .await?
        .delete(&store_id)
        .await?
        .ok_or_else(|| CommandError::StoreNotFound(store_id.to_string()))?;

    tracing::info!(%store_id, "Store credential deleted");
    Ok(())
}

/// Set the storefront domain used for permalinks.
pub async fn set_domain(store_id: &str, domain: &str) -> Result<(), CommandError> {
    let store_id = StoreId::parse(store_id)?;
    let domain =
        normalize_domain(domain).ok_or_else(|| CommandError::InvalidDomain(domain.to_string()))?;

    let updated = repository()
        .await?
        .update_domain(&store_id, &domain, Utc::now())
        .await?;
    if !updated {
        return Err(CommandError::StoreNotFound(store_id.to_string()));
    }

    tracing::info!(%store_id, %domain, "Store domain updated");
    Ok(())
}
