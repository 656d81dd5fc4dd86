//! CLI command implementations.

pub mod migrate;
pub mod store;

use checkout_bridge::db::RepositoryError;
use checkout_bridge_core::IdError;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors any command can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Store ID is malformed.
    #[error("Invalid store ID: {0}")]
    InvalidStoreId(#[from] IdError),

    /// Domain is not a bare host.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// No credential for the store.
    #[error("Store not found: {0}")]
    StoreNotFound(String),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Connect using `BRIDGE_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BRIDGE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("BRIDGE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(checkout_bridge::db::create_pool(&SecretString::from(database_url)).await?)
}
