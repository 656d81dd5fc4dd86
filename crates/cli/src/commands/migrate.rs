//! Database migration command.
//!
//! Applies `crates/bridge/migrations/` to the Credential Store database.
//! The server never migrates on startup.

use super::{CommandError, connect};

/// Run the bridge migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running bridge migrations...");
    sqlx::migrate!("../bridge/migrations").run(&pool).await?;

    tracing::info!("Bridge migrations complete!");
    Ok(())
}
