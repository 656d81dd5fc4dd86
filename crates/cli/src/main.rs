//! Checkout bridge CLI - database migrations and store management.
//!
//! # Usage
//!
//! ```bash
//! # Apply the Credential Store migrations
//! cb-cli migrate
//!
//! # Inspect a store (never prints the token)
//! cb-cli store show 123456
//!
//! # Point permalinks at a storefront host
//! cb-cli store set-domain 123456 www.mitienda.com.ar
//!
//! # Remove a store's credential
//! cb-cli store delete 123456
//! ```
//!
//! All commands read `BRIDGE_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cb-cli")]
#[command(author, version, about = "Checkout bridge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage stored credentials
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Show a store's metadata
    Show {
        /// Store ID
        store_id: String,
    },
    /// Delete a store's credential
    Delete {
        /// Store ID
        store_id: String,
    },
    /// Set the storefront domain used for permalinks
    SetDomain {
        /// Store ID
        store_id: String,
        /// Bare host, e.g. `www.mitienda.com.ar`
        domain: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Store { action } => match action {
            StoreAction::Show { store_id } => commands::store::show(&store_id).await?,
            StoreAction::Delete { store_id } => commands::store::delete(&store_id).await?,
            StoreAction::SetDomain { store_id, domain } => {
                commands::store::set_domain(&store_id, &domain).await?;
            }
        },
    }
    Ok(())
}
