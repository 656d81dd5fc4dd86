//! Business logic sitting between the routes and the platform/database.
//!
//! - `install` - OAuth code exchange and credential persistence
//! - `resolver` - Store credential lookup

pub mod install;
pub mod resolver;

pub use install::{DEFAULT_SHOP_NAME, INSTALL_SCOPES, InstallError, InstallOutcome, InstallService};
pub use resolver::CredentialResolver;
