//! Checkout bridge library.
//!
//! OAuth install and credential storage for Tiendanube stores, plus three
//! ways of turning a headless cart into a platform checkout. Exposed as a
//! library so the binary, the CLI and the integration tests share it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod tiendanube;
