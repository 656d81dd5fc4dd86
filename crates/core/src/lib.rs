//! Checkout Bridge Core - Shared types library.
//!
//! This crate provides the domain types used across the checkout bridge:
//! - `bridge` - HTTP service that turns headless carts into platform checkouts
//! - `cli` - Command-line tools for migrations and store management
//!
//! # Architecture
//!
//! The core crate contains only types and pure transforms - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere (including the frontend build tooling).
//!
//! # Modules
//!
//! - [`types`] - Store and variant identifiers, carts, cart tokens, emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
