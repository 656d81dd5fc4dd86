//! Core types for the checkout bridge.
//!
//! This module provides type-safe wrappers for the concepts shared between
//! the Credential Store, the cart encoders and the checkout strategies.

pub mod cart;
pub mod email;
pub mod id;
pub mod token;

pub use cart::{Cart, CartError, CartLineItem, Quantity};
pub use email::{Email, EmailError};
pub use id::{IdError, StoreId, VariantId};
pub use token::TokenGrammar;
