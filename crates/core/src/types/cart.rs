//! Cart and line item types.
//!
//! A [`Cart`] is shopper intent captured outside the platform: an ordered,
//! non-empty list of `(variant, quantity)` pairs. Order survives encoding but
//! carries no business meaning; the platform treats the lines as a set of
//! additions.

use core::fmt;
use core::num::NonZeroU32;

use thiserror::Error;

use super::id::{IdError, VariantId};

/// Errors that can occur when building or decoding a [`Cart`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A cart must contain at least one line item.
    #[error("cart cannot be empty")]
    Empty,
    /// A quantity was zero, negative or not a number.
    #[error("invalid quantity {0:?}: must be a positive integer")]
    InvalidQuantity(String),
    /// A variant identifier failed validation.
    #[error("invalid variant: {0}")]
    InvalidVariant(#[from] IdError),
    /// A token segment did not match the expected grammar.
    #[error("malformed cart token segment {0:?}")]
    MalformedSegment(String),
}

/// A strictly positive line item quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, rejecting zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Parse a quantity from its decimal text form.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for anything other than a
    /// positive base-10 integer (signs and whitespace are rejected).
    pub fn parse(s: &str) -> Result<Self, CartError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CartError::InvalidQuantity(s.to_owned()));
        }
        s.parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| CartError::InvalidQuantity(s.to_owned()))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single `(variant, quantity)` addition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartLineItem {
    /// Platform variant identifier.
    pub variant_id: VariantId,
    /// How many units to add.
    pub quantity: Quantity,
}

impl CartLineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(variant_id: VariantId, quantity: Quantity) -> Self {
        Self {
            variant_id,
            quantity,
        }
    }

    /// Parse a line item from raw text parts.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if either part is invalid.
    pub fn parse(variant_id: &str, quantity: &str) -> Result<Self, CartError> {
        Ok(Self {
            variant_id: VariantId::parse(variant_id)?,
            quantity: Quantity::parse(quantity)?,
        })
    }
}

/// An ordered, non-empty collection of line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create a cart from line items.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] if `items` is empty.
    pub fn new(items: Vec<CartLineItem>) -> Result<Self, CartError> {
        if items.is_empty() {
            return Err(CartError::Empty);
        }
        Ok(Self { items })
    }

    /// Create a cart holding exactly one line item.
    #[must_use]
    pub fn single(item: CartLineItem) -> Self {
        Self { items: vec![item] }
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of line items (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; carts are non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLineItem;
    type IntoIter = core::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
