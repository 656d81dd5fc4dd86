//! Cart token grammars.
//!
//! Carts travel through URLs in one of two compact textual forms:
//!
//! | Grammar       | Example          | Used by                          |
//! |---------------|------------------|----------------------------------|
//! | `Permalink`   | `1001:2,1002:1`  | platform `/cart/add/{token}` URL |
//! | `PathSegment` | `1001-2-1002-1`  | bridge `/comprar/{token}` route  |
//!
//! Neither grammar escapes separators, which is why [`VariantId`] is
//! restricted to digits. Decoding fails closed on malformed input; the only
//! fallback is the path-segment grammar's trailing variant without a
//! quantity, which defaults to one.

use super::cart::{Cart, CartError, CartLineItem, Quantity};
use super::id::VariantId;

/// Which textual cart encoding to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenGrammar {
    /// `variant:quantity` pairs separated by `,`.
    Permalink,
    /// Alternating `variant-quantity-variant-quantity` components.
    PathSegment,
}

impl TokenGrammar {
    /// Encode a cart in this grammar.
    #[must_use]
    pub fn encode(self, cart: &Cart) -> String {
        let parts = cart.items().iter().map(|item| match self {
            Self::Permalink => format!("{}:{}", item.variant_id, item.quantity),
            Self::PathSegment => format!("{}-{}", item.variant_id, item.quantity),
        });
        let separator = match self {
            Self::Permalink => ",",
            Self::PathSegment => "-",
        };
        parts.collect::<Vec<_>>().join(separator)
    }

    /// Decode a token in this grammar.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] for an empty token, an empty component, a
    /// missing permalink quantity, an invalid variant or an invalid quantity.
    pub fn decode(self, token: &str) -> Result<Cart, CartError> {
        match self {
            Self::Permalink => decode_permalink(token),
            Self::PathSegment => decode_path_segment(token),
        }
    }
}

impl Cart {
    /// Encode as `1001:2,1002:1`.
    #[must_use]
    pub fn to_permalink_token(&self) -> String {
        TokenGrammar::Permalink.encode(self)
    }

    /// Encode as `1001-2-1002-1`.
    #[must_use]
    pub fn to_path_token(&self) -> String {
        TokenGrammar::PathSegment.encode(self)
    }

    /// Decode a `1001:2,1002:1` token.
    ///
    /// # Errors
    ///
    /// See [`TokenGrammar::decode`].
    pub fn from_permalink_token(token: &str) -> Result<Self, CartError> {
        TokenGrammar::Permalink.decode(token)
    }

    /// Decode a `1001-2-1002-1` token.
    ///
    /// # Errors
    ///
    /// See [`TokenGrammar::decode`].
    pub fn from_path_token(token: &str) -> Result<Self, CartError> {
        TokenGrammar::PathSegment.decode(token)
    }
}

fn decode_permalink(token: &str) -> Result<Cart, CartError> {
    if token.is_empty() {
        return Err(CartError::Empty);
    }

    let items = token
        .split(',')
        .map(|pair| {
            let (variant, quantity) = pair
                .split_once(':')
                .ok_or_else(|| CartError::MalformedSegment(pair.to_owned()))?;
            CartLineItem::parse(variant, quantity)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Cart::new(items)
}

fn decode_path_segment(token: &str) -> Result<Cart, CartError> {
    if token.is_empty() {
        return Err(CartError::Empty);
    }

    let parts: Vec<&str> = token.split('-').collect();
    if let Some(empty) = parts.iter().position(|p| p.is_empty()) {
        return Err(CartError::MalformedSegment(format!(
            "empty component at position {empty}"
        )));
    }

    let items = parts
        .chunks(2)
        .map(|chunk| match *chunk {
            [variant, quantity] => CartLineItem::parse(variant, quantity),
            // Odd length: the trailing variant has no quantity.
            [variant] => Ok(CartLineItem::new(VariantId::parse(variant)?, Quantity::ONE)),
            _ => Err(CartError::MalformedSegment(chunk.join("-"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Cart::new(items)
}
