//! Newtype identifiers for platform entities.
//!
//! Use the `define_id!` macro to create type-safe string ID wrappers that
//! prevent accidentally passing a variant identifier where a store identifier
//! is expected (both are numeric strings on the platform).

use thiserror::Error;

/// Errors that can occur when parsing a platform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input string is empty.
    #[error("{kind} cannot be empty")]
    Empty {
        /// Which identifier was being parsed.
        kind: &'static str,
    },
    /// The input string is too long.
    #[error("{kind} must be at most {max} characters")]
    TooLong {
        /// Which identifier was being parsed.
        kind: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("{kind} contains invalid character {found:?}")]
    InvalidCharacter {
        /// Which identifier was being parsed.
        kind: &'static str,
        /// The offending character.
        found: char,
    },
}

/// Maximum length accepted for any platform identifier.
const MAX_ID_LENGTH: usize = 64;

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - A validating `parse()` constructor using the supplied character predicate
/// - `Display`, `FromStr` and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use checkout_bridge_core::define_id;
/// define_id!(OrderId, "order id", |c: char| c.is_ascii_digit());
///
/// assert!(OrderId::parse("123").is_ok());
/// assert!(OrderId::parse("12a").is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $kind:literal, $allowed:expr) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, rejecting empty, oversized or
            /// out-of-charset input.
            ///
            /// # Errors
            ///
            /// Returns an [`IdError`]($crate::IdError) describing the first
            /// violation found.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                $crate::types::id::validate(s, $kind, $allowed).map(|()| Self(s.to_owned()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

#[doc(hidden)]
pub fn validate(s: &str, kind: &'static str, allowed: impl Fn(char) -> bool) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty { kind });
    }
    if s.len() > MAX_ID_LENGTH {
        return Err(IdError::TooLong {
            kind,
            max: MAX_ID_LENGTH,
        });
    }
    if let Some(found) = s.chars().find(|c| !allowed(*c)) {
        return Err(IdError::InvalidCharacter { kind, found });
    }
    Ok(())
}

// Store identifiers are the platform's numeric `user_id`, kept as text.
define_id!(StoreId, "store id", |c: char| c.is_ascii_alphanumeric() || c == '_');

// Variant identifiers are embedded in cart tokens without escaping, so they
// are restricted to digits: `:`, `,` and `-` are token separators.
define_id!(VariantId, "variant id", |c: char| c.is_ascii_digit());
