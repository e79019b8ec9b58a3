//! # Error Types
//!
//! Errors raised while constructing shared identifiers.

use thiserror::Error;

/// Errors produced when an identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier was empty.
    #[error("{kind} identifier cannot be empty")]
    Empty { kind: &'static str },

    /// Identifier contained a character that is not allowed.
    #[error("{kind} identifier {value:?} contains invalid character {ch:?}")]
    InvalidCharacter {
        kind: &'static str,
        value: String,
        ch: char,
    },
}
