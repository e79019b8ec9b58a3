//! # Error Types
//!
//! Errors raised by the key space and the entity store.

use crate::ports::StorageError;
use thiserror::Error;

/// Errors from key encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Entity id cannot be encoded.
    #[error("invalid identifier {id:?}: {reason}")]
    InvalidIdentifier { id: String, reason: &'static str },

    /// Entity kind is not a valid key prefix.
    #[error("invalid entity kind {kind:?}")]
    InvalidKind { kind: String },
}

/// Errors from entity store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The `(kind, id)` pair cannot be turned into a key.
    #[error(transparent)]
    InvalidIdentifier(#[from] KeyError),

    /// Create was called for an entity that is already stored.
    #[error("the {kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },

    /// The entity is not stored.
    #[error("the {kind} {id} does not exist")]
    NotFound { kind: &'static str, id: String },

    /// Stored bytes do not decode to the expected entity shape.
    #[error("corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// The backing key-value store failed.
    #[error("world state unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// The entity could not be serialized.
    #[error("failed to serialize {kind} {id}: {reason}")]
    Serialization {
        kind: &'static str,
        id: String,
        reason: String,
    },
}

impl StoreError {
    /// Returns true for the absence error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
