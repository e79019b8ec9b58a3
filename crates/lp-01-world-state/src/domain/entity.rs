//! # Entity Trait
//!
//! A record kind stored in the world state. The kind is an explicit constant
//! per type, never derived from the Rust type name, so renaming a type can
//! never move its records to a different key range.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed record stored under `(KIND, id)`.
pub trait Entity: Serialize + DeserializeOwned {
    /// Key prefix for this kind. Must match `[A-Za-z0-9_]+`.
    const KIND: &'static str;

    /// Caller-supplied identifier, unique within `KIND`.
    fn id(&self) -> &str;
}
