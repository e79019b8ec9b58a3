//! # Domain Module
//!
//! Key space rules, the entity trait and error types.

pub mod entity;
pub mod errors;
pub mod keys;

pub use entity::Entity;
pub use errors::{KeyError, StoreError};
pub use keys::{decode_key, encode_key, range_bounds, KeyRange, LedgerKey, KEY_SEPARATOR};
