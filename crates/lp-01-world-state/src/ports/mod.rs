//! # Ports Layer
//!
//! The backing key-value interface the host ledger runtime supplies to
//! contract code. Everything above it (key space, entity store) is written
//! against this trait only.

use thiserror::Error;

/// A `(key, value)` pair yielded by a range scan.
pub type StateEntry = (String, Vec<u8>);

/// Lazy, one-shot iterator over a key range in ascending key order.
pub type StateIterator<'a> = Box<dyn Iterator<Item = Result<StateEntry, StorageError>> + 'a>;

/// Failures of the backing store itself (never absence).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Backend cannot serve the request.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// Range bounds are inverted.
    #[error("invalid range: start {start:?} is after end {end:?}")]
    InvalidRange { start: String, end: String },
}

/// Key-value world state as seen from inside one transaction.
///
/// Takes `&self` for writes: implementations track pending writes with
/// interior mutability, the way a transaction stub does.
pub trait WorldState {
    /// Point lookup. `Ok(None)` when the key is absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write `value` under `key`.
    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error at this level.
    fn del_state(&self, key: &str) -> Result<(), StorageError>;

    /// Scan `[start_key, end_key)` in ascending key order.
    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateIterator<'_>, StorageError>;
}
