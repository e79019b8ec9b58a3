//! # LP-01 World State - Key Space and Entity Store
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Maps typed entities onto a flat, range-scannable key-value world state and
//! provides create/read/update/delete/list over them.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | `(kind, id)` maps to exactly one key | `domain/keys.rs` - `encode_key()` |
//! | A kind's range holds only that kind | `domain/keys.rs` - `range_bounds()` |
//! | Create requires absence | `store.rs` - `EntityStore::create()` |
//! | Read/Update/Delete require presence | `store.rs` - `EntityStore::{read,update,delete}()` |
//! | Listing is all-or-nothing | `store.rs` - `EntityStore::list_by_kind()` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Supplied by |
//! |-------|-------------|
//! | `WorldState` | Host ledger runtime (transaction simulator) or `MemoryWorldState` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use lp_01_world_state::prelude::*;
//!
//! let store = EntityStore::new(ctx.stub());
//! store.create(&asset)?;
//! let all: Vec<Asset> = store.list_by_kind()?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod store;

pub use adapters::MemoryWorldState;
pub use domain::{
    decode_key, encode_key, range_bounds, Entity, KeyError, KeyRange, LedgerKey, StoreError,
    KEY_SEPARATOR,
};
pub use ports::{StateEntry, StateIterator, StorageError, WorldState};
pub use store::{EntityScan, EntityStore};

/// Convenient re-exports for contract code.
pub mod prelude {
    pub use crate::domain::{Entity, StoreError};
    pub use crate::ports::{StorageError, WorldState};
    pub use crate::store::EntityStore;
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 1;
