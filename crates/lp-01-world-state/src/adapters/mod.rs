//! # Adapters Layer
//!
//! Concrete implementations of the `WorldState` port.

pub mod memory;

pub use memory::MemoryWorldState;
