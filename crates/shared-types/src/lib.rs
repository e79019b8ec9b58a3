//! # Shared Types Crate
//!
//! Identifiers and read/write-set types that cross subsystem boundaries.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: channel, contract and transaction identifiers
//!   are defined once and reused by the contract runtime and the pipeline.
//! - **Opaque Payloads**: values in a read/write set are raw bytes; only the
//!   entity layer knows how to decode them.
//! - **No Hidden State**: every type here is a plain value, cheap to clone
//!   and safe to share between concurrent pipelines.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
