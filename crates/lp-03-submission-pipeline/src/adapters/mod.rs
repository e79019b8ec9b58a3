//! # Adapters
//!
//! Implementations of the pipeline's outbound ports.

pub mod in_process;

pub use in_process::InProcessGateway;
