//! # Gateway CLI
//!
//! Library half of the `gateway-cli` binary: configuration loading,
//! network wiring and command execution.

pub mod command;
pub mod config;
pub mod network;

pub use command::{parse_line, run_step, Mode, Outcome, Step};
pub use config::{ConfigError, GatewayClientConfig};
pub use network::{connect, Connection, SetupError};
