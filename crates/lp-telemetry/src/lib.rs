//! # LP Telemetry
//!
//! Structured logging for the ledger pipeline: a `tracing` subscriber with
//! an env filter and either human-readable or JSON output.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lp_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LP_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `LP_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |
//! | `LP_SERVICE_NAME` | `ledger-pipeline` | Service name |

mod config;
mod logging;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global subscriber described by `config`.
///
/// A second call returns [`TelemetryError::AlreadyInitialized`] instead of
/// panicking, so tests and embedding binaries can call it freely.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)?;
    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_init_is_an_error() {
        let config = TelemetryConfig::default();
        let _ = init_telemetry(&config);
        assert_eq!(init_telemetry(&config), Err(TelemetryError::AlreadyInitialized));
    }
}
