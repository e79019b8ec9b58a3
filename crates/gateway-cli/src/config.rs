//! # Client Configuration
//!
//! Loaded from a TOML file, then overridden from the environment.
//!
//! ```toml
//! org_name = "Org1"
//! msp_id = "Org1MSP"
//! user = "appUser"
//! peer_endpoint = "dns:///localhost:7051"
//! gateway_peer = "peer0.org1.example.com"
//! tls_cert_path = "/etc/ledger/tls/ca.crt"
//! channel = "mychannel"
//!
//! [timeouts]
//! endorse = "15s"
//! commit_status = "1m"
//!
//! [endorsement]
//! peer_count = 3
//! required_endorsements = 2
//! ```

use lp_03_submission_pipeline::{EcdsaSigner, EndorsementPolicy, TimeoutConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything the client needs to reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayClientConfig {
    pub org_name: String,
    pub msp_id: String,
    /// Common name of the enrolled client.
    pub user: String,
    pub peer_endpoint: String,
    /// TLS server name override for the gateway peer.
    pub gateway_peer: String,
    pub tls_cert_path: Option<PathBuf>,
    /// Default channel for requests.
    pub channel: String,
    /// Hex-encoded 32-byte secp256k1 key. A fresh key is generated if unset.
    pub signing_key: Option<String>,
    pub timeouts: TimeoutConfig,
    pub endorsement: EndorsementPolicy,
}

impl Default for GatewayClientConfig {
    fn default() -> Self {
        Self {
            org_name: "Org1".to_string(),
            msp_id: "Org1MSP".to_string(),
            user: "appUser".to_string(),
            peer_endpoint: "dns:///localhost:7051".to_string(),
            gateway_peer: "peer0.org1.example.com".to_string(),
            tls_cert_path: None,
            channel: "mychannel".to_string(),
            signing_key: None,
            timeouts: TimeoutConfig::default(),
            endorsement: EndorsementPolicy::default(),
        }
    }
}

impl GatewayClientConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `LP_CHANNEL`, `LP_MSP_ID` and `LP_PEER_ENDPOINT`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(channel) = lookup("LP_CHANNEL") {
            self.channel = channel;
        }
        if let Some(msp_id) = lookup("LP_MSP_ID") {
            self.msp_id = msp_id;
        }
        if let Some(endpoint) = lookup("LP_PEER_ENDPOINT") {
            self.peer_endpoint = endpoint;
        }
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.msp_id.is_empty() {
            return Err(ConfigError::Invalid("msp_id cannot be empty".into()));
        }
        if self.user.is_empty() {
            return Err(ConfigError::Invalid("user cannot be empty".into()));
        }
        self.timeouts
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.endorsement
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    /// Signer from `signing_key`, or a fresh one.
    pub fn signer(&self) -> Result<EcdsaSigner, ConfigError> {
        let Some(key) = &self.signing_key else {
            return Ok(EcdsaSigner::generate());
        };
        let bytes = hex::decode(key.trim_start_matches("0x"))
            .map_err(|e| ConfigError::Invalid(format!("signing_key: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ConfigError::Invalid("signing_key must be 32 bytes".into()))?;
        EcdsaSigner::from_bytes(&bytes).map_err(|e| ConfigError::Invalid(format!("signing_key: {e}")))
    }
}
