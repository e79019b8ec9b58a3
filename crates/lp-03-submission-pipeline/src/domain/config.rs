//! # Pipeline Configuration
//!
//! Per-phase timeouts. Endorsement, ordering and commit have different
//! latency profiles, so every phase gets its own bound.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Timeouts for each pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Read-only query against a single peer.
    #[serde(with = "duration_text")]
    pub evaluate: Duration,
    /// Collecting endorsements.
    #[serde(with = "duration_text")]
    pub endorse: Duration,
    /// Handing the endorsed transaction to the orderer.
    #[serde(with = "duration_text")]
    pub submit: Duration,
    /// Waiting for the validation code. Spans block-cut latency.
    #[serde(with = "duration_text")]
    pub commit_status: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            evaluate: Duration::from_secs(5),
            endorse: Duration::from_secs(15),
            submit: Duration::from_secs(5),
            commit_status: Duration::from_secs(60),
        }
    }
}

impl TimeoutConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("evaluate", self.evaluate),
            ("endorse", self.endorse),
            ("submit", self.submit),
            ("commit_status", self.commit_status),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!(
                    "{name} timeout must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

/// How many peers endorse, and how many of them must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndorsementPolicy {
    pub peer_count: usize,
    pub required_endorsements: usize,
}

impl Default for EndorsementPolicy {
    fn default() -> Self {
        Self {
            peer_count: 1,
            required_endorsements: 1,
        }
    }
}

impl EndorsementPolicy {
    /// `required` of `peer_count` peers.
    pub fn new(required_endorsements: usize, peer_count: usize) -> Self {
        Self {
            peer_count,
            required_endorsements,
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_endorsements == 0 {
            return Err(ConfigError::InvalidPolicy(
                "at least one endorsement must be required".into(),
            ));
        }
        if self.required_endorsements > self.peer_count {
            return Err(ConfigError::InvalidPolicy(format!(
                "{} endorsements required but only {} peers",
                self.required_endorsements, self.peer_count
            )));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid endorsement policy: {0}")]
    InvalidPolicy(String),

    #[error("identity credentials do not match the signing key")]
    IdentityMismatch,
}

/// Durations as text: `"500ms"`, `"15s"`, `"1m"`, `"1h"` or bare seconds.
pub(crate) mod duration_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(crate) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s", or "500ms" would parse as seconds.
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            let m = mins.trim().parse::<u64>().map_err(|_| "invalid minutes")?;
            m.checked_mul(60)
                .map(Duration::from_secs)
                .ok_or("minutes out of range")
        } else if let Some(hours) = s.strip_suffix('h') {
            let h = hours.trim().parse::<u64>().map_err(|_| "invalid hours")?;
            h.checked_mul(3600)
                .map(Duration::from_secs)
                .ok_or("hours out of range")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::duration_text::parse_duration;
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.evaluate, Duration::from_secs(5));
        assert_eq!(config.endorse, Duration::from_secs(15));
        assert_eq!(config.submit, Duration::from_secs(5));
        assert_eq!(config.commit_status, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("15s"), Ok(Duration::from_secs(15)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("7"), Ok(Duration::from_secs(7)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("xh").is_err());
    }

    #[test]
    fn test_parse_duration_out_of_range() {
        assert_eq!(
            parse_duration("307445734561825861m"),
            Err("minutes out of range")
        );
        assert_eq!(parse_duration("5124095576030432h"), Err("hours out of range"));
        assert!(toml::from_str::<TimeoutConfig>("commit_status = \"307445734561825861m\"").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = TimeoutConfig {
            submit: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(
                "submit timeout must be greater than zero".into()
            ))
        );
    }

    #[test]
    fn test_policy_validation() {
        assert!(EndorsementPolicy::default().validate().is_ok());
        assert!(EndorsementPolicy::new(2, 3).validate().is_ok());
        assert!(EndorsementPolicy::new(0, 3).validate().is_err());
        assert_eq!(
            EndorsementPolicy::new(3, 2).validate(),
            Err(ConfigError::InvalidPolicy(
                "3 endorsements required but only 2 peers".into()
            ))
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TimeoutConfig = toml::from_str("endorse = \"30s\"\ncommit_status = \"2m\"").unwrap();
        assert_eq!(config.endorse, Duration::from_secs(30));
        assert_eq!(config.commit_status, Duration::from_secs(120));
        assert_eq!(config.evaluate, Duration::from_secs(5));

        let config: TimeoutConfig = toml::from_str("commit_status = \"1h\"").unwrap();
        assert_eq!(config.commit_status, Duration::from_secs(3600));
    }
}
