//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Addressing**: `ChannelId`, `ContractName`
//! - **Transactions**: `TransactionId`, `ClientIdentity`, `ValidationCode`
//! - **Simulation Results**: `Version`, `KeyRead`, `RangeQueryInfo`, `KeyWrite`, `ReadWriteSet`

use crate::errors::IdentifierError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// =============================================================================
// CLUSTER A: ADDRESSING
// =============================================================================

fn validate_name(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    if let Some(ch) = value
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || *c == '/')
    {
        return Err(IdentifierError::InvalidCharacter {
            kind,
            value: value.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Identifier of a ledger channel (the network a contract is deployed on).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    /// Create a validated channel identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        validate_name("channel", &value)?;
        Ok(Self(value))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name under which a contract is deployed on a channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractName(String);

impl ContractName {
    /// Create a validated contract name.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        validate_name("contract", &value)?;
        Ok(Self(value))
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER B: TRANSACTIONS
// =============================================================================

/// Ledger-wide transaction identifier.
///
/// Derived as `hex(sha256(nonce || creator))`, so a fresh nonce always yields
/// a fresh identity and a replayed proposal keeps its original one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Derive the identifier from a proposal nonce and the serialized creator.
    pub fn derive(nonce: &[u8], creator: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce);
        hasher.update(creator);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an identifier received from the network.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity a client presents when creating proposals.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientIdentity {
    /// Membership service provider the identity belongs to.
    pub msp_id: String,
    /// Common name of the enrolled client.
    pub common_name: String,
    /// Public credentials (SEC1-encoded verifying key).
    pub credentials: Vec<u8>,
}

impl ClientIdentity {
    /// Create a new client identity.
    pub fn new(
        msp_id: impl Into<String>,
        common_name: impl Into<String>,
        credentials: Vec<u8>,
    ) -> Self {
        Self {
            msp_id: msp_id.into(),
            common_name: common_name.into(),
            credentials,
        }
    }

    /// Stable textual identifier used by contracts to key per-client records.
    pub fn id(&self) -> String {
        format!("x509::CN={},OU=client::{}", self.common_name, self.msp_id)
    }

    /// Serialized creator bytes bound into every proposal.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(self.msp_id.len() + self.common_name.len() + self.credentials.len() + 2);
        bytes.extend_from_slice(self.msp_id.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(self.common_name.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&self.credentials);
        bytes
    }
}

/// Outcome of commit-time validation for a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationCode {
    /// Transaction was valid and its writes were applied.
    Valid,
    /// A key read during simulation changed before commit.
    MvccReadConflict,
    /// A range read during simulation returned a different result set at commit.
    PhantomReadConflict,
    /// A transaction with the same identifier was already committed.
    DuplicateTxId,
    /// The creator's proposal signature did not verify at validation.
    BadCreatorSignature,
    /// Endorsements did not satisfy the endorsement policy.
    EndorsementPolicyFailure,
}

impl ValidationCode {
    /// Canonical upper-snake-case name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::MvccReadConflict => "MVCC_READ_CONFLICT",
            Self::PhantomReadConflict => "PHANTOM_READ_CONFLICT",
            Self::DuplicateTxId => "DUPLICATE_TXID",
            Self::BadCreatorSignature => "BAD_CREATOR_SIGNATURE",
            Self::EndorsementPolicyFailure => "ENDORSEMENT_POLICY_FAILURE",
        }
    }

    /// Returns true only for [`ValidationCode::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CLUSTER C: SIMULATION RESULTS
// =============================================================================

/// Committed version of a key: the block and position of the last writer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Version {
    /// Block number of the writing transaction.
    pub block_num: u64,
    /// Position of the writing transaction within its block.
    pub tx_num: u64,
}

impl Version {
    /// Create a new version.
    pub fn new(block_num: u64, tx_num: u64) -> Self {
        Self { block_num, tx_num }
    }
}

/// A key read during simulation together with the version observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRead {
    /// Contract namespace the key lives in.
    pub namespace: String,
    /// Ledger key.
    pub key: String,
    /// Committed version, `None` if the key did not exist.
    pub version: Option<Version>,
}

/// A range scan performed during simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQueryInfo {
    /// Contract namespace that was scanned.
    pub namespace: String,
    /// Inclusive start key.
    pub start_key: String,
    /// Exclusive end key.
    pub end_key: String,
    /// Committed keys (and versions) the scan returned.
    pub reads: Vec<KeyRead>,
}

/// A pending write produced by simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWrite {
    /// Contract namespace the key lives in.
    pub namespace: String,
    /// Ledger key.
    pub key: String,
    /// New value, `None` for a delete.
    pub value: Option<Vec<u8>>,
}

impl KeyWrite {
    /// Returns true if this write deletes the key.
    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}

/// Read/write set produced by simulating a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadWriteSet {
    /// Point reads against committed state.
    pub reads: Vec<KeyRead>,
    /// Range scans against committed state.
    pub range_queries: Vec<RangeQueryInfo>,
    /// Writes in ascending `(namespace, key)` order.
    pub writes: Vec<KeyWrite>,
}

impl ReadWriteSet {
    /// Returns true if the transaction wrote nothing.
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_validation() {
        assert!(ChannelId::new("mychannel").is_ok());
        assert_eq!(
            ChannelId::new(""),
            Err(IdentifierError::Empty { kind: "channel" })
        );
        assert!(matches!(
            ChannelId::new("my channel"),
            Err(IdentifierError::InvalidCharacter { ch: ' ', .. })
        ));
    }

    #[test]
    fn test_contract_name_display() {
        let name = ContractName::new("basic").unwrap();
        assert_eq!(name.to_string(), "basic");
        assert_eq!(name.as_str(), "basic");
    }

    #[test]
    fn test_transaction_id_derivation() {
        let creator = b"Org1MSP\0alice\0key";
        let a = TransactionId::derive(&[1u8; 24], creator);
        let b = TransactionId::derive(&[1u8; 24], creator);
        let c = TransactionId::derive(&[2u8; 24], creator);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_client_identity_id() {
        let identity = ClientIdentity::new("Org1MSP", "alice", vec![2, 3]);
        assert_eq!(identity.id(), "x509::CN=alice,OU=client::Org1MSP");

        let bytes = identity.to_bytes();
        assert!(bytes.starts_with(b"Org1MSP\0alice\0"));
        assert!(bytes.ends_with(&[2, 3]));
    }

    #[test]
    fn test_validation_code_names() {
        assert_eq!(ValidationCode::Valid.to_string(), "VALID");
        assert_eq!(
            ValidationCode::MvccReadConflict.to_string(),
            "MVCC_READ_CONFLICT"
        );
        assert!(ValidationCode::Valid.is_valid());
        assert!(!ValidationCode::PhantomReadConflict.is_valid());
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1, 5) < Version::new(2, 0));
        assert!(Version::new(2, 0) < Version::new(2, 1));
    }
}
