//! # Proposals and Envelopes
//!
//! The values that travel through the four phases. Every digest is
//! SHA-256 over a length-prefixed encoding, so field boundaries can never
//! be shifted to forge a different message with the same hash.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{
    ChannelId, ClientIdentity, ContractName, ReadWriteSet, TransactionId, ValidationCode, Version,
};

/// Length of the random proposal nonce.
pub const NONCE_LEN: usize = 24;

/// 32-byte SHA-256 digest.
pub type Digest32 = [u8; 32];

// =============================================================================
// CANONICAL ENCODING
// =============================================================================

struct Canonical(Sha256);

impl Canonical {
    fn new(domain: &[u8]) -> Self {
        let mut canonical = Self(Sha256::new());
        canonical.bytes(domain);
        canonical
    }

    fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.update((bytes.len() as u64).to_be_bytes());
        self.0.update(bytes);
        self
    }

    fn u64(&mut self, value: u64) -> &mut Self {
        self.0.update(value.to_be_bytes());
        self
    }

    fn version(&mut self, version: Option<Version>) -> &mut Self {
        match version {
            Some(v) => self.u64(1).u64(v.block_num).u64(v.tx_num),
            None => self.u64(0),
        }
    }

    fn rwset(&mut self, rwset: &ReadWriteSet) -> &mut Self {
        self.u64(rwset.reads.len() as u64);
        for read in &rwset.reads {
            self.bytes(read.namespace.as_bytes())
                .bytes(read.key.as_bytes())
                .version(read.version);
        }
        self.u64(rwset.range_queries.len() as u64);
        for range in &rwset.range_queries {
            self.bytes(range.namespace.as_bytes())
                .bytes(range.start_key.as_bytes())
                .bytes(range.end_key.as_bytes())
                .u64(range.reads.len() as u64);
            for read in &range.reads {
                self.bytes(read.key.as_bytes()).version(read.version);
            }
        }
        self.u64(rwset.writes.len() as u64);
        for write in &rwset.writes {
            self.bytes(write.namespace.as_bytes()).bytes(write.key.as_bytes());
            match &write.value {
                Some(value) => self.u64(1).bytes(value),
                None => self.u64(0),
            };
        }
        self
    }

    fn finish(self) -> Digest32 {
        self.0.finalize().into()
    }
}

// =============================================================================
// PROPOSE
// =============================================================================

/// What the caller wants executed: `{contract, channel, function, args}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub channel: ChannelId,
    pub contract: ContractName,
    pub function: String,
    pub args: Vec<Vec<u8>>,
}

impl ProposalRequest {
    /// Request with no arguments.
    pub fn new(channel: ChannelId, contract: ContractName, function: impl Into<String>) -> Self {
        Self {
            channel,
            contract,
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.args.push(arg.as_ref().to_vec());
        self
    }

    /// Append several arguments.
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_vec()));
        self
    }

    /// Reject requests no peer could execute.
    pub fn validate(&self) -> Result<(), String> {
        if self.function.trim().is_empty() {
            return Err("function name cannot be empty".into());
        }
        if let Some(ch) = self.function.chars().find(|c| c.is_control()) {
            return Err(format!(
                "function name {:?} contains invalid character {ch:?}",
                self.function
            ));
        }
        Ok(())
    }
}

/// A proposal bound to its creator. The transaction id is derived from
/// the nonce and the creator, so a proposal is never reused for a retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub tx_id: TransactionId,
    pub channel: ChannelId,
    pub contract: ContractName,
    pub function: String,
    pub args: Vec<Vec<u8>>,
    pub creator: ClientIdentity,
    pub nonce: Vec<u8>,
    /// Unix seconds at proposal time.
    pub timestamp: u64,
}

impl Proposal {
    /// Bind a request to a creator.
    pub fn new(
        request: ProposalRequest,
        creator: ClientIdentity,
        nonce: [u8; NONCE_LEN],
        timestamp: u64,
    ) -> Self {
        let tx_id = TransactionId::derive(&nonce, &creator.to_bytes());
        Self {
            tx_id,
            channel: request.channel,
            contract: request.contract,
            function: request.function,
            args: request.args,
            creator,
            nonce: nonce.to_vec(),
            timestamp,
        }
    }

    /// Digest the creator signs.
    pub fn digest(&self) -> Digest32 {
        let mut c = Canonical::new(b"proposal");
        c.bytes(self.tx_id.as_str().as_bytes())
            .bytes(self.channel.as_str().as_bytes())
            .bytes(self.contract.as_str().as_bytes())
            .bytes(self.function.as_bytes())
            .u64(self.args.len() as u64);
        for arg in &self.args {
            c.bytes(arg);
        }
        c.bytes(&self.creator.to_bytes())
            .bytes(&self.nonce)
            .u64(self.timestamp);
        c.finish()
    }
}

/// A proposal with the creator's signature over [`Proposal::digest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedProposal {
    pub proposal: Proposal,
    pub signature: Vec<u8>,
}

impl SignedProposal {
    pub fn tx_id(&self) -> &TransactionId {
        &self.proposal.tx_id
    }
}

// =============================================================================
// ENDORSE
// =============================================================================

/// Simulated result of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProposalResponse {
    /// Return value of the contract function.
    pub payload: Vec<u8>,
    /// Reads and writes recorded during simulation.
    pub rwset: ReadWriteSet,
}

impl ProposalResponse {
    /// Digest an endorser signs for `tx_id`.
    pub fn digest(&self, tx_id: &TransactionId) -> Digest32 {
        let mut c = Canonical::new(b"proposal-response");
        c.bytes(tx_id.as_str().as_bytes())
            .bytes(&self.payload)
            .rwset(&self.rwset);
        c.finish()
    }
}

/// One peer's signature over a [`ProposalResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    /// Endorsing peer name.
    pub endorser: String,
    /// SEC1-encoded verifying key of the peer.
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

/// A proposal, its agreed simulation result and the endorsements for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsedTransaction {
    pub proposal: SignedProposal,
    pub response: ProposalResponse,
    pub endorsements: Vec<Endorsement>,
}

impl EndorsedTransaction {
    pub fn tx_id(&self) -> &TransactionId {
        self.proposal.tx_id()
    }

    /// Digest the creator signs when submitting.
    pub fn digest(&self) -> Digest32 {
        let mut c = Canonical::new(b"transaction");
        c.bytes(&self.proposal.proposal.digest())
            .bytes(&self.response.digest(self.tx_id()));
        c.finish()
    }
}

// =============================================================================
// SUBMIT / COMMIT
// =============================================================================

/// Signed transaction handed to the orderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub transaction: EndorsedTransaction,
    /// Creator's signature over [`EndorsedTransaction::digest`].
    pub signature: Vec<u8>,
}

impl Envelope {
    pub fn tx_id(&self) -> &TransactionId {
        self.transaction.tx_id()
    }
}

/// Validation outcome reported by the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub tx_id: TransactionId,
    pub code: ValidationCode,
    pub block_number: u64,
}

/// What a successful submission returns to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub tx_id: TransactionId,
    /// Payload of the endorsed simulation.
    pub result: Vec<u8>,
    pub block_number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::KeyWrite;

    fn request() -> ProposalRequest {
        ProposalRequest::new(
            ChannelId::new("mychannel").unwrap(),
            ContractName::new("token").unwrap(),
            "Transfer",
        )
        .args(["alice", "50"])
    }

    fn creator() -> ClientIdentity {
        ClientIdentity::new("Org1MSP", "appUser", vec![2; 33])
    }

    #[test]
    fn test_tx_id_depends_on_nonce() {
        let a = Proposal::new(request(), creator(), [1; NONCE_LEN], 10);
        let b = Proposal::new(request(), creator(), [2; NONCE_LEN], 10);
        assert!(!a.tx_id.is_empty());
        assert_ne!(a.tx_id, b.tx_id);
        assert_eq!(a.tx_id.as_str().len(), 64);
    }

    #[test]
    fn test_digest_binds_arguments() {
        let a = Proposal::new(request(), creator(), [1; NONCE_LEN], 10);
        let mut b = a.clone();
        b.args = vec![b"alic".to_vec(), b"e50".to_vec()];
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_response_digest_binds_writes() {
        let tx = TransactionId::from_raw("tx");
        let mut response = ProposalResponse {
            payload: b"ok".to_vec(),
            rwset: ReadWriteSet::default(),
        };
        let before = response.digest(&tx);
        response.rwset.writes.push(KeyWrite {
            namespace: "token".into(),
            key: "Balance||alice".into(),
            value: Some(b"1".to_vec()),
        });
        assert_ne!(before, response.digest(&tx));
    }

    #[test]
    fn test_validate_request() {
        assert!(request().validate().is_ok());
        let mut bad = request();
        bad.function = " ".into();
        assert_eq!(bad.validate(), Err("function name cannot be empty".into()));
    }
}
