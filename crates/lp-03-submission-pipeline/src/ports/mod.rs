//! # Ports
//!
//! Outbound dependencies of the pipeline: the ledger network and a clock.

use crate::domain::{CommitStatus, EndorsedTransaction, Envelope, ProposalResponse, SignedProposal};
use crate::errors::NetworkError;
use async_trait::async_trait;
use shared_types::{ChannelId, TransactionId};

/// Gateway endpoint of the ledger network.
///
/// Implementations must be safe for concurrent use by many in-flight
/// proposals. None of the calls carries its own deadline; the pipeline
/// bounds each one with the phase timeout.
#[async_trait]
pub trait GatewayService: Send + Sync {
    /// Simulate on a single peer. Never reaches the orderer.
    async fn evaluate(&self, proposal: &SignedProposal) -> Result<ProposalResponse, NetworkError>;

    /// Simulate on the endorsing peers and collect their signatures.
    async fn endorse(&self, proposal: &SignedProposal) -> Result<EndorsedTransaction, NetworkError>;

    /// Hand a signed envelope to the orderer.
    async fn submit(&self, envelope: &Envelope) -> Result<(), NetworkError>;

    /// Wait until the transaction is validated and report its code.
    async fn commit_status(
        &self,
        channel: &ChannelId,
        tx_id: &TransactionId,
    ) -> Result<CommitStatus, NetworkError>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    /// Unix seconds.
    fn now(&self) -> u64;
}

/// System time implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            // Clock before Unix epoch
            .unwrap_or(0)
    }
}
