//! # Runtime Entities
//!
//! Requests into the host runtime and what it hands back.

use crate::domain::response::Response;
use shared_types::{ChannelId, ClientIdentity, ContractName, ReadWriteSet, TransactionId};

/// Host runtime limits.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Maximum nesting of cross-contract calls (top-level call is depth 0).
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { max_call_depth: 8 }
    }
}

/// One top-level execution request: a function on a deployed contract.
#[derive(Clone, Debug)]
pub struct Invocation {
    /// Channel the contract is deployed on.
    pub channel: ChannelId,
    /// Target contract.
    pub contract: ContractName,
    /// Function name.
    pub function: String,
    /// Function arguments.
    pub args: Vec<Vec<u8>>,
    /// Transaction the execution belongs to.
    pub tx_id: TransactionId,
    /// Client that created the proposal.
    pub creator: ClientIdentity,
    /// Proposal timestamp (seconds since the Unix epoch).
    pub timestamp: u64,
}

impl Invocation {
    /// Arguments as the host primitive sees them: function name first.
    pub fn wire_args(&self) -> Vec<Vec<u8>> {
        let mut wire = Vec::with_capacity(self.args.len() + 1);
        wire.push(self.function.as_bytes().to_vec());
        wire.extend(self.args.iter().cloned());
        wire
    }
}

/// Successful simulation: the response and the effects it would commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Simulation {
    /// The contract's 200 response.
    pub response: Response,
    /// Reads and pending writes recorded during execution.
    pub rwset: ReadWriteSet,
}
