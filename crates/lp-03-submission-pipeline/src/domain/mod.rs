//! # Domain Layer
//!
//! Proposal values, the pipeline state machine and timeout configuration.

pub mod config;
pub mod proposal;
pub mod state;

pub use config::{ConfigError, EndorsementPolicy, TimeoutConfig};
pub use proposal::{
    CommitStatus, Digest32, EndorsedTransaction, Endorsement, Envelope, Proposal,
    ProposalRequest, ProposalResponse, SignedProposal, TransactionResult, NONCE_LEN,
};
pub use state::PipelineState;
