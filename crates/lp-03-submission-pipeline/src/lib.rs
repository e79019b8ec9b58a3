//! # LP-03 Submission Pipeline - Propose, Endorse, Submit, Commit
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Client side of a ledger transaction. Turns `(contract, function, args)`
//! into a committed transaction through four phases, each bounded by its
//! own timeout, and reports failures with the phase that produced them.
//!
//! ```text
//! Idle -> Proposed -> Endorsed -> Submitted -> Committed
//!   ^________|___________|___________|  (any failure)
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Phases run in order | `pipeline.rs` - `PipelineState::can_transition_to()` |
//! | Every phase has its own deadline | `domain/config.rs` - `TimeoutConfig` |
//! | Failure returns to `Idle`, no auto-retry | `pipeline.rs` - `SubmissionPipeline` |
//! | A retry gets a fresh transaction id | `domain/proposal.rs` - random nonce |
//! | Lost answers after submit are indeterminate | `errors.rs` - `PipelineError::is_indeterminate()` |
//! | Proposals and envelopes are signed by the creator | `identity.rs` - `Signer` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Supplied by |
//! |-------|-------------|
//! | `GatewayService` | `InProcessGateway` or a remote gateway client |
//! | `Signer` | `EcdsaSigner` |
//! | `TimeSource` | `SystemTimeSource` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use lp_03_submission_pipeline::prelude::*;
//!
//! let context = ConnectionContext::new(identity, signer, gateway, TimeoutConfig::default())?;
//! let token = context.contract(channel, ContractName::new("token")?);
//! let result = token.submit_transaction("Transfer", &["bob", "50"]).await?;
//! println!("Transaction ID: {} Response: {}", result.tx_id, String::from_utf8_lossy(&result.result));
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod connection;
pub mod domain;
pub mod errors;
pub mod identity;
pub mod pipeline;
pub mod ports;

pub use adapters::InProcessGateway;
pub use connection::{ConnectionContext, Contract};
pub use domain::{
    CommitStatus, ConfigError, EndorsedTransaction, Endorsement, EndorsementPolicy, Envelope,
    PipelineState, Proposal, ProposalRequest, ProposalResponse, SignedProposal, TimeoutConfig,
    TransactionResult,
};
pub use errors::{EndorsementFailure, NetworkError, Phase, PipelineError, SigningError};
pub use identity::{verify_signature, EcdsaSigner, Signer};
pub use pipeline::SubmissionPipeline;
pub use ports::{GatewayService, SystemTimeSource, TimeSource};

/// Convenient re-exports for pipeline callers.
pub mod prelude {
    pub use crate::connection::{ConnectionContext, Contract};
    pub use crate::domain::{ProposalRequest, TimeoutConfig, TransactionResult};
    pub use crate::errors::{Phase, PipelineError};
    pub use crate::identity::{EcdsaSigner, Signer};
    pub use crate::pipeline::SubmissionPipeline;
    pub use crate::ports::GatewayService;
    pub use shared_types::{ChannelId, ContractName};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 3;
