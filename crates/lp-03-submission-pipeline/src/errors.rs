//! # Error Types
//!
//! Pipeline errors identify the failing phase. Only a lost answer after the
//! transaction left the client is indeterminate.

use crate::domain::PipelineState;
use shared_types::{TransactionId, ValidationCode};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// PHASES
// =============================================================================

/// Pipeline phase, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Propose,
    Evaluate,
    Endorse,
    Submit,
    CommitStatus,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Propose => "propose",
            Self::Evaluate => "evaluate",
            Self::Endorse => "endorse",
            Self::Submit => "submit",
            Self::CommitStatus => "commit status",
        };
        f.write_str(name)
    }
}

// =============================================================================
// SIGNING ERRORS
// =============================================================================

/// Identity and signature failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid signature format")]
    InvalidSignature,

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

// =============================================================================
// NETWORK ERRORS
// =============================================================================

/// Errors reported across the gateway port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The request itself is unacceptable (unknown channel or contract,
    /// malformed proposal).
    #[error("proposal rejected: {0}")]
    Rejected(String),

    /// The contract answered with a non-200 status.
    #[error("chaincode response {status}, {message}")]
    Chaincode { status: i32, message: String },

    /// Not enough peers endorsed.
    #[error("endorsement policy not satisfied: {received} of {required} required endorsements")]
    EndorsementPolicy { required: usize, received: usize },

    /// Peers returned different results for the same proposal.
    #[error("endorsing peers returned different results")]
    EndorsementMismatch,

    /// A signature on the envelope did not verify.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The orderer already saw this transaction id.
    #[error("duplicate transaction {0}")]
    DuplicateTransaction(TransactionId),

    /// Commit status requested for an id the orderer never received.
    #[error("unknown transaction {0}")]
    UnknownTransaction(TransactionId),

    /// Transport-level failure.
    #[error("network unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// PIPELINE ERRORS
// =============================================================================

/// Why endorsement failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndorsementFailure {
    /// No answer within the endorse timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The contract rejected the proposal.
    #[error("chaincode response {status}, {message}")]
    Chaincode { status: i32, message: String },

    /// Too few or inconsistent endorsements.
    #[error("{0}")]
    Policy(String),

    /// Transport failure talking to the peers.
    #[error("{0}")]
    Network(String),
}

/// Errors returned to pipeline callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The request cannot become a valid proposal. Not retriable as is.
    #[error("proposal error: {0}")]
    Proposal(String),

    /// A read-only query failed.
    #[error("evaluate of {tx_id} failed: {reason}")]
    Evaluation {
        tx_id: TransactionId,
        reason: EndorsementFailure,
    },

    /// Endorsement failed; the transaction never reached the orderer.
    #[error("endorsement of {tx_id} failed: {reason}")]
    Endorsement {
        tx_id: TransactionId,
        reason: EndorsementFailure,
    },

    /// The orderer refused the transaction.
    #[error("submission of {tx_id} failed: {reason}")]
    Submission { tx_id: TransactionId, reason: String },

    /// Delivered but invalidated.
    #[error("transaction {tx_id} failed to commit with status code {code}")]
    Commit {
        tx_id: TransactionId,
        code: ValidationCode,
    },

    /// The network failed while reporting commit status.
    #[error("commit status of {tx_id} unavailable: {reason}")]
    CommitStatus { tx_id: TransactionId, reason: String },

    /// No answer within the phase timeout.
    #[error("{phase} of {tx_id} timed out after {after:?}")]
    Timeout {
        phase: Phase,
        tx_id: TransactionId,
        after: Duration,
    },

    /// Phase method called out of order.
    #[error("invalid pipeline transition from {from} to {to}")]
    InvalidState {
        from: PipelineState,
        to: PipelineState,
    },

    /// The proposal or envelope could not be signed.
    #[error(transparent)]
    Signing(#[from] SigningError),
}

impl PipelineError {
    /// Phase the error belongs to, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Proposal(_) | Self::Signing(_) => Some(Phase::Propose),
            Self::Evaluation { .. } => Some(Phase::Evaluate),
            Self::Endorsement { .. } => Some(Phase::Endorse),
            Self::Submission { .. } => Some(Phase::Submit),
            Self::Commit { .. } | Self::CommitStatus { .. } => Some(Phase::CommitStatus),
            Self::Timeout { phase, .. } => Some(*phase),
            Self::InvalidState { .. } => None,
        }
    }

    /// True when the transaction may still land on the ledger.
    ///
    /// Callers must re-query status by transaction id before retrying.
    pub fn is_indeterminate(&self) -> bool {
        matches!(
            self,
            Self::Timeout {
                phase: Phase::Submit | Phase::CommitStatus,
                ..
            } | Self::CommitStatus { .. }
        )
    }

    /// Transaction id the error refers to, if one was assigned.
    pub fn tx_id(&self) -> Option<&TransactionId> {
        match self {
            Self::Evaluation { tx_id, .. }
            | Self::Endorsement { tx_id, .. }
            | Self::Submission { tx_id, .. }
            | Self::Commit { tx_id, .. }
            | Self::CommitStatus { tx_id, .. }
            | Self::Timeout { tx_id, .. } => Some(tx_id),
            Self::Proposal(_) | Self::InvalidState { .. } | Self::Signing(_) => None,
        }
    }
}
