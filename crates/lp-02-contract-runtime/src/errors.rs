//! # Error Types
//!
//! All error types for contract execution and the host runtime.

use crate::domain::amount::Amount;
use crate::domain::args::ArgumentError;
use lp_01_world_state::{StorageError, StoreError};
use shared_types::{ChannelId, ContractName, IdentifierError};
use thiserror::Error;

// =============================================================================
// INVOCATION ERRORS
// =============================================================================

/// Failures of a cross-contract call, seen from the calling contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The target answered with a non-200 status.
    #[error("failed to invoke {contract}: {message}")]
    Failed {
        contract: String,
        function: String,
        status: i32,
        message: String,
    },

    /// Another nested call would exceed the call-depth bound.
    #[error("call depth exceeded: {depth} > {max}")]
    DepthExceeded { depth: usize, max: usize },
}

impl InvocationError {
    /// Status reported by the target, if it answered at all.
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::Failed { status, .. } => Some(*status),
            Self::DepthExceeded { .. } => None,
        }
    }
}

// =============================================================================
// CONTRACT ERRORS
// =============================================================================

/// Errors returned by a contract function. Any of them aborts the
/// enclosing transaction and becomes a 500 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Entity store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Direct world-state access failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Cross-contract call failed.
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// Bad function arguments.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The contract has no such function.
    #[error("function {0} not found")]
    UnknownFunction(String),

    /// The caller may not perform this operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Account balance is too low.
    #[error("client account {account} has insufficient funds: balance {available}, required {required}")]
    InsufficientFunds {
        account: String,
        available: Amount,
        required: Amount,
    },

    /// Business rule violation.
    #[error("{0}")]
    Rejected(String),

    /// A payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// RUNTIME ERRORS
// =============================================================================

/// Errors raised by the host runtime around an execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// No such channel.
    #[error("channel {0} not found")]
    UnknownChannel(ChannelId),

    /// No contract deployed under that name.
    #[error("chaincode {contract} not found on channel {channel}")]
    UnknownContract {
        channel: ChannelId,
        contract: ContractName,
    },

    /// A contract is already deployed under that name.
    #[error("chaincode {contract} is already deployed on channel {channel}")]
    AlreadyDeployed {
        channel: ChannelId,
        contract: ContractName,
    },

    /// A channel or contract name is malformed.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    /// The contract answered with a non-200 status.
    #[error("chaincode response {status}, {message}")]
    Chaincode { status: i32, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_error_carries_message() {
        let err = InvocationError::Failed {
            contract: "token".into(),
            function: "Transfer".into(),
            status: 500,
            message: "client account alice has insufficient funds".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to invoke token: client account alice has insufficient funds"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_contract_error_is_transparent() {
        let err: ContractError = StoreError::NotFound {
            kind: "Asset",
            id: "asset9".into(),
        }
        .into();
        assert_eq!(err.to_string(), "the Asset asset9 does not exist");
    }

    #[test]
    fn test_insufficient_funds_display() {
        let err = ContractError::InsufficientFunds {
            account: "alice".into(),
            available: Amount::from_units(1),
            required: Amount::from_units(2),
        };
        assert!(err.to_string().contains("balance 1.000000, required 2.000000"));
    }
}
