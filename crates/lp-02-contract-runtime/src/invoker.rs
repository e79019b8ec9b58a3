//! # Cross-Contract Invoker
//!
//! Calls a function on another deployed contract from inside a running
//! execution and turns its numeric status into a `Result`.
//!
//! - Synchronous: returns once the target's handler has finished.
//! - Status 200 yields the payload; anything else becomes
//!   `InvocationError::Failed` carrying the target's message unchanged.
//! - No retries. A failed call is meant to abort the caller's transaction.
//! - Numeric arguments go over the wire as canonical decimal text.

use crate::domain::amount::Amount;
use crate::errors::InvocationError;
use crate::ports::ChaincodeStub;
use shared_types::ContractName;
use tracing::{debug, warn};

/// One argument of a cross-contract call, already in wire text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeArg(String);

impl InvokeArg {
    /// Wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&str> for InvokeArg {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InvokeArg {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Amount> for InvokeArg {
    fn from(value: Amount) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for InvokeArg {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for InvokeArg {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Invoker bound to the calling execution's stub.
pub struct CrossContractInvoker<'a> {
    stub: &'a dyn ChaincodeStub,
}

impl<'a> CrossContractInvoker<'a> {
    /// Bind to a stub.
    pub fn new(stub: &'a dyn ChaincodeStub) -> Self {
        Self { stub }
    }

    /// Run `function(args)` on `target` and return its payload.
    pub fn invoke(
        &self,
        target: &ContractName,
        function: &str,
        args: &[InvokeArg],
    ) -> Result<Vec<u8>, InvocationError> {
        let depth = self.stub.call_depth() + 1;
        let max = self.stub.max_call_depth();
        if depth > max {
            warn!(caller = %self.stub.contract_name(), target = %target, depth, max, "Call depth exceeded");
            return Err(InvocationError::DepthExceeded { depth, max });
        }

        let mut wire = Vec::with_capacity(args.len() + 1);
        wire.push(function.as_bytes().to_vec());
        wire.extend(args.iter().map(|arg| arg.as_bytes().to_vec()));

        debug!(
            caller = %self.stub.contract_name(),
            target = %target,
            function,
            depth,
            "Invoking contract"
        );
        let response = self.stub.invoke_chaincode(target, &wire);
        if response.is_ok() {
            return Ok(response.payload);
        }

        warn!(
            target = %target,
            function,
            status = response.status,
            message = %response.message,
            "Cross-contract invocation failed"
        );
        Err(InvocationError::Failed {
            contract: target.to_string(),
            function: function.to_string(),
            status: response.status,
            message: response.message,
        })
    }
}
