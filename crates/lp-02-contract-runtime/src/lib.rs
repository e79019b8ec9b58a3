//! # LP-02 Contract Runtime - Cross-Contract Invocation and Simulation
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Hosts contracts: dispatches a function call to a deployed
//! [`TransactionHandler`], gives it a namespaced world state through a
//! [`TxSimulator`], lets it call other contracts synchronously through the
//! [`CrossContractInvoker`], and validates the resulting read/write set
//! against the committed [`Ledger`].
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Non-200 callee status is a propagated error | `invoker.rs` - `CrossContractInvoker::invoke()` |
//! | Nesting is bounded | `invoker.rs` + `runtime.rs` - `max_call_depth` |
//! | Failed execution leaves no writes | `runtime.rs` - savepoint rollback, `simulate()` |
//! | Stale reads never commit | `ledger/mod.rs` - `Ledger::commit_block()` |
//! | Amounts cross contracts as canonical decimal text | `domain/amount.rs` - `Amount` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Supplied by |
//! |-------|-------------|
//! | `ChaincodeStub` | `ContractRuntime` execution frames |
//!
//! ## Usage Example
//!
//! ```ignore
//! use lp_02_contract_runtime::prelude::*;
//!
//! let runtime = ContractRuntime::new(RuntimeConfig::default());
//! deploy_samples(&runtime, &channel)?;
//! let simulation = runtime.simulate(&invocation)?;
//! let code = runtime.ledger(&channel)?.commit(invocation.tx_id, simulation.rwset);
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod contracts;
pub mod domain;
pub mod errors;
pub mod invoker;
pub mod ledger;
pub mod ports;
pub mod runtime;

pub use context::TransactionContext;
pub use contracts::deploy_samples;
pub use domain::{
    Amount, AmountError, ArgumentError, Args, Invocation, Response, RuntimeConfig, Simulation,
    STATUS_ERROR, STATUS_OK,
};
pub use errors::{ContractError, InvocationError, RuntimeError};
pub use invoker::{CrossContractInvoker, InvokeArg};
pub use ledger::{Ledger, TxSimulator, VersionedValue};
pub use ports::{ChaincodeStub, TransactionHandler};
pub use runtime::ContractRuntime;

/// Convenient re-exports for contract authors and hosts.
pub mod prelude {
    pub use crate::context::TransactionContext;
    pub use crate::contracts::deploy_samples;
    pub use crate::domain::{Amount, Args, Invocation, Response, RuntimeConfig};
    pub use crate::errors::{ContractError, InvocationError, RuntimeError};
    pub use crate::ports::TransactionHandler;
    pub use crate::runtime::ContractRuntime;
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 2;
