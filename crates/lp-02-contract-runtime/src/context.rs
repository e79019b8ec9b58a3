//! # Transaction Context
//!
//! What a contract function receives from the host for one execution.

use crate::invoker::CrossContractInvoker;
use crate::ports::ChaincodeStub;
use lp_01_world_state::EntityStore;

/// Per-execution handle passed to [`crate::ports::TransactionHandler::invoke`].
#[derive(Clone, Copy)]
pub struct TransactionContext<'a> {
    stub: &'a dyn ChaincodeStub,
}

impl<'a> TransactionContext<'a> {
    /// Wrap a host stub.
    pub fn new(stub: &'a dyn ChaincodeStub) -> Self {
        Self { stub }
    }

    /// Raw host stub.
    pub fn stub(&self) -> &'a dyn ChaincodeStub {
        self.stub
    }

    /// Entity store over this contract's world state.
    pub fn store(&self) -> EntityStore<'a, dyn ChaincodeStub + 'a> {
        EntityStore::new(self.stub)
    }

    /// Invoker for calls into other contracts.
    pub fn invoker(&self) -> CrossContractInvoker<'a> {
        CrossContractInvoker::new(self.stub)
    }

    /// Identifier of the proposal's creator.
    pub fn client_id(&self) -> String {
        self.stub.creator().id()
    }
}
