//! # Ports Layer
//!
//! - `ChaincodeStub` (outbound, host-supplied): world state plus transaction
//!   metadata and the nested invocation primitive.
//! - `TransactionHandler` (inbound, contract-supplied): the capability set a
//!   contract implements so the host can dispatch to it.

use crate::context::TransactionContext;
use crate::domain::args::Args;
use crate::domain::response::Response;
use crate::errors::ContractError;
use lp_01_world_state::WorldState;
use shared_types::{ChannelId, ClientIdentity, ContractName, TransactionId};

/// Everything the host exposes to a running contract function.
///
/// World-state calls are scoped to the executing contract's namespace.
pub trait ChaincodeStub: WorldState {
    /// Transaction the execution belongs to.
    fn tx_id(&self) -> &TransactionId;

    /// Channel the execution runs on.
    fn channel_id(&self) -> &ChannelId;

    /// Client that created the proposal.
    fn creator(&self) -> &ClientIdentity;

    /// Proposal timestamp (seconds since the Unix epoch).
    fn tx_timestamp(&self) -> u64;

    /// Contract currently executing.
    fn contract_name(&self) -> &ContractName;

    /// Contract that invoked this one, `None` at the top level.
    fn invoking_contract(&self) -> Option<&ContractName>;

    /// Nesting depth of this execution (0 at the top level).
    fn call_depth(&self) -> usize;

    /// Deepest nesting the host allows.
    fn max_call_depth(&self) -> usize;

    /// Synchronously run `args[0]` on `contract` with `args[1..]` inside the
    /// same transaction. Writes of a failed callee are discarded.
    fn invoke_chaincode(&self, contract: &ContractName, args: &[Vec<u8>]) -> Response;
}

/// A deployed contract.
pub trait TransactionHandler: Send + Sync {
    /// Execute `function`. `Ok` becomes a 200 response, `Err` a 500 whose
    /// message is the error's display text.
    fn invoke(
        &self,
        ctx: &TransactionContext<'_>,
        function: &str,
        args: Args<'_>,
    ) -> Result<Vec<u8>, ContractError>;
}
