//! # Contract Runtime
//!
//! Host side of contract execution: a registry of deployed contracts per
//! channel, each channel with its committed [`Ledger`].
//!
//! ## Execution Model
//!
//! - One [`TxSimulator`] per top-level invocation; nested calls share it.
//! - Each execution frame sees world state through its own contract's
//!   namespace.
//! - A nested call takes a savepoint first and rolls back to it if the
//!   callee answers with anything but 200.
//! - A non-200 top-level answer discards the whole simulation.

use crate::context::TransactionContext;
use crate::domain::args::Args;
use crate::domain::entities::{Invocation, RuntimeConfig, Simulation};
use crate::domain::response::Response;
use crate::errors::RuntimeError;
use crate::ledger::{Ledger, TxSimulator};
use crate::ports::{ChaincodeStub, TransactionHandler};
use lp_01_world_state::{StateIterator, StorageError, WorldState};
use parking_lot::RwLock;
use shared_types::{ChannelId, ClientIdentity, ContractName, TransactionId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Channel {
    ledger: Arc<Ledger>,
    contracts: RwLock<HashMap<ContractName, Arc<dyn TransactionHandler>>>,
}

impl Channel {
    fn handler(&self, name: &ContractName) -> Option<Arc<dyn TransactionHandler>> {
        self.contracts.read().get(name).cloned()
    }
}

/// Registry of channels and deployed contracts.
pub struct ContractRuntime {
    config: RuntimeConfig,
    channels: RwLock<HashMap<ChannelId, Arc<Channel>>>,
}

impl ContractRuntime {
    /// Create an empty runtime.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Runtime limits.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Create `channel` if missing and return its ledger.
    pub fn create_channel(&self, channel: &ChannelId) -> Arc<Ledger> {
        let mut channels = self.channels.write();
        let entry = channels.entry(channel.clone()).or_insert_with(|| {
            info!(channel = %channel, "Created channel");
            Arc::new(Channel {
                ledger: Arc::new(Ledger::new()),
                contracts: RwLock::new(HashMap::new()),
            })
        });
        Arc::clone(&entry.ledger)
    }

    /// Deploy `handler` under `name` on an existing channel.
    pub fn deploy(
        &self,
        channel: &ChannelId,
        name: ContractName,
        handler: Arc<dyn TransactionHandler>,
    ) -> Result<(), RuntimeError> {
        let ch = self.channel(channel)?;
        let mut contracts = ch.contracts.write();
        if contracts.contains_key(&name) {
            return Err(RuntimeError::AlreadyDeployed {
                channel: channel.clone(),
                contract: name,
            });
        }
        info!(channel = %channel, contract = %name, "Deployed contract");
        contracts.insert(name, handler);
        Ok(())
    }

    /// Committed ledger of `channel`.
    pub fn ledger(&self, channel: &ChannelId) -> Result<Arc<Ledger>, RuntimeError> {
        Ok(Arc::clone(&self.channel(channel)?.ledger))
    }

    /// Returns true if `contract` is deployed on `channel`.
    pub fn has_contract(&self, channel: &ChannelId, contract: &ContractName) -> bool {
        self.channel(channel)
            .map(|ch| ch.contracts.read().contains_key(contract))
            .unwrap_or(false)
    }

    /// Execute `invocation` against committed state without committing.
    pub fn simulate(&self, invocation: &Invocation) -> Result<Simulation, RuntimeError> {
        let channel = self.channel(&invocation.channel)?;
        let handler = channel
            .handler(&invocation.contract)
            .ok_or_else(|| RuntimeError::UnknownContract {
                channel: invocation.channel.clone(),
                contract: invocation.contract.clone(),
            })?;

        let simulator = TxSimulator::new(&channel.ledger);
        let response = {
            let frame = Frame {
                runtime: self,
                channel: &channel,
                simulator: &simulator,
                tx_id: &invocation.tx_id,
                channel_id: &invocation.channel,
                creator: &invocation.creator,
                timestamp: invocation.timestamp,
                contract: invocation.contract.clone(),
                caller: None,
                depth: 0,
            };
            execute(handler.as_ref(), &frame, &invocation.wire_args())
        };

        if !response.is_ok() {
            warn!(
                tx_id = %invocation.tx_id,
                contract = %invocation.contract,
                function = %invocation.function,
                status = response.status,
                message = %response.message,
                "Simulation failed"
            );
            return Err(RuntimeError::Chaincode {
                status: response.status,
                message: response.message,
            });
        }

        let rwset = simulator.into_rwset();
        debug!(
            tx_id = %invocation.tx_id,
            reads = rwset.reads.len(),
            writes = rwset.writes.len(),
            "Simulation complete"
        );
        Ok(Simulation { response, rwset })
    }

    fn channel(&self, channel: &ChannelId) -> Result<Arc<Channel>, RuntimeError> {
        self.channels
            .read()
            .get(channel)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownChannel(channel.clone()))
    }
}

fn execute(handler: &dyn TransactionHandler, frame: &Frame<'_>, args: &[Vec<u8>]) -> Response {
    let Some((function, rest)) = args.split_first() else {
        return Response::error("missing function name");
    };
    let Ok(function) = std::str::from_utf8(function) else {
        return Response::error("function name is not valid UTF-8");
    };

    let ctx = TransactionContext::new(frame);
    match handler.invoke(&ctx, function, Args::new(rest)) {
        Ok(payload) => Response::success(payload),
        Err(e) => Response::error(e.to_string()),
    }
}

/// One contract execution inside a simulation.
struct Frame<'r> {
    runtime: &'r ContractRuntime,
    channel: &'r Channel,
    simulator: &'r TxSimulator<'r>,
    tx_id: &'r TransactionId,
    channel_id: &'r ChannelId,
    creator: &'r ClientIdentity,
    timestamp: u64,
    contract: ContractName,
    caller: Option<ContractName>,
    depth: usize,
}

impl WorldState for Frame<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.simulator.get(self.contract.as_str(), key))
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.simulator.put(self.contract.as_str(), key, value);
        Ok(())
    }

    fn del_state(&self, key: &str) -> Result<(), StorageError> {
        self.simulator.delete(self.contract.as_str(), key);
        Ok(())
    }

    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateIterator<'_>, StorageError> {
        let entries = self
            .simulator
            .range(self.contract.as_str(), start_key, end_key)?;
        Ok(Box::new(entries.into_iter().map(Ok)))
    }
}

impl ChaincodeStub for Frame<'_> {
    fn tx_id(&self) -> &TransactionId {
        self.tx_id
    }

    fn channel_id(&self) -> &ChannelId {
        self.channel_id
    }

    fn creator(&self) -> &ClientIdentity {
        self.creator
    }

    fn tx_timestamp(&self) -> u64 {
        self.timestamp
    }

    fn contract_name(&self) -> &ContractName {
        &self.contract
    }

    fn invoking_contract(&self) -> Option<&ContractName> {
        self.caller.as_ref()
    }

    fn call_depth(&self) -> usize {
        self.depth
    }

    fn max_call_depth(&self) -> usize {
        self.runtime.config.max_call_depth
    }

    fn invoke_chaincode(&self, contract: &ContractName, args: &[Vec<u8>]) -> Response {
        let depth = self.depth + 1;
        if depth > self.max_call_depth() {
            return Response::error(format!(
                "call depth exceeded: {} > {}",
                depth,
                self.max_call_depth()
            ));
        }
        let Some(handler) = self.channel.handler(contract) else {
            return Response::error(format!(
                "chaincode {} not found on channel {}",
                contract, self.channel_id
            ));
        };

        let savepoint = self.simulator.savepoint();
        let child = Frame {
            runtime: self.runtime,
            channel: self.channel,
            simulator: self.simulator,
            tx_id: self.tx_id,
            channel_id: self.channel_id,
            creator: self.creator,
            timestamp: self.timestamp,
            contract: contract.clone(),
            caller: Some(self.contract.clone()),
            depth,
        };
        let response = execute(handler.as_ref(), &child, args);
        if !response.is_ok() {
            self.simulator.rollback(savepoint);
        }
        response
    }
}
