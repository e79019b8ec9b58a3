//! Single-channel network with the sample contracts, for contract tests.

use super::deploy_samples;
use crate::domain::entities::{Invocation, RuntimeConfig};
use crate::errors::RuntimeError;
use crate::runtime::ContractRuntime;
use shared_types::{ChannelId, ClientIdentity, ContractName, TransactionId};
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) struct Harness {
    runtime: ContractRuntime,
    channel: ChannelId,
    creator: ClientIdentity,
    counter: AtomicU64,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let runtime = ContractRuntime::new(RuntimeConfig::default());
        let channel = ChannelId::new("mychannel").unwrap();
        deploy_samples(&runtime, &channel).unwrap();
        Self {
            runtime,
            channel,
            creator: ClientIdentity::new("Org1MSP", "alice", vec![]),
            counter: AtomicU64::new(0),
        }
    }

    fn invocation(&self, contract: &str, function: &str, args: &[&str]) -> Invocation {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Invocation {
            channel: self.channel.clone(),
            contract: ContractName::new(contract).unwrap(),
            function: function.to_string(),
            args: args.iter().map(|a| a.as_bytes().to_vec()).collect(),
            tx_id: TransactionId::from_raw(format!("tx{n}")),
            creator: self.creator.clone(),
            timestamp: 1_700_000_000 + n,
        }
    }

    /// Simulate and commit. `Err` carries the contract's message.
    pub(crate) fn submit(&self, contract: &str, function: &str, args: &[&str]) -> Result<Vec<u8>, String> {
        let invocation = self.invocation(contract, function, args);
        let simulation = self.runtime.simulate(&invocation).map_err(message)?;
        let code = self
            .runtime
            .ledger(&self.channel)
            .unwrap()
            .commit(invocation.tx_id, simulation.rwset);
        assert!(code.is_valid(), "unexpected validation code {code}");
        Ok(simulation.response.payload)
    }

    /// Simulate only.
    pub(crate) fn evaluate(&self, contract: &str, function: &str, args: &[&str]) -> Result<Vec<u8>, String> {
        let invocation = self.invocation(contract, function, args);
        self.runtime
            .simulate(&invocation)
            .map(|s| s.response.payload)
            .map_err(message)
    }
}

fn message(err: RuntimeError) -> String {
    match err {
        RuntimeError::Chaincode { message, .. } => message,
        other => other.to_string(),
    }
}
