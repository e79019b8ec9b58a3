//! Test network: the sample contracts on `mychannel`, reached through a
//! gateway that can be told to go silent during endorsement.

use async_trait::async_trait;
use lp_02_contract_runtime::{deploy_samples, ContractRuntime, RuntimeConfig};
use lp_03_submission_pipeline::{
    CommitStatus, ConnectionContext, Contract, EcdsaSigner, EndorsedTransaction,
    EndorsementPolicy, Envelope, GatewayService, InProcessGateway, NetworkError, ProposalRequest,
    ProposalResponse, SignedProposal, Signer, TimeoutConfig,
};
use shared_types::{ChannelId, ContractName, TransactionId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const CHANNEL: &str = "mychannel";

/// In-process gateway whose endorse phase can hang.
pub struct TestGateway {
    pub inner: InProcessGateway,
    pub stall_endorse: AtomicBool,
}

#[async_trait]
impl GatewayService for TestGateway {
    async fn evaluate(&self, proposal: &SignedProposal) -> Result<ProposalResponse, NetworkError> {
        self.inner.evaluate(proposal).await
    }

    async fn endorse(&self, proposal: &SignedProposal) -> Result<EndorsedTransaction, NetworkError> {
        if self.stall_endorse.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.inner.endorse(proposal).await
    }

    async fn submit(&self, envelope: &Envelope) -> Result<(), NetworkError> {
        self.inner.submit(envelope).await
    }

    async fn commit_status(
        &self,
        channel: &ChannelId,
        tx_id: &TransactionId,
    ) -> Result<CommitStatus, NetworkError> {
        self.inner.commit_status(channel, tx_id).await
    }
}

/// A network plus one connected client.
pub struct TestNetwork {
    pub gateway: Arc<TestGateway>,
    pub context: ConnectionContext,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self::with_policy(EndorsementPolicy::default())
    }

    pub fn with_policy(policy: EndorsementPolicy) -> Self {
        let runtime = Arc::new(ContractRuntime::new(RuntimeConfig::default()));
        deploy_samples(&runtime, &channel()).unwrap();
        let gateway = Arc::new(TestGateway {
            inner: InProcessGateway::new(runtime, policy).unwrap(),
            stall_endorse: AtomicBool::new(false),
        });
        let context = Self::connect(&gateway, "alice");
        Self { gateway, context }
    }

    /// Another client on the same network.
    pub fn client(&self, user: &str) -> ConnectionContext {
        Self::connect(&self.gateway, user)
    }

    fn connect(gateway: &Arc<TestGateway>, user: &str) -> ConnectionContext {
        let signer = Arc::new(EcdsaSigner::generate());
        let identity = signer.identity("Org1MSP", user);
        ConnectionContext::new(
            identity,
            signer as Arc<dyn Signer>,
            Arc::clone(gateway) as Arc<dyn GatewayService>,
            TimeoutConfig::default(),
        )
        .unwrap()
    }

    pub fn contract(&self, name: &str) -> Contract {
        self.context
            .contract(channel(), ContractName::new(name).unwrap())
    }

    pub fn height(&self) -> u64 {
        self.gateway
            .inner
            .runtime()
            .ledger(&channel())
            .unwrap()
            .height()
    }
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

pub fn channel() -> ChannelId {
    ChannelId::new(CHANNEL).unwrap()
}

pub fn request(contract: &str, function: &str, args: &[&str]) -> ProposalRequest {
    ProposalRequest::new(channel(), ContractName::new(contract).unwrap(), function).args(args)
}
