//! # Connection Context
//!
//! Everything a pipeline needs to reach the network, built once at startup
//! and passed explicitly. Cloning shares the same gateway and signer.

use crate::domain::{ConfigError, ProposalRequest, TimeoutConfig, TransactionResult};
use crate::errors::PipelineError;
use crate::identity::Signer;
use crate::pipeline::SubmissionPipeline;
use crate::ports::{GatewayService, SystemTimeSource, TimeSource};
use shared_types::{ChannelId, ClientIdentity, ContractName};
use std::fmt;
use std::sync::Arc;

/// Shared, read-only connection state.
#[derive(Clone)]
pub struct ConnectionContext {
    identity: Arc<ClientIdentity>,
    signer: Arc<dyn Signer>,
    gateway: Arc<dyn GatewayService>,
    clock: Arc<dyn TimeSource>,
    timeouts: TimeoutConfig,
}

impl ConnectionContext {
    /// Build a context. The identity must carry the signer's public key.
    pub fn new(
        identity: ClientIdentity,
        signer: Arc<dyn Signer>,
        gateway: Arc<dyn GatewayService>,
        timeouts: TimeoutConfig,
    ) -> Result<Self, ConfigError> {
        timeouts.validate()?;
        if identity.credentials != signer.public_key() {
            return Err(ConfigError::IdentityMismatch);
        }
        Ok(Self {
            identity: Arc::new(identity),
            signer,
            gateway,
            clock: Arc::new(SystemTimeSource),
            timeouts,
        })
    }

    /// Replace the proposal clock.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn signer(&self) -> &dyn Signer {
        self.signer.as_ref()
    }

    pub fn gateway(&self) -> &dyn GatewayService {
        self.gateway.as_ref()
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    /// Unix seconds used as the proposal timestamp.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// A fresh pipeline in `Idle`.
    pub fn pipeline(&self) -> SubmissionPipeline {
        SubmissionPipeline::new(self.clone())
    }

    /// Handle for one contract on one channel.
    pub fn contract(&self, channel: ChannelId, name: ContractName) -> Contract {
        Contract {
            context: self.clone(),
            channel,
            name,
        }
    }
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("identity", &self.identity.id())
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

/// A deployed contract as seen from the client.
#[derive(Debug, Clone)]
pub struct Contract {
    context: ConnectionContext,
    channel: ChannelId,
    name: ContractName,
}

impl Contract {
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn name(&self) -> &ContractName {
        &self.name
    }

    fn request<A: AsRef<[u8]>>(&self, function: &str, args: &[A]) -> ProposalRequest {
        ProposalRequest::new(self.channel.clone(), self.name.clone(), function).args(args)
    }

    /// Query one peer without touching the ledger.
    pub async fn evaluate_transaction<A: AsRef<[u8]>>(
        &self,
        function: &str,
        args: &[A],
    ) -> Result<Vec<u8>, PipelineError> {
        self.context
            .pipeline()
            .evaluate(self.request(function, args))
            .await
    }

    /// Run all four phases with a fresh proposal.
    pub async fn submit_transaction<A: AsRef<[u8]>>(
        &self,
        function: &str,
        args: &[A],
    ) -> Result<TransactionResult, PipelineError> {
        self.context
            .pipeline()
            .run(self.request(function, args))
            .await
    }
}
