//! # Network Wiring
//!
//! Builds the in-process network (one channel, sample contracts deployed)
//! and the client's [`ConnectionContext`] from configuration.

use crate::config::{ConfigError, GatewayClientConfig};
use lp_02_contract_runtime::{deploy_samples, ContractRuntime, RuntimeConfig, RuntimeError};
use lp_03_submission_pipeline::{
    ConfigError as PipelineConfigError, ConnectionContext, GatewayService, InProcessGateway,
    Signer,
};
use shared_types::{ChannelId, IdentifierError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors while wiring the client.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

/// A connected client plus the network behind it.
pub struct Connection {
    pub context: ConnectionContext,
    pub gateway: Arc<InProcessGateway>,
    pub channel: ChannelId,
}

/// Stand up the in-process network and connect to it.
pub fn connect(config: &GatewayClientConfig) -> Result<Connection, SetupError> {
    config.validate()?;
    let channel = ChannelId::new(config.channel.as_str())?;

    let runtime = Arc::new(ContractRuntime::new(RuntimeConfig::default()));
    deploy_samples(&runtime, &channel)?;
    let gateway = Arc::new(InProcessGateway::new(runtime, config.endorsement)?);

    let signer = config.signer()?;
    let identity = signer.identity(&config.msp_id, &config.user);
    info!(
        org = %config.org_name,
        client = %identity.id(),
        endpoint = %config.peer_endpoint,
        gateway_peer = %config.gateway_peer,
        channel = %channel,
        "Connected to in-process network"
    );

    let signer: Arc<dyn Signer> = Arc::new(signer);
    let context = ConnectionContext::new(
        identity,
        signer,
        Arc::clone(&gateway) as Arc<dyn GatewayService>,
        config.timeouts.clone(),
    )?;
    Ok(Connection {
        context,
        gateway,
        channel,
    })
}
