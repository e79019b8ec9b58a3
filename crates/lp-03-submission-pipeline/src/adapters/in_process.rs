//! # In-Process Network
//!
//! A [`GatewayService`] backed directly by a [`ContractRuntime`]: a set of
//! endorsing peers that simulate against the shared committed ledger, and
//! a single orderer that cuts a block whenever commit status is requested.
//!
//! ## Commit Path
//!
//! | Step | Check | Failure |
//! |------|-------|---------|
//! | endorse | creator signature, known contract | `Rejected` / `InvalidSignature` |
//! | endorse | peers agree, policy met | `EndorsementMismatch` / `EndorsementPolicy` |
//! | submit | envelope signature, fresh tx id | `InvalidSignature` / `DuplicateTransaction` |
//! | block cut | creator's proposal signature | `BAD_CREATOR_SIGNATURE` |
//! | block cut | endorsement signatures, policy | `ENDORSEMENT_POLICY_FAILURE` |
//! | block cut | MVCC / phantom reads | ledger validation code |

use crate::domain::{
    CommitStatus, ConfigError, EndorsedTransaction, Endorsement, EndorsementPolicy, Envelope,
    Proposal, ProposalResponse, SignedProposal,
};
use crate::errors::NetworkError;
use crate::identity::{verify_signature, EcdsaSigner, Signer};
use crate::ports::GatewayService;
use async_trait::async_trait;
use lp_02_contract_runtime::{ContractRuntime, Invocation, RuntimeError};
use parking_lot::Mutex;
use shared_types::{ChannelId, ReadWriteSet, TransactionId, ValidationCode};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

struct Peer {
    name: String,
    signer: EcdsaSigner,
    online: AtomicBool,
}

#[derive(Default)]
struct Orderer {
    pending: Vec<Envelope>,
    seen: HashSet<TransactionId>,
    statuses: HashMap<TransactionId, CommitStatus>,
}

/// Peers plus orderer over one shared runtime.
pub struct InProcessGateway {
    runtime: Arc<ContractRuntime>,
    policy: EndorsementPolicy,
    peers: Vec<Peer>,
    orderer: Mutex<Orderer>,
    ordering: watch::Sender<bool>,
}

impl InProcessGateway {
    /// Network of `policy.peer_count` peers, each with a fresh key.
    pub fn new(runtime: Arc<ContractRuntime>, policy: EndorsementPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        let peers = (0..policy.peer_count)
            .map(|i| Peer {
                name: format!("peer{i}.org1.example.com"),
                signer: EcdsaSigner::generate(),
                online: AtomicBool::new(true),
            })
            .collect();
        let (ordering, _) = watch::channel(true);
        Ok(Self {
            runtime,
            policy,
            peers,
            orderer: Mutex::new(Orderer::default()),
            ordering,
        })
    }

    pub fn runtime(&self) -> &Arc<ContractRuntime> {
        &self.runtime
    }

    pub fn policy(&self) -> EndorsementPolicy {
        self.policy
    }

    /// Take a peer offline or bring it back. Returns false for an unknown index.
    pub fn set_peer_online(&self, index: usize, online: bool) -> bool {
        match self.peers.get(index) {
            Some(peer) => {
                peer.online.store(online, Ordering::SeqCst);
                info!(peer = %peer.name, online, "Peer availability changed");
                true
            }
            None => false,
        }
    }

    /// Stop cutting blocks. Commit-status requests wait until resumed.
    pub fn pause_ordering(&self) {
        self.ordering.send_replace(false);
    }

    /// Resume cutting blocks.
    pub fn resume_ordering(&self) {
        self.ordering.send_replace(true);
    }

    /// Number of envelopes waiting for the next block.
    pub fn pending(&self) -> usize {
        self.orderer.lock().pending.len()
    }

    fn online_peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers
            .iter()
            .filter(|peer| peer.online.load(Ordering::SeqCst))
    }

    // =========================================================================
    // PEER SIDE
    // =========================================================================

    fn check_proposal(&self, signed: &SignedProposal) -> Result<(), NetworkError> {
        let proposal = &signed.proposal;
        verify_signature(
            &proposal.creator.credentials,
            &proposal.digest(),
            &signed.signature,
        )
        .map_err(|e| NetworkError::InvalidSignature(format!("proposal {}: {e}", proposal.tx_id)))?;

        let ledger = self
            .runtime
            .ledger(&proposal.channel)
            .map_err(|e| NetworkError::Rejected(e.to_string()))?;
        if ledger.contains_tx(&proposal.tx_id) {
            return Err(NetworkError::DuplicateTransaction(proposal.tx_id.clone()));
        }
        if !self.runtime.has_contract(&proposal.channel, &proposal.contract) {
            return Err(NetworkError::Rejected(
                RuntimeError::UnknownContract {
                    channel: proposal.channel.clone(),
                    contract: proposal.contract.clone(),
                }
                .to_string(),
            ));
        }
        Ok(())
    }

    fn simulate(&self, proposal: &Proposal) -> Result<ProposalResponse, NetworkError> {
        let invocation = Invocation {
            channel: proposal.channel.clone(),
            contract: proposal.contract.clone(),
            function: proposal.function.clone(),
            args: proposal.args.clone(),
            tx_id: proposal.tx_id.clone(),
            creator: proposal.creator.clone(),
            timestamp: proposal.timestamp,
        };
        match self.runtime.simulate(&invocation) {
            Ok(simulation) => Ok(ProposalResponse {
                payload: simulation.response.payload,
                rwset: simulation.rwset,
            }),
            Err(RuntimeError::Chaincode { status, message }) => {
                Err(NetworkError::Chaincode { status, message })
            }
            Err(err) => Err(NetworkError::Rejected(err.to_string())),
        }
    }

    // =========================================================================
    // ORDERER SIDE
    // =========================================================================

    fn creator_signature_valid(transaction: &EndorsedTransaction) -> bool {
        let signed = &transaction.proposal;
        verify_signature(
            &signed.proposal.creator.credentials,
            &signed.proposal.digest(),
            &signed.signature,
        )
        .is_ok()
    }

    fn endorsements_satisfy_policy(&self, transaction: &EndorsedTransaction) -> bool {
        let digest = transaction.response.digest(transaction.tx_id());
        let mut endorsers = HashSet::new();
        for endorsement in &transaction.endorsements {
            let known = self
                .peers
                .iter()
                .any(|p| p.signer.public_key() == endorsement.public_key);
            if !known
                || verify_signature(&endorsement.public_key, &digest, &endorsement.signature).is_err()
            {
                return false;
            }
            endorsers.insert(endorsement.public_key.as_slice());
        }
        endorsers.len() >= self.policy.required_endorsements
    }

    /// Validate and commit every pending envelope of `channel` as one block.
    fn cut_block(&self, channel: &ChannelId) -> Result<(), NetworkError> {
        let mut orderer = self.orderer.lock();
        let (batch, rest): (Vec<Envelope>, Vec<Envelope>) = std::mem::take(&mut orderer.pending)
            .into_iter()
            .partition(|e| &e.transaction.proposal.proposal.channel == channel);
        orderer.pending = rest;
        if batch.is_empty() {
            return Ok(());
        }

        let ledger = self
            .runtime
            .ledger(channel)
            .map_err(|e| NetworkError::Unavailable(e.to_string()))?;
        let block_number = ledger.height();

        let mut to_commit: Vec<(TransactionId, ReadWriteSet)> = Vec::with_capacity(batch.len());
        for envelope in batch {
            let tx_id = envelope.tx_id().clone();
            let code = if !Self::creator_signature_valid(&envelope.transaction) {
                ValidationCode::BadCreatorSignature
            } else if !self.endorsements_satisfy_policy(&envelope.transaction) {
                ValidationCode::EndorsementPolicyFailure
            } else {
                to_commit.push((tx_id, envelope.transaction.response.rwset));
                continue;
            };
            warn!(tx_id = %tx_id, %code, "Transaction invalidated before MVCC");
            orderer.statuses.insert(
                tx_id.clone(),
                CommitStatus {
                    tx_id,
                    code,
                    block_number,
                },
            );
        }

        let ids: Vec<TransactionId> = to_commit.iter().map(|(id, _)| id.clone()).collect();
        let codes = ledger.commit_block(to_commit);
        for (tx_id, code) in ids.into_iter().zip(codes) {
            orderer.statuses.insert(
                tx_id.clone(),
                CommitStatus {
                    tx_id,
                    code,
                    block_number,
                },
            );
        }
        Ok(())
    }
}

#[async_trait]
impl GatewayService for InProcessGateway {
    async fn evaluate(&self, proposal: &SignedProposal) -> Result<ProposalResponse, NetworkError> {
        self.check_proposal(proposal)?;
        let peer = self
            .online_peers()
            .next()
            .ok_or_else(|| NetworkError::Unavailable("no peers available".into()))?;
        debug!(peer = %peer.name, tx_id = %proposal.tx_id(), "Evaluating proposal");
        self.simulate(&proposal.proposal)
    }

    async fn endorse(&self, proposal: &SignedProposal) -> Result<EndorsedTransaction, NetworkError> {
        self.check_proposal(proposal)?;
        let tx_id = proposal.tx_id();

        let mut agreed: Option<ProposalResponse> = None;
        let mut endorsements = Vec::new();
        for peer in self.online_peers() {
            let response = self.simulate(&proposal.proposal)?;
            match &agreed {
                Some(first) if first != &response => {
                    warn!(peer = %peer.name, tx_id = %tx_id, "Peer returned a different result");
                    return Err(NetworkError::EndorsementMismatch);
                }
                Some(_) => {}
                None => agreed = Some(response.clone()),
            }
            let signature = peer
                .signer
                .sign(&response.digest(tx_id))
                .map_err(|e| NetworkError::Unavailable(e.to_string()))?;
            debug!(peer = %peer.name, tx_id = %tx_id, "Endorsed");
            endorsements.push(Endorsement {
                endorser: peer.name.clone(),
                public_key: peer.signer.public_key(),
                signature,
            });
        }

        if endorsements.len() < self.policy.required_endorsements {
            return Err(NetworkError::EndorsementPolicy {
                required: self.policy.required_endorsements,
                received: endorsements.len(),
            });
        }
        // The policy requires at least one endorsement, so `agreed` is set.
        let response = agreed.ok_or(NetworkError::EndorsementPolicy {
            required: self.policy.required_endorsements,
            received: 0,
        })?;
        Ok(EndorsedTransaction {
            proposal: proposal.clone(),
            response,
            endorsements,
        })
    }

    async fn submit(&self, envelope: &Envelope) -> Result<(), NetworkError> {
        let transaction = &envelope.transaction;
        let creator = &transaction.proposal.proposal.creator;
        verify_signature(&creator.credentials, &transaction.digest(), &envelope.signature)
            .map_err(|e| NetworkError::InvalidSignature(format!("envelope {}: {e}", envelope.tx_id())))?;

        let channel = &transaction.proposal.proposal.channel;
        let ledger = self
            .runtime
            .ledger(channel)
            .map_err(|e| NetworkError::Rejected(e.to_string()))?;

        let tx_id = envelope.tx_id().clone();
        let mut orderer = self.orderer.lock();
        if ledger.contains_tx(&tx_id) || !orderer.seen.insert(tx_id.clone()) {
            warn!(tx_id = %tx_id, "Duplicate transaction rejected by orderer");
            return Err(NetworkError::DuplicateTransaction(tx_id));
        }
        orderer.pending.push(envelope.clone());
        info!(tx_id = %tx_id, channel = %channel, "Transaction queued for ordering");
        Ok(())
    }

    async fn commit_status(
        &self,
        channel: &ChannelId,
        tx_id: &TransactionId,
    ) -> Result<CommitStatus, NetworkError> {
        if !self.orderer.lock().seen.contains(tx_id) {
            return Err(NetworkError::UnknownTransaction(tx_id.clone()));
        }

        let mut running = self.ordering.subscribe();
        running
            .wait_for(|running| *running)
            .await
            .map_err(|_| NetworkError::Unavailable("ordering service stopped".into()))?;

        self.cut_block(channel)?;
        self.orderer
            .lock()
            .statuses
            .get(tx_id)
            .cloned()
            .ok_or_else(|| NetworkError::UnknownTransaction(tx_id.clone()))
    }
}
