//! # Submission Pipeline
//!
//! Drives one logical transaction through propose, endorse, submit and
//! commit. Each network phase is bounded by its own timeout. A failure in
//! any phase drops the transaction and returns the pipeline to `Idle`;
//! nothing is retried here, since a retry needs a fresh proposal and
//! therefore a fresh transaction id.

use crate::connection::ConnectionContext;
use crate::domain::{
    EndorsedTransaction, Envelope, PipelineState, Proposal, ProposalRequest, SignedProposal,
    TransactionResult, NONCE_LEN,
};
use crate::errors::{EndorsementFailure, NetworkError, Phase, PipelineError};
use shared_types::{ChannelId, TransactionId};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn, Span};

enum Stage {
    Idle,
    Proposed(SignedProposal),
    Endorsed(EndorsedTransaction),
    Submitted(EndorsedTransaction),
    Committed(TransactionResult),
}

impl Stage {
    fn state(&self) -> PipelineState {
        match self {
            Self::Idle => PipelineState::Idle,
            Self::Proposed(_) => PipelineState::Proposed,
            Self::Endorsed(_) => PipelineState::Endorsed,
            Self::Submitted(_) => PipelineState::Submitted,
            Self::Committed(_) => PipelineState::Committed,
        }
    }
}

/// Per-transaction state machine over a shared [`ConnectionContext`].
pub struct SubmissionPipeline {
    context: ConnectionContext,
    stage: Stage,
}

impl SubmissionPipeline {
    pub fn new(context: ConnectionContext) -> Self {
        Self {
            context,
            stage: Stage::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.stage.state()
    }

    /// Id of the transaction in flight (or just committed).
    pub fn tx_id(&self) -> Option<&TransactionId> {
        match &self.stage {
            Stage::Idle => None,
            Stage::Proposed(p) => Some(p.tx_id()),
            Stage::Endorsed(t) | Stage::Submitted(t) => Some(t.tx_id()),
            Stage::Committed(r) => Some(&r.tx_id),
        }
    }

    /// Put back a stage that does not allow the requested transition.
    fn reject(&mut self, stage: Stage, to: PipelineState) -> PipelineError {
        let from = stage.state();
        self.stage = stage;
        PipelineError::InvalidState { from, to }
    }

    fn sign(&self, request: ProposalRequest) -> Result<SignedProposal, PipelineError> {
        request.validate().map_err(PipelineError::Proposal)?;
        let nonce: [u8; NONCE_LEN] = rand::random();
        let proposal = Proposal::new(
            request,
            self.context.identity().clone(),
            nonce,
            self.context.now(),
        );
        let signature = self.context.signer().sign(&proposal.digest())?;
        Ok(SignedProposal {
            proposal,
            signature,
        })
    }

    // =========================================================================
    // PHASES
    // =========================================================================

    /// `Idle -> Proposed`: build and sign a proposal.
    #[instrument(skip_all, fields(contract = %request.contract, function = %request.function))]
    pub fn propose(&mut self, request: ProposalRequest) -> Result<TransactionId, PipelineError> {
        let from = self.state();
        if !from.can_transition_to(PipelineState::Proposed) {
            return Err(PipelineError::InvalidState {
                from,
                to: PipelineState::Proposed,
            });
        }
        self.stage = Stage::Idle;
        let signed = self.sign(request)?;
        let tx_id = signed.tx_id().clone();
        info!(tx_id = %tx_id, "Proposal created");
        self.stage = Stage::Proposed(signed);
        Ok(tx_id)
    }

    /// `Proposed -> Endorsed`: collect endorsements within the endorse
    /// timeout. Returns the simulated result.
    #[instrument(skip_all, fields(tx_id = tracing::field::Empty))]
    pub async fn endorse(&mut self) -> Result<Vec<u8>, PipelineError> {
        let signed = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Proposed(signed) => signed,
            other => return Err(self.reject(other, PipelineState::Endorsed)),
        };
        let tx_id = signed.tx_id().clone();
        Span::current().record("tx_id", tracing::field::display(&tx_id));
        let after = self.context.timeouts().endorse;

        let endorsed = match timeout(after, self.context.gateway().endorse(&signed)).await {
            Err(_) => {
                warn!(?after, "Endorsement timed out");
                return Err(PipelineError::Endorsement {
                    tx_id,
                    reason: EndorsementFailure::Timeout(after),
                });
            }
            Ok(Err(NetworkError::Rejected(message))) => {
                warn!(%message, "Proposal rejected");
                return Err(PipelineError::Proposal(message));
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Endorsement failed");
                return Err(PipelineError::Endorsement {
                    tx_id,
                    reason: endorsement_failure(err),
                });
            }
            Ok(Ok(endorsed)) => endorsed,
        };

        if endorsed.tx_id() != &tx_id || endorsed.endorsements.is_empty() {
            return Err(PipelineError::Endorsement {
                tx_id,
                reason: EndorsementFailure::Policy(
                    "gateway returned no endorsements for this proposal".into(),
                ),
            });
        }

        info!(
            endorsements = endorsed.endorsements.len(),
            "Proposal endorsed"
        );
        let result = endorsed.response.payload.clone();
        self.stage = Stage::Endorsed(endorsed);
        Ok(result)
    }

    /// `Endorsed -> Submitted`: sign the envelope and hand it to the
    /// orderer within the submit timeout.
    #[instrument(skip_all, fields(tx_id = tracing::field::Empty))]
    pub async fn submit(&mut self) -> Result<TransactionId, PipelineError> {
        let transaction = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Endorsed(transaction) => transaction,
            other => return Err(self.reject(other, PipelineState::Submitted)),
        };
        let tx_id = transaction.tx_id().clone();
        Span::current().record("tx_id", tracing::field::display(&tx_id));

        let signature = self.context.signer().sign(&transaction.digest())?;
        let envelope = Envelope {
            transaction,
            signature,
        };
        let after = self.context.timeouts().submit;

        match timeout(after, self.context.gateway().submit(&envelope)).await {
            Err(_) => {
                warn!(?after, "Submit timed out, outcome unknown");
                Err(PipelineError::Timeout {
                    phase: Phase::Submit,
                    tx_id,
                    after,
                })
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Submission rejected");
                Err(PipelineError::Submission {
                    tx_id,
                    reason: err.to_string(),
                })
            }
            Ok(Ok(())) => {
                info!("Transaction submitted");
                self.stage = Stage::Submitted(envelope.transaction);
                Ok(tx_id)
            }
        }
    }

    /// `Submitted -> Committed`: wait for the validation code within the
    /// commit-status timeout.
    #[instrument(skip_all, fields(tx_id = tracing::field::Empty))]
    pub async fn commit(&mut self) -> Result<TransactionResult, PipelineError> {
        let transaction = match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Submitted(transaction) => transaction,
            other => return Err(self.reject(other, PipelineState::Committed)),
        };
        let tx_id = transaction.tx_id().clone();
        Span::current().record("tx_id", tracing::field::display(&tx_id));
        let channel: &ChannelId = &transaction.proposal.proposal.channel;
        let after = self.context.timeouts().commit_status;

        let status = match timeout(after, self.context.gateway().commit_status(channel, &tx_id)).await
        {
            Err(_) => {
                warn!(?after, "Commit status timed out, outcome unknown");
                return Err(PipelineError::Timeout {
                    phase: Phase::CommitStatus,
                    tx_id,
                    after,
                });
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Commit status unavailable");
                return Err(PipelineError::CommitStatus {
                    tx_id,
                    reason: err.to_string(),
                });
            }
            Ok(Ok(status)) => status,
        };

        if !status.code.is_valid() {
            warn!(code = %status.code, block = status.block_number, "Transaction invalidated");
            return Err(PipelineError::Commit {
                tx_id,
                code: status.code,
            });
        }

        info!(block = status.block_number, "Transaction committed");
        let result = TransactionResult {
            tx_id,
            result: transaction.response.payload,
            block_number: status.block_number,
        };
        self.stage = Stage::Committed(result.clone());
        Ok(result)
    }

    /// Run all four phases for a fresh proposal.
    pub async fn run(&mut self, request: ProposalRequest) -> Result<TransactionResult, PipelineError> {
        self.propose(request)?;
        self.endorse().await?;
        self.submit().await?;
        self.commit().await
    }

    /// Read-only query against a single peer within the evaluate timeout.
    /// Leaves the pipeline state untouched.
    #[instrument(skip_all, fields(contract = %request.contract, function = %request.function))]
    pub async fn evaluate(&self, request: ProposalRequest) -> Result<Vec<u8>, PipelineError> {
        let signed = self.sign(request)?;
        let tx_id = signed.tx_id().clone();
        let after = self.context.timeouts().evaluate;
        debug!(tx_id = %tx_id, "Evaluating");

        match timeout(after, self.context.gateway().evaluate(&signed)).await {
            Err(_) => {
                warn!(tx_id = %tx_id, ?after, "Evaluate timed out");
                Err(PipelineError::Timeout {
                    phase: Phase::Evaluate,
                    tx_id,
                    after,
                })
            }
            Ok(Err(NetworkError::Rejected(message))) => Err(PipelineError::Proposal(message)),
            Ok(Err(err)) => Err(PipelineError::Evaluation {
                tx_id,
                reason: endorsement_failure(err),
            }),
            Ok(Ok(response)) => Ok(response.payload),
        }
    }
}

fn endorsement_failure(err: NetworkError) -> EndorsementFailure {
    match err {
        NetworkError::Chaincode { status, message } => {
            EndorsementFailure::Chaincode { status, message }
        }
        NetworkError::EndorsementPolicy { .. } | NetworkError::EndorsementMismatch => {
            EndorsementFailure::Policy(err.to_string())
        }
        other => EndorsementFailure::Network(other.to_string()),
    }
}
