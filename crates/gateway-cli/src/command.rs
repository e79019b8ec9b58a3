//! # Commands
//!
//! A command names a contract, a function and its arguments. Submitted
//! commands go through all four pipeline phases; evaluated ones query a
//! single peer.

use lp_03_submission_pipeline::{ConnectionContext, PipelineError};
use shared_types::{ChannelId, ContractName};
use std::fmt;

/// Submit or evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Submit,
    Evaluate,
}

/// One request to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub mode: Mode,
    pub contract: String,
    pub function: String,
    pub args: Vec<String>,
}

/// What a step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Submitted { tx_id: String, response: String },
    Evaluated { response: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted { tx_id, response } => {
                write!(f, "Transaction ID: {tx_id} Response: {response}")
            }
            Self::Evaluated { response } => write!(f, "Response: {response}"),
        }
    }
}

/// Parse a script line: `submit|evaluate <contract> <function> [args...]`.
/// Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Step>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut words = line.split_whitespace();
    let mode = match words.next() {
        Some("submit") => Mode::Submit,
        Some("evaluate") => Mode::Evaluate,
        Some(other) => return Err(format!("unknown command {other:?}")),
        None => return Ok(None),
    };
    let (Some(contract), Some(function)) = (words.next(), words.next()) else {
        return Err(format!("expected <contract> <function> in {line:?}"));
    };
    Ok(Some(Step {
        mode,
        contract: contract.to_string(),
        function: function.to_string(),
        args: words.map(str::to_string).collect(),
    }))
}

/// Run one step on `channel`.
pub async fn run_step(
    context: &ConnectionContext,
    channel: &ChannelId,
    step: &Step,
) -> Result<Outcome, PipelineError> {
    let name = ContractName::new(step.contract.as_str())
        .map_err(|e| PipelineError::Proposal(e.to_string()))?;
    let contract = context.contract(channel.clone(), name);
    match step.mode {
        Mode::Submit => {
            let result = contract.submit_transaction(&step.function, &step.args).await?;
            Ok(Outcome::Submitted {
                tx_id: result.tx_id.to_string(),
                response: String::from_utf8_lossy(&result.result).into_owned(),
            })
        }
        Mode::Evaluate => {
            let payload = contract.evaluate_transaction(&step.function, &step.args).await?;
            Ok(Outcome::Evaluated {
                response: String::from_utf8_lossy(&payload).into_owned(),
            })
        }
    }
}
