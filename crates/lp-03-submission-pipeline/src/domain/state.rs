//! # Pipeline State Machine
//!
//! `Idle -> Proposed -> Endorsed -> Submitted -> Committed`, with every
//! failure falling back to `Idle`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a logical transaction currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    /// No transaction in flight.
    #[default]
    Idle,
    /// Signed proposal built.
    Proposed,
    /// Endorsements collected.
    Endorsed,
    /// Accepted by the orderer.
    Submitted,
    /// Validation code received.
    Committed,
}

impl PipelineState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        match (self, next) {
            (Self::Idle, Self::Proposed) => true,
            (Self::Committed, Self::Proposed) => true, // Next transaction
            (Self::Proposed, Self::Endorsed) => true,
            (Self::Endorsed, Self::Submitted) => true,
            (Self::Submitted, Self::Committed) => true,
            (_, Self::Idle) => true, // Failure in any phase
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Proposed => "Proposed",
            Self::Endorsed => "Endorsed",
            Self::Submitted => "Submitted",
            Self::Committed => "Committed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        use PipelineState::*;
        assert!(Idle.can_transition_to(Proposed));
        assert!(Proposed.can_transition_to(Endorsed));
        assert!(Endorsed.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Committed));
    }

    #[test]
    fn test_no_skipping_phases() {
        use PipelineState::*;
        assert!(!Idle.can_transition_to(Endorsed));
        assert!(!Proposed.can_transition_to(Submitted));
        assert!(!Endorsed.can_transition_to(Committed));
        assert!(!Submitted.can_transition_to(Proposed));
    }

    #[test]
    fn test_failure_resets_to_idle() {
        use PipelineState::*;
        for state in [Proposed, Endorsed, Submitted] {
            assert!(state.can_transition_to(Idle));
        }
    }

    #[test]
    fn test_committed_is_terminal() {
        assert!(PipelineState::Committed.is_terminal());
        assert!(!PipelineState::Submitted.is_terminal());
        assert!(PipelineState::Committed.can_transition_to(PipelineState::Proposed));
    }
}
