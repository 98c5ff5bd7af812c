use serde::{Deserialize, Serialize};

use crate::domain::types::FundingProofStatus;

/// Per-call phases of a funding attempt.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FundingState {
    Start,
    Evaluated,
    Skipped,
    ProofRequested,
    ProofResolved,
    Rejected,
    Executed,
    Done,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum FundingEvent {
    DecisionMade,
    FundingNotRequired,
    ProofDispatched,
    ProofReturned { status: FundingProofStatus },
    ProofRejected,
    LedgerSettled { executed: bool },
    Finish,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid funding transition from {from:?} on {event}: {reason}")]
pub struct TransitionError {
    pub from: FundingState,
    pub event: String,
    pub reason: String,
}

pub fn transition(
    current: &FundingState,
    event: &FundingEvent,
) -> Result<FundingState, TransitionError> {
    match (current, event) {
        (FundingState::Start, FundingEvent::DecisionMade) => Ok(FundingState::Evaluated),
        (FundingState::Evaluated, FundingEvent::FundingNotRequired) => Ok(FundingState::Skipped),
        (FundingState::Evaluated, FundingEvent::ProofDispatched) => {
            Ok(FundingState::ProofRequested)
        }
        (FundingState::Evaluated, FundingEvent::LedgerSettled { .. }) => Ok(FundingState::Executed),
        (FundingState::ProofRequested, FundingEvent::ProofReturned { .. }) => {
            Ok(FundingState::ProofResolved)
        }
        (FundingState::ProofResolved, FundingEvent::ProofRejected) => Ok(FundingState::Rejected),
        (FundingState::ProofResolved, FundingEvent::LedgerSettled { .. }) => {
            Ok(FundingState::Executed)
        }
        (
            FundingState::Skipped | FundingState::Rejected | FundingState::Executed,
            FundingEvent::Finish,
        ) => Ok(FundingState::Done),
        _ => Err(TransitionError {
            from: *current,
            event: format!("{event:?}"),
            reason: "invalid transition".to_string(),
        }),
    }
}

impl FundingState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}
