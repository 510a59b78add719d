use thiserror::Error;
use uuid::Uuid;

use crate::models::RecoveryPhase;

/// Hard domain errors. These fire only on explicit workflow-invariant
/// violations; aggregate reads prefer degraded answers over errors.
#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("No injury found for id {0}")]
    InjuryNotFound(Uuid),
    #[error("No recovery protocol initialized for injury {0}")]
    ProtocolNotFound(Uuid),
    #[error("No return-to-play protocol found for id {0}")]
    RtpProtocolNotFound(Uuid),
    #[error("Unknown milestone '{name}' for injury {injury_id}")]
    MilestoneNotFound { injury_id: Uuid, name: String },
    #[error("Invalid phase transition: {from:?} -> {to:?} (only the immediate successor is allowed)")]
    InvalidPhaseTransition {
        from: RecoveryPhase,
        to: RecoveryPhase,
    },
    #[error("Protocol {0} is already completed")]
    ProtocolCompleted(Uuid),
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
