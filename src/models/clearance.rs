use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Fixed, totally ordered return-to-play phase sequence. A protocol only
/// ever advances to the immediate successor of its current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPhase {
    Rest,
    LightActivity,
    SportSpecific,
    NonContactTraining,
    FullContactPractice,
    GameClearance,
}

impl RecoveryPhase {
    /// The only phase a protocol in this phase may advance to.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Rest => Some(Self::LightActivity),
            Self::LightActivity => Some(Self::SportSpecific),
            Self::SportSpecific => Some(Self::NonContactTraining),
            Self::NonContactTraining => Some(Self::FullContactPractice),
            Self::FullContactPractice => Some(Self::GameClearance),
            Self::GameClearance => None,
        }
    }

    /// Contact tier authorized while training in this phase.
    pub fn clearance_level(self) -> ClearanceLevel {
        match self {
            Self::Rest | Self::LightActivity => ClearanceLevel::NoContact,
            Self::SportSpecific | Self::NonContactTraining => ClearanceLevel::LimitedContact,
            Self::FullContactPractice => ClearanceLevel::FullContact,
            Self::GameClearance => ClearanceLevel::GameReady,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceLevel {
    NoContact,
    LimitedContact,
    FullContact,
    GameReady,
}

impl ClearanceLevel {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::NoContact => Some(Self::LimitedContact),
            Self::LimitedContact => Some(Self::FullContact),
            Self::FullContact => Some(Self::GameReady),
            Self::GameReady => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolStatus {
    Initiated,
    InProgress,
    Completed,
    Failed,
    Paused,
}

/// Record stamped on every successful phase advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseProgression {
    pub phase: RecoveryPhase,
    pub assessment_score: f64,
    pub cleared_by: String,
    pub notes: Option<String>,
    pub advanced_at: DateTime<Utc>,
}

/// The return-to-play protocol for one injury. Terminal state is
/// Completed with clearance GameReady.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnToPlayProtocol {
    pub id: Uuid,
    pub player_id: Uuid,
    pub injury_id: Uuid,
    pub status: ProtocolStatus,
    pub current_phase: RecoveryPhase,
    pub clearance_level: ClearanceLevel,
    /// Rolling 0-100 adherence score maintained by the clearing staff.
    pub compliance_score: f64,
    pub sessions_completed: u32,
    pub sessions_required: u32,
    pub progression_history: Vec<PhaseProgression>,
    pub initiated_at: DateTime<Utc>,
    pub actual_completion_date: Option<DateTime<Utc>>,
}

/// Structural-healing status reported by imaging/medical review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealingStatus {
    Incomplete,
    Partial,
    Complete,
}

/// Assessment inputs for a clearance decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearanceAssessmentData {
    pub structural_healing: HealingStatus,
    /// Range of motion, percent of the uninjured side.
    pub range_of_motion_pct: f64,
    /// Strength, percent of the uninjured side.
    pub strength_pct: f64,
    /// Sport-specific field tests and their pass/fail outcomes.
    pub field_tests: HashMap<String, bool>,
    /// Psychological readiness score, 0-100.
    pub psychological_readiness: f64,
    pub assessed_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceOutcome {
    Cleared,
    NotCleared,
    Conditional,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearanceAssessment {
    pub protocol_id: Uuid,
    pub outcome: ClearanceOutcome,
    pub failed_criteria: Vec<String>,
    pub conditions: Vec<String>,
    pub assessed_by: String,
    pub assessed_at: DateTime<Utc>,
}

/// Outcome of an automated clearance-level request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnToPlayDecision {
    pub protocol_id: Uuid,
    pub approved: bool,
    pub granted_level: Option<ClearanceLevel>,
    pub reasons: Vec<String>,
    pub conditions: Vec<String>,
    pub decided_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_successor_chain() {
        let mut phase = RecoveryPhase::Rest;
        let mut steps = 0;
        while let Some(next) = phase.successor() {
            assert!(next > phase);
            phase = next;
            steps += 1;
        }
        assert_eq!(phase, RecoveryPhase::GameClearance);
        assert_eq!(steps, 5);
    }

    #[test]
    fn test_phase_clearance_mapping() {
        assert_eq!(
            RecoveryPhase::Rest.clearance_level(),
            ClearanceLevel::NoContact
        );
        assert_eq!(
            RecoveryPhase::SportSpecific.clearance_level(),
            ClearanceLevel::LimitedContact
        );
        assert_eq!(
            RecoveryPhase::GameClearance.clearance_level(),
            ClearanceLevel::GameReady
        );
    }
}
