use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ComplianceError;
use crate::models::{
    ClearanceAssessment, ClearanceAssessmentData, ClearanceLevel, ClearanceOutcome, HealingStatus,
    PhaseProgression, ProtocolStatus, RecoveryPhase, ReturnToPlayDecision, ReturnToPlayProtocol,
};
use crate::store::MedicalRecordStore;

/// Full clearance thresholds.
const MIN_ROM_PCT: f64 = 90.0;
const MIN_STRENGTH_PCT: f64 = 90.0;
const MIN_PSYCH_READINESS: f64 = 80.0;
/// Automated clearance gates.
const MIN_COMPLIANCE_SCORE: f64 = 80.0;

/// Owns the return-to-play protocol state machine: an ordered phase
/// sequence with an associated clearance level, gated by assessments and
/// approvals. Phase transitions only ever go to the immediate successor.
#[derive(Clone)]
pub struct ClearanceService {
    store: Arc<dyn MedicalRecordStore>,
    protocols: Arc<RwLock<HashMap<Uuid, ReturnToPlayProtocol>>>,
}

impl ClearanceService {
    pub fn new(store: Arc<dyn MedicalRecordStore>) -> Self {
        Self {
            store,
            protocols: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create the protocol for an injury, once. A repeat call for the same
    /// injury returns the existing protocol unchanged.
    pub async fn initiate_protocol(
        &self,
        player_id: Uuid,
        injury_id: Uuid,
    ) -> Result<ReturnToPlayProtocol, ComplianceError> {
        let injury = self
            .store
            .find_injury(injury_id)
            .await
            .map_err(ComplianceError::Internal)?
            .ok_or(ComplianceError::InjuryNotFound(injury_id))?;

        let mut protocols = self.protocols.write().await;
        if let Some(existing) = protocols.values().find(|p| p.injury_id == injury_id) {
            debug!("Protocol already initiated for injury {}", injury_id);
            return Ok(existing.clone());
        }

        let protocol = ReturnToPlayProtocol {
            id: Uuid::new_v4(),
            player_id,
            injury_id,
            status: ProtocolStatus::Initiated,
            current_phase: RecoveryPhase::Rest,
            clearance_level: ClearanceLevel::NoContact,
            compliance_score: 100.0,
            sessions_completed: 0,
            sessions_required: u32::from(injury.severity_level.max(2)) * 2,
            progression_history: Vec::new(),
            initiated_at: Utc::now(),
            actual_completion_date: None,
        };
        info!(
            "Initiated return-to-play protocol {} for injury {}",
            protocol.id, injury_id
        );
        protocols.insert(protocol.id, protocol.clone());
        Ok(protocol)
    }

    /// Advance to the next phase. Rejects any transition that is not the
    /// exact immediate successor of the current phase; no skipping, no
    /// going backward.
    pub async fn advance_phase(
        &self,
        protocol_id: Uuid,
        new_phase: RecoveryPhase,
        assessment_score: f64,
        officer: &str,
        notes: Option<String>,
    ) -> Result<ReturnToPlayProtocol, ComplianceError> {
        let mut protocols = self.protocols.write().await;
        let protocol = protocols
            .get_mut(&protocol_id)
            .ok_or(ComplianceError::RtpProtocolNotFound(protocol_id))?;

        if protocol.status == ProtocolStatus::Completed {
            return Err(ComplianceError::ProtocolCompleted(protocol_id));
        }
        if protocol.current_phase.successor() != Some(new_phase) {
            return Err(ComplianceError::InvalidPhaseTransition {
                from: protocol.current_phase,
                to: new_phase,
            });
        }

        protocol.current_phase = new_phase;
        protocol.clearance_level = new_phase.clearance_level();
        protocol.sessions_completed += 1;
        protocol.progression_history.push(PhaseProgression {
            phase: new_phase,
            assessment_score,
            cleared_by: officer.to_string(),
            notes,
            advanced_at: Utc::now(),
        });

        if new_phase == RecoveryPhase::GameClearance {
            protocol.status = ProtocolStatus::Completed;
            protocol.actual_completion_date = Some(Utc::now());
            info!("Protocol {} reached game clearance", protocol_id);
        } else {
            protocol.status = ProtocolStatus::InProgress;
        }

        Ok(protocol.clone())
    }

    /// Evaluate assessment data against the fixed clearance thresholds.
    /// Structural healing and the field tests are hard gates; the
    /// percentage criteria differentiate conditional from full clearance.
    /// A Cleared outcome is terminal for the protocol.
    pub async fn conduct_clearance_assessment(
        &self,
        protocol_id: Uuid,
        data: &ClearanceAssessmentData,
    ) -> Result<ClearanceAssessment, ComplianceError> {
        let mut protocols = self.protocols.write().await;
        let protocol = protocols
            .get_mut(&protocol_id)
            .ok_or(ComplianceError::RtpProtocolNotFound(protocol_id))?;

        let mut hard_failures = Vec::new();
        let mut conditions = Vec::new();

        if data.structural_healing != HealingStatus::Complete {
            hard_failures.push(format!(
                "Structural healing is {:?}, must be complete",
                data.structural_healing
            ));
        }
        for (test, passed) in &data.field_tests {
            if !passed {
                hard_failures.push(format!("Field test failed: {test}"));
            }
        }
        if data.range_of_motion_pct < MIN_ROM_PCT {
            conditions.push(format!(
                "Progress range of motion to >= {MIN_ROM_PCT:.0}% (currently {:.0}%)",
                data.range_of_motion_pct
            ));
        }
        if data.strength_pct < MIN_STRENGTH_PCT {
            conditions.push(format!(
                "Progress strength to >= {MIN_STRENGTH_PCT:.0}% (currently {:.0}%)",
                data.strength_pct
            ));
        }
        if data.psychological_readiness < MIN_PSYCH_READINESS {
            conditions.push(format!(
                "Psychological readiness {:.0} below {MIN_PSYCH_READINESS:.0}",
                data.psychological_readiness
            ));
        }

        let outcome = if !hard_failures.is_empty() {
            ClearanceOutcome::NotCleared
        } else if conditions.is_empty() {
            ClearanceOutcome::Cleared
        } else {
            ClearanceOutcome::Conditional
        };

        if outcome == ClearanceOutcome::Cleared {
            protocol.status = ProtocolStatus::Completed;
            protocol.clearance_level = ClearanceLevel::GameReady;
            protocol.actual_completion_date = Some(Utc::now());
            info!(
                "Protocol {} fully cleared by {}",
                protocol_id, data.assessed_by
            );
        }

        Ok(ClearanceAssessment {
            protocol_id,
            outcome,
            failed_criteria: hard_failures,
            conditions,
            assessed_by: data.assessed_by.clone(),
            assessed_at: Utc::now(),
        })
    }

    /// Automated clearance-level request. Grants only the immediate next
    /// level, gated on the protocol's compliance score and session count;
    /// anything else is deferred with reasons.
    pub async fn process_automated_clearance(
        &self,
        protocol_id: Uuid,
        level: ClearanceLevel,
        conditions: Option<Vec<String>>,
    ) -> Result<ReturnToPlayDecision, ComplianceError> {
        let mut protocols = self.protocols.write().await;
        let protocol = protocols
            .get_mut(&protocol_id)
            .ok_or(ComplianceError::RtpProtocolNotFound(protocol_id))?;

        let mut reasons = Vec::new();
        if protocol.clearance_level.next() != Some(level) {
            reasons.push(format!(
                "Requested level {level:?} is not the immediate step up from {:?}",
                protocol.clearance_level
            ));
        }
        if protocol.compliance_score < MIN_COMPLIANCE_SCORE {
            reasons.push(format!(
                "Compliance score {:.0} below {MIN_COMPLIANCE_SCORE:.0}",
                protocol.compliance_score
            ));
        }
        if protocol.sessions_completed < protocol.sessions_required {
            reasons.push(format!(
                "Only {} of {} required sessions completed",
                protocol.sessions_completed, protocol.sessions_required
            ));
        }

        let approved = reasons.is_empty();
        if approved {
            protocol.clearance_level = level;
            if level == ClearanceLevel::GameReady {
                protocol.status = ProtocolStatus::Completed;
                protocol.actual_completion_date = Some(Utc::now());
            }
            info!("Automated clearance to {:?} for protocol {}", level, protocol_id);
        }

        Ok(ReturnToPlayDecision {
            protocol_id,
            approved,
            granted_level: approved.then_some(level),
            reasons,
            conditions: conditions.unwrap_or_default(),
            decided_at: Utc::now(),
        })
    }

    /// Update the rolling compliance score maintained by clearing staff.
    pub async fn update_compliance_score(
        &self,
        protocol_id: Uuid,
        score: f64,
    ) -> Result<(), ComplianceError> {
        let mut protocols = self.protocols.write().await;
        let protocol = protocols
            .get_mut(&protocol_id)
            .ok_or(ComplianceError::RtpProtocolNotFound(protocol_id))?;
        protocol.compliance_score = score.clamp(0.0, 100.0);
        Ok(())
    }

    pub async fn get_protocol(
        &self,
        protocol_id: Uuid,
    ) -> Result<ReturnToPlayProtocol, ComplianceError> {
        let protocols = self.protocols.read().await;
        protocols
            .get(&protocol_id)
            .cloned()
            .ok_or(ComplianceError::RtpProtocolNotFound(protocol_id))
    }
}
