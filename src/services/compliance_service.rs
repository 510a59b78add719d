use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::MedicalCache;
use crate::config::EngineConfig;
use crate::models::{
    AvailabilityStatus, ExerciseRestriction, ExerciseSubstitution, Injury, InjuryRiskAlert,
    LoadManagementData, RealTimeMetrics, WellnessEntry, BASELINE_LOAD,
};
use crate::services::{LoadService, RestrictionService, RiskService, SubstitutionService};
use crate::store::MedicalRecordStore;

/// Aggregate result of one workout compliance check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCheckResult {
    pub is_compliant: bool,
    pub restrictions: Vec<ExerciseRestriction>,
    pub substitutions: Vec<ExerciseSubstitution>,
    pub risk_alerts: Vec<InjuryRiskAlert>,
    pub load_recommendations: Vec<LoadManagementData>,
    pub medical_notes: Vec<String>,
}

impl ComplianceCheckResult {
    /// Maximally permissive result used when the check itself cannot run
    /// (e.g. malformed player id). Callers are annotated, not blocked.
    fn permissive(note: String) -> Self {
        Self {
            is_compliant: true,
            restrictions: Vec::new(),
            substitutions: Vec::new(),
            risk_alerts: Vec::new(),
            load_recommendations: Vec::new(),
            medical_notes: vec![note],
        }
    }
}

/// Orchestrates a compliance check: restriction derivation, per-exercise
/// substitution, risk scoring and load recommendation, aggregated into
/// one result. Prefers a degraded, explainable answer over an error
/// whenever medical context is merely missing.
#[derive(Clone)]
pub struct ComplianceService {
    store: Arc<dyn MedicalRecordStore>,
    restrictions: RestrictionService,
    substitutions: SubstitutionService,
    risk: RiskService,
    load: LoadService,
}

impl ComplianceService {
    pub fn new(
        store: Arc<dyn MedicalRecordStore>,
        cache: Arc<dyn MedicalCache>,
        config: EngineConfig,
    ) -> Self {
        let load = LoadService::new(store.clone(), cache, config);
        Self {
            store,
            restrictions: RestrictionService::new(),
            substitutions: SubstitutionService::new(),
            risk: RiskService::new(),
            load,
        }
    }

    /// Check a planned workout against the player's current medical
    /// status. Never fails: malformed ids and collaborator outages all
    /// degrade to annotated, conservative-but-permissive results.
    pub async fn check_workout_compliance(
        &self,
        player_id: &str,
        exercises: &[String],
        intensity: f64,
    ) -> ComplianceCheckResult {
        let player_id = match player_id.parse::<Uuid>() {
            Ok(id) => id,
            Err(_) => {
                warn!("Compliance check with malformed player id '{}'", player_id);
                return ComplianceCheckResult::permissive(format!(
                    "Compliance check error: invalid player id '{player_id}'"
                ));
            }
        };

        let mut medical_notes = Vec::new();
        let (injuries, wellness, availability) =
            self.fetch_medical_status(player_id, &mut medical_notes).await;

        let restrictions = self.restrictions.derive_restrictions(&injuries);

        let substitutions: Vec<ExerciseSubstitution> = exercises
            .iter()
            .filter_map(|exercise| self.substitutions.resolve(exercise, &restrictions))
            .collect();

        let risk_alerts: Vec<InjuryRiskAlert> = self
            .risk
            .assess_pre_workout(player_id, &injuries, wellness.as_ref(), intensity)
            .into_iter()
            .collect();

        let mut load_recommendations = Vec::new();
        match self.load.calculate_load_management(player_id, BASELINE_LOAD).await {
            Ok(data) if data.load_reduction > 0.0 => load_recommendations.push(data),
            Ok(_) => {}
            Err(e) => {
                warn!("Load recommendation failed for {}: {}", player_id, e);
                medical_notes.push("Load recommendation unavailable".to_string());
            }
        }

        if let Some(availability) = &availability {
            if availability.medical_clearance_required {
                medical_notes
                    .push("Medical clearance required before full training".to_string());
            }
            if availability.availability_status == AvailabilityStatus::Injured {
                medical_notes.push("Player is currently listed as injured".to_string());
            }
        }

        let hard_stop = risk_alerts.iter().any(|a| a.immediate_action);
        let is_compliant = restrictions.is_empty() && !hard_stop;

        info!(
            "Compliance check for {}: compliant={}, {} restriction(s), {} substitution(s)",
            player_id,
            is_compliant,
            restrictions.len(),
            substitutions.len()
        );

        ComplianceCheckResult {
            is_compliant,
            restrictions,
            substitutions,
            risk_alerts,
            load_recommendations,
            medical_notes,
        }
    }

    /// Per-player fan-out of compliance checks. Each player's result is
    /// independent; there is nothing to fail wholesale.
    pub async fn check_batch_compliance(
        &self,
        player_ids: &[String],
        exercises: &[String],
        intensity: f64,
    ) -> HashMap<String, ComplianceCheckResult> {
        let futures = player_ids.iter().map(|player_id| {
            let service = self.clone();
            let player_id = player_id.clone();
            let exercises = exercises.to_vec();
            async move {
                let result = service
                    .check_workout_compliance(&player_id, &exercises, intensity)
                    .await;
                (player_id, result)
            }
        });
        join_all(futures).await.into_iter().collect()
    }

    /// Standalone pre-workout risk assessment, without the full
    /// restriction/substitution aggregation.
    pub async fn assess_workout_risk(
        &self,
        player_id: Uuid,
        intensity: f64,
    ) -> Option<InjuryRiskAlert> {
        let mut notes = Vec::new();
        let (injuries, wellness, _) = self.fetch_medical_status(player_id, &mut notes).await;
        self.risk
            .assess_pre_workout(player_id, &injuries, wellness.as_ref(), intensity)
    }

    /// Live risk assessment for an in-progress session.
    pub async fn assess_real_time_injury_risk(
        &self,
        player_id: Uuid,
        metrics: &RealTimeMetrics,
    ) -> Option<InjuryRiskAlert> {
        let mut notes = Vec::new();
        let (injuries, wellness, _) = self.fetch_medical_status(player_id, &mut notes).await;
        self.risk
            .assess_real_time(player_id, &injuries, wellness.as_ref(), metrics)
    }

    /// Current medical status with per-collaborator degradation: a store
    /// outage yields safe defaults (no injuries, no wellness) and a note,
    /// never an error.
    async fn fetch_medical_status(
        &self,
        player_id: Uuid,
        notes: &mut Vec<String>,
    ) -> (
        Vec<Injury>,
        Option<WellnessEntry>,
        Option<crate::models::PlayerAvailability>,
    ) {
        let injuries = match self.store.find_injuries_by_player(player_id).await {
            Ok(injuries) => injuries,
            Err(e) => {
                warn!("Injury lookup failed for {}: {}", player_id, e);
                notes.push("Injury records unavailable, no restrictions derived".to_string());
                Vec::new()
            }
        };
        let wellness = match self.store.find_latest_wellness(player_id).await {
            Ok(wellness) => wellness,
            Err(e) => {
                warn!("Wellness lookup failed for {}: {}", player_id, e);
                notes.push("Wellness data unavailable".to_string());
                None
            }
        };
        let availability = match self.store.find_current_availability(player_id).await {
            Ok(availability) => availability,
            Err(e) => {
                warn!("Availability lookup failed for {}: {}", player_id, e);
                None
            }
        };
        (injuries, wellness, availability)
    }
}
