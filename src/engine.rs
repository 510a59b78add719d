use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::MedicalCache;
use crate::config::EngineConfig;
use crate::error::ComplianceError;
use crate::models::{
    AdherenceAlert, AdherenceEntry, AdherenceMetrics, ClearanceAssessment,
    ClearanceAssessmentData, ClearanceLevel, InjuryRiskAlert, LoadAdjustment, LoadManagementData,
    LoadTrend, RealTimeMetrics, RecoveryAnalysis, RecoveryMilestone, RecoveryPhase,
    ReturnToPlayDecision, ReturnToPlayProtocol,
};
use crate::services::{
    ClearanceService, ComplianceCheckResult, ComplianceService, LoadService, RecoveryService,
};
use crate::store::MedicalRecordStore;

/// Facade over the whole decision engine: one construction point wiring
/// every service to a shared store and cache. The routing layer consumes
/// this surface; individual services remain usable directly.
#[derive(Clone)]
pub struct ComplianceEngine {
    compliance: ComplianceService,
    load: LoadService,
    recovery: RecoveryService,
    clearance: ClearanceService,
}

impl ComplianceEngine {
    pub fn new(
        store: Arc<dyn MedicalRecordStore>,
        cache: Arc<dyn MedicalCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            compliance: ComplianceService::new(store.clone(), cache.clone(), config.clone()),
            load: LoadService::new(store.clone(), cache.clone(), config.clone()),
            recovery: RecoveryService::new(store.clone(), cache, config),
            clearance: ClearanceService::new(store),
        }
    }

    // Compliance checks

    pub async fn check_workout_compliance(
        &self,
        player_id: &str,
        exercises: &[String],
        intensity: f64,
    ) -> ComplianceCheckResult {
        self.compliance
            .check_workout_compliance(player_id, exercises, intensity)
            .await
    }

    pub async fn check_batch_compliance(
        &self,
        player_ids: &[String],
        exercises: &[String],
        intensity: f64,
    ) -> HashMap<String, ComplianceCheckResult> {
        self.compliance
            .check_batch_compliance(player_ids, exercises, intensity)
            .await
    }

    pub async fn assess_workout_risk(
        &self,
        player_id: Uuid,
        intensity: f64,
    ) -> Option<InjuryRiskAlert> {
        self.compliance.assess_workout_risk(player_id, intensity).await
    }

    pub async fn assess_real_time_injury_risk(
        &self,
        player_id: Uuid,
        metrics: &RealTimeMetrics,
    ) -> Option<InjuryRiskAlert> {
        self.compliance
            .assess_real_time_injury_risk(player_id, metrics)
            .await
    }

    // Load management

    pub async fn calculate_load_management(
        &self,
        player_id: Uuid,
        current_load: f64,
    ) -> anyhow::Result<LoadManagementData> {
        self.load.calculate_load_management(player_id, current_load).await
    }

    pub async fn calculate_batch_load_management(
        &self,
        requests: &[(Uuid, f64)],
    ) -> HashMap<Uuid, LoadManagementData> {
        self.load.calculate_batch_load_management(requests).await
    }

    pub async fn record_load_compliance(
        &self,
        player_id: Uuid,
        planned: f64,
        actual: f64,
        date: Option<NaiveDate>,
        notes: Option<String>,
    ) {
        self.load
            .record_load_compliance(player_id, planned, actual, date, notes)
            .await;
    }

    pub async fn get_load_trends(&self, player_id: Uuid, days: i64) -> Vec<LoadTrend> {
        self.load.get_load_trends(player_id, days).await
    }

    pub async fn update_real_time_load(
        &self,
        player_id: Uuid,
        metrics: &RealTimeMetrics,
    ) -> anyhow::Result<Option<LoadAdjustment>> {
        self.load.update_real_time_load(player_id, metrics).await
    }

    // Recovery protocol

    pub async fn initialize_recovery_protocol(
        &self,
        injury_id: Uuid,
        protocol_type: &str,
        custom_milestones: Option<Vec<String>>,
    ) -> Result<Vec<RecoveryMilestone>, ComplianceError> {
        self.recovery
            .initialize_recovery_protocol(injury_id, protocol_type, custom_milestones)
            .await
    }

    pub async fn record_adherence(
        &self,
        injury_id: Uuid,
        entry: AdherenceEntry,
    ) -> Result<(), ComplianceError> {
        self.recovery.record_adherence(injury_id, entry).await
    }

    pub async fn complete_milestone(
        &self,
        injury_id: Uuid,
        milestone_name: &str,
    ) -> Result<(), ComplianceError> {
        self.recovery.complete_milestone(injury_id, milestone_name).await
    }

    pub async fn calculate_adherence_metrics(
        &self,
        injury_id: Uuid,
    ) -> Result<AdherenceMetrics, ComplianceError> {
        self.recovery.calculate_adherence_metrics(injury_id).await
    }

    pub async fn generate_adherence_alerts(
        &self,
        injury_id: Uuid,
    ) -> Result<Vec<AdherenceAlert>, ComplianceError> {
        self.recovery.generate_adherence_alerts(injury_id).await
    }

    pub async fn get_recovery_analysis(
        &self,
        injury_id: Uuid,
    ) -> Result<RecoveryAnalysis, ComplianceError> {
        self.recovery.get_recovery_analysis(injury_id).await
    }

    // Return-to-play workflow

    pub async fn initiate_protocol(
        &self,
        player_id: Uuid,
        injury_id: Uuid,
    ) -> Result<ReturnToPlayProtocol, ComplianceError> {
        self.clearance.initiate_protocol(player_id, injury_id).await
    }

    pub async fn advance_phase(
        &self,
        protocol_id: Uuid,
        new_phase: RecoveryPhase,
        assessment_score: f64,
        officer: &str,
        notes: Option<String>,
    ) -> Result<ReturnToPlayProtocol, ComplianceError> {
        self.clearance
            .advance_phase(protocol_id, new_phase, assessment_score, officer, notes)
            .await
    }

    pub async fn conduct_clearance_assessment(
        &self,
        protocol_id: Uuid,
        data: &ClearanceAssessmentData,
    ) -> Result<ClearanceAssessment, ComplianceError> {
        self.clearance.conduct_clearance_assessment(protocol_id, data).await
    }

    pub async fn process_automated_clearance(
        &self,
        protocol_id: Uuid,
        level: ClearanceLevel,
        conditions: Option<Vec<String>>,
    ) -> Result<ReturnToPlayDecision, ComplianceError> {
        self.clearance
            .process_automated_clearance(protocol_id, level, conditions)
            .await
    }

    pub async fn get_protocol(
        &self,
        protocol_id: Uuid,
    ) -> Result<ReturnToPlayProtocol, ComplianceError> {
        self.clearance.get_protocol(protocol_id).await
    }
}
