use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{self, MedicalCache};
use crate::config::EngineConfig;
use crate::error::ComplianceError;
use crate::models::{
    AdherenceAlert, AdherenceAlertKind, AdherenceEntry, AdherenceEntryType, AdherenceMetrics,
    AlertSeverity, RecoveryAnalysis, RecoveryMilestone, RecoveryStatus,
};
use crate::store::MedicalRecordStore;

/// Static milestone blueprint for one protocol step.
struct MilestoneTemplate {
    name: &'static str,
    prerequisites: &'static [&'static str],
    exercises: &'static [&'static str],
    assessments: &'static [&'static str],
}

const KNEE_TEMPLATE: &[MilestoneTemplate] = &[
    MilestoneTemplate {
        name: "Pain and swelling controlled",
        prerequisites: &[],
        exercises: &["quad sets", "straight leg raise"],
        assessments: &["effusion grading"],
    },
    MilestoneTemplate {
        name: "Full range of motion",
        prerequisites: &["Pain and swelling controlled"],
        exercises: &["heel slides", "stationary bike (no resistance)"],
        assessments: &["goniometer ROM"],
    },
    MilestoneTemplate {
        name: "Baseline strength restored",
        prerequisites: &["Full range of motion"],
        exercises: &["leg press", "step-up"],
        assessments: &["isokinetic strength test"],
    },
    MilestoneTemplate {
        name: "Jogging without symptoms",
        prerequisites: &["Baseline strength restored"],
        exercises: &["treadmill jog intervals"],
        assessments: &["post-session pain and swelling check"],
    },
    MilestoneTemplate {
        name: "Sport-specific drills",
        prerequisites: &["Jogging without symptoms"],
        exercises: &["cutting drills", "plyometrics"],
        assessments: &["hop test battery"],
    },
    MilestoneTemplate {
        name: "Full training clearance",
        prerequisites: &["Sport-specific drills"],
        exercises: &[],
        assessments: &["strength symmetry", "hop symmetry"],
    },
];

const SHOULDER_TEMPLATE: &[MilestoneTemplate] = &[
    MilestoneTemplate {
        name: "Pain controlled at rest",
        prerequisites: &[],
        exercises: &["pendulum swings", "scapular retraction"],
        assessments: &["pain scale at rest"],
    },
    MilestoneTemplate {
        name: "Full passive range of motion",
        prerequisites: &["Pain controlled at rest"],
        exercises: &["wand-assisted elevation", "sleeper stretch"],
        assessments: &["goniometer ROM"],
    },
    MilestoneTemplate {
        name: "Rotator cuff strength restored",
        prerequisites: &["Full passive range of motion"],
        exercises: &["band external rotation", "scaption raises"],
        assessments: &["dynamometer strength test"],
    },
    MilestoneTemplate {
        name: "Overhead loading tolerated",
        prerequisites: &["Rotator cuff strength restored"],
        exercises: &["landmine press", "light overhead press"],
        assessments: &["overhead pain response"],
    },
    MilestoneTemplate {
        name: "Return to throwing program",
        prerequisites: &["Overhead loading tolerated"],
        exercises: &["interval throwing"],
        assessments: &["velocity and symptom tracking"],
    },
];

const ANKLE_TEMPLATE: &[MilestoneTemplate] = &[
    MilestoneTemplate {
        name: "Swelling controlled",
        prerequisites: &[],
        exercises: &["ankle pumps", "alphabet drills"],
        assessments: &["figure-eight girth measurement"],
    },
    MilestoneTemplate {
        name: "Full weight bearing",
        prerequisites: &["Swelling controlled"],
        exercises: &["calf raises", "weight shifts"],
        assessments: &["gait assessment"],
    },
    MilestoneTemplate {
        name: "Balance and strength restored",
        prerequisites: &["Full weight bearing"],
        exercises: &["single-leg balance", "band inversion/eversion"],
        assessments: &["Y-balance test"],
    },
    MilestoneTemplate {
        name: "Running and cutting",
        prerequisites: &["Balance and strength restored"],
        exercises: &["run progressions", "lateral shuffles"],
        assessments: &["agility T-test"],
    },
];

const HAMSTRING_TEMPLATE: &[MilestoneTemplate] = &[
    MilestoneTemplate {
        name: "Pain-free walking",
        prerequisites: &[],
        exercises: &["isometric holds"],
        assessments: &["palpation and stretch tolerance"],
    },
    MilestoneTemplate {
        name: "Eccentric loading tolerated",
        prerequisites: &["Pain-free walking"],
        exercises: &["nordic curls (assisted)", "romanian deadlift (light)"],
        assessments: &["single-leg bridge test"],
    },
    MilestoneTemplate {
        name: "Sprint progression",
        prerequisites: &["Eccentric loading tolerated"],
        exercises: &["strides", "acceleration runs"],
        assessments: &["sprint mechanics review"],
    },
    MilestoneTemplate {
        name: "Full speed reached",
        prerequisites: &["Sprint progression"],
        exercises: &["max velocity runs"],
        assessments: &["GPS top-speed comparison"],
    },
];

const DEFAULT_TEMPLATE: &[MilestoneTemplate] = &[
    MilestoneTemplate {
        name: "Acute symptoms resolved",
        prerequisites: &[],
        exercises: &["range of motion work"],
        assessments: &["symptom review"],
    },
    MilestoneTemplate {
        name: "Function restored",
        prerequisites: &["Acute symptoms resolved"],
        exercises: &["progressive loading"],
        assessments: &["functional testing"],
    },
    MilestoneTemplate {
        name: "Return to full training",
        prerequisites: &["Function restored"],
        exercises: &[],
        assessments: &["training load tolerance"],
    },
];

fn protocol_template(protocol_type: &str) -> &'static [MilestoneTemplate] {
    match protocol_type.trim().to_lowercase().as_str() {
        "knee_injury" => KNEE_TEMPLATE,
        "shoulder_injury" => SHOULDER_TEMPLATE,
        "ankle_sprain" => ANKLE_TEMPLATE,
        "hamstring_strain" => HAMSTRING_TEMPLATE,
        // Unrecognized protocol types fall back to the generic 3-step plan.
        _ => DEFAULT_TEMPLATE,
    }
}

/// Owns the per-injury recovery protocol state: the ordered milestone
/// list, the adherence log, and the derived metrics/alerts. Completing
/// the final milestone transitions the owning injury to Recovered and
/// discards the protocol state.
#[derive(Clone)]
pub struct RecoveryService {
    store: Arc<dyn MedicalRecordStore>,
    cache: Arc<dyn MedicalCache>,
    config: EngineConfig,
    milestones: Arc<RwLock<HashMap<Uuid, Vec<RecoveryMilestone>>>>,
    adherence: Arc<RwLock<HashMap<Uuid, Vec<AdherenceEntry>>>>,
}

impl RecoveryService {
    pub fn new(
        store: Arc<dyn MedicalRecordStore>,
        cache: Arc<dyn MedicalCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            cache,
            config,
            milestones: Arc::new(RwLock::new(HashMap::new())),
            adherence: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Build the milestone sequence for an injury. Milestone targets are
    /// spaced by (1 + severity/5) weeks from the injury date, so more
    /// severe injuries get longer runways.
    pub async fn initialize_recovery_protocol(
        &self,
        injury_id: Uuid,
        protocol_type: &str,
        custom_milestones: Option<Vec<String>>,
    ) -> Result<Vec<RecoveryMilestone>, ComplianceError> {
        let injury = self
            .store
            .find_injury(injury_id)
            .await
            .map_err(ComplianceError::Internal)?
            .ok_or(ComplianceError::InjuryNotFound(injury_id))?;

        let spacing_days =
            7.0 * (1.0 + f64::from(injury.severity_level) / 5.0);

        let milestones: Vec<RecoveryMilestone> = match custom_milestones {
            Some(names) => names
                .into_iter()
                .enumerate()
                .map(|(i, name)| RecoveryMilestone {
                    id: Uuid::new_v4(),
                    name,
                    target_date: injury.injury_date
                        + Duration::days((spacing_days * (i as f64 + 1.0)).round() as i64),
                    completed_date: None,
                    is_completed: false,
                    prerequisites: Vec::new(),
                    exercises: Vec::new(),
                    assessments: Vec::new(),
                })
                .collect(),
            None => protocol_template(protocol_type)
                .iter()
                .enumerate()
                .map(|(i, template)| RecoveryMilestone {
                    id: Uuid::new_v4(),
                    name: template.name.to_string(),
                    target_date: injury.injury_date
                        + Duration::days((spacing_days * (i as f64 + 1.0)).round() as i64),
                    completed_date: None,
                    is_completed: false,
                    prerequisites: template
                        .prerequisites
                        .iter()
                        .map(|p| p.to_string())
                        .collect(),
                    exercises: template.exercises.iter().map(|e| e.to_string()).collect(),
                    assessments: template
                        .assessments
                        .iter()
                        .map(|a| a.to_string())
                        .collect(),
                })
                .collect(),
        };

        info!(
            "Initialized {} protocol for injury {} with {} milestones",
            protocol_type,
            injury_id,
            milestones.len()
        );

        let mut state = self.milestones.write().await;
        state.insert(injury_id, milestones.clone());
        Ok(milestones)
    }

    /// Log a recovery activity. A completed milestone-type entry also
    /// completes the named milestone.
    pub async fn record_adherence(
        &self,
        injury_id: Uuid,
        entry: AdherenceEntry,
    ) -> Result<(), ComplianceError> {
        {
            let milestones = self.milestones.read().await;
            if !milestones.contains_key(&injury_id) {
                return Err(ComplianceError::ProtocolNotFound(injury_id));
            }
        }

        let is_milestone_completion =
            entry.entry_type == AdherenceEntryType::Milestone && entry.completed;
        let activity = entry.activity.clone();

        let cutoff =
            Utc::now().date_naive() - Duration::days(self.config.adherence_retention_days);
        {
            let mut adherence = self.adherence.write().await;
            let log = adherence.entry(injury_id).or_default();
            log.push(entry);
            log.retain(|e| e.date >= cutoff);
        }
        self.invalidate_metrics_cache(injury_id).await;

        if is_milestone_completion {
            self.complete_milestone(injury_id, &activity).await?;
        }
        Ok(())
    }

    /// Complete a milestone by name. Idempotent: completing an
    /// already-completed milestone (or any milestone of an already
    /// recovered injury) is a no-op. Completing the final pending
    /// milestone transitions the injury to Recovered and discards the
    /// protocol state.
    pub async fn complete_milestone(
        &self,
        injury_id: Uuid,
        milestone_name: &str,
    ) -> Result<(), ComplianceError> {
        let all_completed = {
            let mut state = self.milestones.write().await;
            let milestones = match state.get_mut(&injury_id) {
                Some(milestones) => milestones,
                None => {
                    // The protocol state is discarded on completion, so a
                    // repeat call lands here; treat it as the idempotent
                    // no-op when the injury already recovered.
                    if let Ok(Some(injury)) = self.store.find_injury(injury_id).await {
                        if injury.recovery_status == RecoveryStatus::Recovered {
                            return Ok(());
                        }
                    }
                    return Err(ComplianceError::ProtocolNotFound(injury_id));
                }
            };

            let milestone = milestones
                .iter_mut()
                .find(|m| m.name.eq_ignore_ascii_case(milestone_name))
                .ok_or_else(|| ComplianceError::MilestoneNotFound {
                    injury_id,
                    name: milestone_name.to_string(),
                })?;

            if milestone.is_completed {
                return Ok(());
            }
            milestone.is_completed = true;
            milestone.completed_date = Some(Utc::now());
            info!("Milestone '{}' completed for injury {}", milestone_name, injury_id);

            milestones.iter().all(|m| m.is_completed)
        };

        if all_completed {
            self.finish_protocol(injury_id).await;
        } else {
            self.invalidate_metrics_cache(injury_id).await;
        }
        Ok(())
    }

    /// Terminal cleanup: mark the injury recovered and drop the protocol
    /// state. A store outage here is logged, not propagated; the state is
    /// still discarded so the completion cannot replay.
    async fn finish_protocol(&self, injury_id: Uuid) {
        match self.store.find_injury(injury_id).await {
            Ok(Some(mut injury)) => {
                injury.recovery_status = RecoveryStatus::Recovered;
                injury.updated_at = Utc::now();
                if let Err(e) = self.store.save_injury(&injury).await {
                    warn!("Failed to persist recovery for injury {}: {}", injury_id, e);
                } else {
                    info!("Injury {} marked recovered", injury_id);
                }
            }
            Ok(None) => warn!("Completed protocol for unknown injury {}", injury_id),
            Err(e) => warn!("Injury lookup failed during completion of {}: {}", injury_id, e),
        }

        let mut milestones = self.milestones.write().await;
        milestones.remove(&injury_id);
        drop(milestones);
        let mut adherence = self.adherence.write().await;
        adherence.remove(&injury_id);
        drop(adherence);
        self.invalidate_metrics_cache(injury_id).await;
    }

    /// Derived adherence aggregate over milestones and the last 30 days of
    /// logged entries. Cached with a short TTL.
    pub async fn calculate_adherence_metrics(
        &self,
        injury_id: Uuid,
    ) -> Result<AdherenceMetrics, ComplianceError> {
        let key = cache::cache_key("adherence", injury_id, &[]);
        if let Some(cached) = cache::get_json::<AdherenceMetrics>(self.cache.as_ref(), &key).await {
            return Ok(cached);
        }

        let metrics = self.compute_adherence_metrics(injury_id).await?;

        cache::set_json(
            self.cache.as_ref(),
            &key,
            &metrics,
            std::time::Duration::from_secs(self.config.adherence_cache_ttl_secs),
        )
        .await;
        Ok(metrics)
    }

    async fn compute_adherence_metrics(
        &self,
        injury_id: Uuid,
    ) -> Result<AdherenceMetrics, ComplianceError> {
        let milestones = {
            let state = self.milestones.read().await;
            state
                .get(&injury_id)
                .cloned()
                .ok_or(ComplianceError::ProtocolNotFound(injury_id))?
        };
        let entries = {
            let adherence = self.adherence.read().await;
            adherence.get(&injury_id).cloned().unwrap_or_default()
        };

        let completed = milestones.iter().filter(|m| m.is_completed).count();
        let milestone_completion = if milestones.is_empty() {
            100.0
        } else {
            completed as f64 / milestones.len() as f64 * 100.0
        };

        let window_start = Utc::now().date_naive() - Duration::days(30);
        let exercise_compliance =
            Self::type_compliance(&entries, AdherenceEntryType::Exercise, window_start);
        let assessment_compliance =
            Self::type_compliance(&entries, AdherenceEntryType::Assessment, window_start);

        let overall_compliance =
            (milestone_completion + exercise_compliance + assessment_compliance) / 3.0;

        let today = Utc::now().date_naive();
        let overdue = milestones.iter().filter(|m| m.is_overdue(today)).count();

        let mut risk_factors = Vec::new();
        let mut recommendations = Vec::new();
        if exercise_compliance < 70.0 {
            risk_factors.push("Low exercise compliance".to_string());
            recommendations
                .push("Review the exercise prescription with the athlete".to_string());
        }
        if assessment_compliance < 80.0 {
            risk_factors.push("Assessments being missed".to_string());
            recommendations.push("Schedule the outstanding assessments".to_string());
        }
        if overdue > 0 {
            risk_factors.push(format!("{overdue} milestone(s) overdue"));
            recommendations.push("Reassess the recovery timeline".to_string());
        }

        Ok(AdherenceMetrics {
            overall_compliance,
            milestone_completion,
            exercise_compliance,
            assessment_compliance,
            risk_factors,
            recommendations,
        })
    }

    /// Completion rate for one entry type inside the window. No entries in
    /// the window means no opportunity to fail, which scores 100.
    fn type_compliance(
        entries: &[AdherenceEntry],
        entry_type: AdherenceEntryType,
        window_start: chrono::NaiveDate,
    ) -> f64 {
        let in_window: Vec<&AdherenceEntry> = entries
            .iter()
            .filter(|e| e.entry_type == entry_type && e.date >= window_start)
            .collect();
        if in_window.is_empty() {
            return 100.0;
        }
        let completed = in_window.iter().filter(|e| e.completed).count();
        completed as f64 / in_window.len() as f64 * 100.0
    }

    /// Adherence alerts for one injury's protocol.
    pub async fn generate_adherence_alerts(
        &self,
        injury_id: Uuid,
    ) -> Result<Vec<AdherenceAlert>, ComplianceError> {
        let milestones = {
            let state = self.milestones.read().await;
            state
                .get(&injury_id)
                .cloned()
                .ok_or(ComplianceError::ProtocolNotFound(injury_id))?
        };
        let metrics = self.compute_adherence_metrics(injury_id).await?;

        let now = Utc::now();
        let today = now.date_naive();
        let mut alerts = Vec::new();

        for milestone in milestones.iter().filter(|m| m.is_overdue(today)) {
            let days_overdue = (today - milestone.target_date).num_days();
            let severity = if days_overdue > 7 {
                AlertSeverity::High
            } else if days_overdue > 3 {
                AlertSeverity::Medium
            } else {
                AlertSeverity::Low
            };
            alerts.push(AdherenceAlert {
                injury_id,
                kind: AdherenceAlertKind::MilestoneOverdue,
                severity,
                message: format!(
                    "Milestone '{}' is {} day(s) overdue",
                    milestone.name, days_overdue
                ),
                generated_at: now,
            });
        }

        if metrics.exercise_compliance < 70.0 {
            alerts.push(AdherenceAlert {
                injury_id,
                kind: AdherenceAlertKind::PoorCompliance,
                severity: if metrics.exercise_compliance < 50.0 {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                },
                message: format!(
                    "Exercise compliance at {:.0}% over the last 30 days",
                    metrics.exercise_compliance
                ),
                generated_at: now,
            });
        }

        if metrics.assessment_compliance < 80.0 {
            alerts.push(AdherenceAlert {
                injury_id,
                kind: AdherenceAlertKind::MissedAssessment,
                severity: AlertSeverity::Medium,
                message: format!(
                    "Assessment compliance at {:.0}% over the last 30 days",
                    metrics.assessment_compliance
                ),
                generated_at: now,
            });
        }

        if let Ok(Some(injury)) = self.store.find_injury(injury_id).await {
            if let Some(last) = milestones.last() {
                let expected = (last.target_date - injury.injury_date).num_days();
                let elapsed = (today - injury.injury_date).num_days();
                if expected > 0 && elapsed as f64 > expected as f64 * 1.5 {
                    alerts.push(AdherenceAlert {
                        injury_id,
                        kind: AdherenceAlertKind::ProtocolDeviation,
                        severity: AlertSeverity::High,
                        message: format!(
                            "Recovery running {elapsed} days against an expected {expected}"
                        ),
                        generated_at: now,
                    });
                }
            }
        }

        Ok(alerts)
    }

    /// Progress timeline for one injury's protocol.
    pub async fn get_recovery_analysis(
        &self,
        injury_id: Uuid,
    ) -> Result<RecoveryAnalysis, ComplianceError> {
        let injury = self
            .store
            .find_injury(injury_id)
            .await
            .map_err(ComplianceError::Internal)?
            .ok_or(ComplianceError::InjuryNotFound(injury_id))?;
        let milestones = {
            let state = self.milestones.read().await;
            state
                .get(&injury_id)
                .cloned()
                .ok_or(ComplianceError::ProtocolNotFound(injury_id))?
        };
        let metrics = self.compute_adherence_metrics(injury_id).await?;

        let today = Utc::now().date_naive();
        let completed = milestones.iter().filter(|m| m.is_completed).count();
        let next_milestone = milestones.iter().find(|m| !m.is_completed).cloned();
        let expected_duration_days = milestones
            .last()
            .map(|m| (m.target_date - injury.injury_date).num_days())
            .unwrap_or(0);
        let days_elapsed = (today - injury.injury_date).num_days();

        let behind_schedule = milestones
            .iter()
            .any(|m| m.is_overdue(today) && (today - m.target_date).num_days() > 3);
        let on_track = !behind_schedule
            && (expected_duration_days == 0
                || (days_elapsed as f64) <= expected_duration_days as f64 * 1.5);

        Ok(RecoveryAnalysis {
            injury_id,
            total_milestones: milestones.len(),
            completed_milestones: completed,
            next_milestone,
            days_elapsed,
            expected_duration_days,
            on_track,
            metrics,
        })
    }

    async fn invalidate_metrics_cache(&self, injury_id: Uuid) {
        let key = cache::cache_key("adherence", injury_id, &[]);
        self.cache.invalidate(&key).await;
    }
}
