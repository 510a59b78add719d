use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, dated recovery checkpoint. Completion is one-way: once a
/// milestone is completed it never reverts to pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryMilestone {
    pub id: Uuid,
    pub name: String,
    pub target_date: NaiveDate,
    pub completed_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub prerequisites: Vec<String>,
    pub exercises: Vec<String>,
    pub assessments: Vec<String>,
}

impl RecoveryMilestone {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.target_date < today
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherenceEntryType {
    Exercise,
    Assessment,
    Milestone,
    Appointment,
}

/// One logged recovery activity (prescribed exercise done, assessment
/// taken, milestone hit, appointment kept). Append-only per injury.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdherenceEntry {
    pub date: NaiveDate,
    pub activity: String,
    pub entry_type: AdherenceEntryType,
    pub completed: bool,
    pub notes: Option<String>,
    pub metrics: Option<serde_json::Value>,
}

/// Derived adherence aggregate. Pure function of milestones + entries +
/// injury dates; safe to cache and recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdherenceMetrics {
    pub overall_compliance: f64,
    pub milestone_completion: f64,
    pub exercise_compliance: f64,
    pub assessment_compliance: f64,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherenceAlertKind {
    MilestoneOverdue,
    PoorCompliance,
    MissedAssessment,
    ProtocolDeviation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdherenceAlert {
    pub injury_id: Uuid,
    pub kind: AdherenceAlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub generated_at: DateTime<Utc>,
}

/// Progress timeline for one injury's recovery protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryAnalysis {
    pub injury_id: Uuid,
    pub total_milestones: usize,
    pub completed_milestones: usize,
    pub next_milestone: Option<RecoveryMilestone>,
    pub days_elapsed: i64,
    pub expected_duration_days: i64,
    pub on_track: bool,
    pub metrics: AdherenceMetrics,
}
