use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RiskLevel;

/// Baseline training load every recommendation is computed against.
pub const BASELINE_LOAD: f64 = 100.0;

/// Hard floor for a load recommendation; below this the athlete should be
/// resting, not training on a reduced plan.
pub const MIN_RECOMMENDED_LOAD: f64 = 20.0;

/// Training-load recommendation for one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadManagementData {
    pub player_id: Uuid,
    pub baseline_load: f64,
    pub current_load: f64,
    /// Invariant: 20 <= recommended_load <= 100.
    pub recommended_load: f64,
    /// Total percentage reduction applied against the baseline.
    pub load_reduction: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
    /// How long the reduced load should be held before reassessment.
    pub duration_days: u32,
    pub last_updated: DateTime<Utc>,
}

/// One load-compliance observation: did the athlete stay within tolerance
/// of the planned session load?
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTrend {
    pub player_id: Uuid,
    pub date: NaiveDate,
    pub load: f64,
    pub compliance: bool,
    pub notes: Option<String>,
}

/// Mid-session load adjustment. The adjustment is always negative; "no
/// change needed" is expressed as `Option::None` at the call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadAdjustment {
    pub player_id: Uuid,
    /// Percentage points to cut from the remaining session, always < 0.
    pub recommended_adjustment: f64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}
