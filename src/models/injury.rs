use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an injury record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    Active,
    Recovering,
    Recovered,
}

/// A diagnosed injury. Created externally on diagnosis; only its
/// recovery status is mutated afterwards, records are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Injury {
    pub id: Uuid,
    pub player_id: Uuid,
    pub body_part: String,
    pub injury_type: String,
    /// 1 (minor) to 5 (severe)
    pub severity_level: u8,
    pub recovery_status: RecoveryStatus,
    pub injury_date: NaiveDate,
    pub expected_return_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Injury {
    pub fn is_active(&self) -> bool {
        self.recovery_status == RecoveryStatus::Active
    }
}
