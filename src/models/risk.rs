use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Totally ordered risk level. Escalation always goes through
/// [`RiskLevel::escalate`] so a level can never be lowered within one
/// evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Monotone combinator: the result is never lower than either input.
    #[must_use]
    pub fn escalate(self, other: Self) -> Self {
        self.max(other)
    }

    /// The next level up, saturating at Critical.
    #[must_use]
    pub fn step_up(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }
}

/// Risk alert emitted by the scorer. Absence of risk is represented as
/// `Option::None` at the call sites, never as a "low" alert record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryRiskAlert {
    pub player_id: Uuid,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    /// True only on the hard-stop path (live HR above 95% of max).
    pub immediate_action: bool,
    pub timestamp: DateTime<Utc>,
}

/// Live workout telemetry consumed by the real-time scorer and the
/// real-time load adjuster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealTimeMetrics {
    pub heart_rate: Option<u16>,
    /// Rate of perceived exertion, 1-10.
    pub rpe: Option<f64>,
    pub pace_min_per_km: Option<f64>,
    pub power_watts: Option<f64>,
    pub duration_minutes: Option<f64>,
    /// Free-text activity name ("running", "overhead press", ...), used to
    /// infer which movement family the session stresses.
    pub activity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_escalate_is_monotone() {
        assert_eq!(RiskLevel::High.escalate(RiskLevel::Low), RiskLevel::High);
        assert_eq!(RiskLevel::Low.escalate(RiskLevel::High), RiskLevel::High);
        assert_eq!(
            RiskLevel::Critical.escalate(RiskLevel::Medium),
            RiskLevel::Critical
        );
    }

    #[test]
    fn test_step_up_saturates() {
        assert_eq!(RiskLevel::Low.step_up(), RiskLevel::Medium);
        assert_eq!(RiskLevel::High.step_up(), RiskLevel::Critical);
        assert_eq!(RiskLevel::Critical.step_up(), RiskLevel::Critical);
    }
}
