use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    BodyRegion, Injury, InjuryRiskAlert, RealTimeMetrics, RiskLevel, WellnessEntry,
};

/// Accumulates risk factors with monotone level escalation. The level can
/// only ever go up within one evaluation.
struct RiskBuilder {
    level: RiskLevel,
    risk_factors: Vec<String>,
    recommendations: Vec<String>,
    immediate_action: bool,
}

impl RiskBuilder {
    fn new() -> Self {
        Self {
            level: RiskLevel::Low,
            risk_factors: Vec::new(),
            recommendations: Vec::new(),
            immediate_action: false,
        }
    }

    fn raise_to(&mut self, level: RiskLevel, factor: String, recommendation: &str) {
        self.level = self.level.escalate(level);
        self.risk_factors.push(factor);
        self.recommendations.push(recommendation.to_string());
    }

    fn step_up(&mut self, factor: String, recommendation: &str) {
        self.level = self.level.step_up();
        self.risk_factors.push(factor);
        self.recommendations.push(recommendation.to_string());
    }

    /// No factor fired means no alert, not a "low" record.
    fn finish(self, player_id: Uuid) -> Option<InjuryRiskAlert> {
        if self.risk_factors.is_empty() {
            return None;
        }
        Some(InjuryRiskAlert {
            player_id,
            risk_level: self.level,
            risk_factors: self.risk_factors,
            recommendations: self.recommendations,
            immediate_action: self.immediate_action,
            timestamp: Utc::now(),
        })
    }
}

/// Deterministic injury-risk scorer with pre-workout and real-time entry
/// points sharing one escalation model.
#[derive(Clone, Default)]
pub struct RiskService;

impl RiskService {
    pub fn new() -> Self {
        Self
    }

    /// Score a planned workout before it starts.
    pub fn assess_pre_workout(
        &self,
        player_id: Uuid,
        injuries: &[Injury],
        wellness: Option<&WellnessEntry>,
        intensity: f64,
    ) -> Option<InjuryRiskAlert> {
        let mut builder = RiskBuilder::new();

        for injury in injuries.iter().filter(|i| i.is_active()) {
            builder.raise_to(
                RiskLevel::Medium,
                format!(
                    "Active injury: {} ({}), severity {}",
                    injury.body_part, injury.injury_type, injury.severity_level
                ),
                "Apply the derived exercise restrictions for this session",
            );
        }

        if intensity >= 90.0 {
            builder.step_up(
                format!("High planned workout intensity ({intensity:.0}%)"),
                "Add extended warm-up and monitor closely",
            );
        }

        if let Some(wellness) = wellness {
            if wellness.stress_level > 8 {
                builder.raise_to(
                    RiskLevel::High,
                    format!("Elevated stress level ({}/10)", wellness.stress_level),
                    "Reduce session intensity and complexity",
                );
            }
            if wellness.soreness_level > 8 {
                builder.raise_to(
                    RiskLevel::High,
                    format!("Severe muscle soreness ({}/10)", wellness.soreness_level),
                    "Substitute a recovery session",
                );
            }
        }

        builder.finish(player_id)
    }

    /// Score live workout telemetry. The only unconditional hard stop is a
    /// heart rate above 95% of the player's max.
    pub fn assess_real_time(
        &self,
        player_id: Uuid,
        injuries: &[Injury],
        wellness: Option<&WellnessEntry>,
        metrics: &RealTimeMetrics,
    ) -> Option<InjuryRiskAlert> {
        let mut builder = RiskBuilder::new();

        if let Some(rpe) = metrics.rpe {
            if rpe > 8.0 {
                builder.raise_to(
                    RiskLevel::High,
                    format!("RPE {rpe:.1} exceeds 8"),
                    "Back off intensity for the rest of the session",
                );
            }
        }

        if let (Some(hr), Some(max_hr)) = (
            metrics.heart_rate,
            wellness.and_then(|w| w.max_heart_rate),
        ) {
            if max_hr > 0 {
                let ratio = f64::from(hr) / f64::from(max_hr);
                if ratio > 0.95 {
                    builder.raise_to(
                        RiskLevel::Critical,
                        format!("Heart rate at {:.0}% of max", ratio * 100.0),
                        "Stop the session immediately",
                    );
                    builder.immediate_action = true;
                    warn!(
                        "Hard safety stop for player {}: HR {} of max {}",
                        player_id, hr, max_hr
                    );
                } else if ratio > 0.90 {
                    builder.raise_to(
                        RiskLevel::High,
                        format!("Heart rate at {:.0}% of max", ratio * 100.0),
                        "Drop below threshold intensity now",
                    );
                }
            }
        }

        let stressed_regions = metrics
            .activity
            .as_deref()
            .map(Self::stressed_regions)
            .unwrap_or_default();

        for injury in injuries.iter().filter(|i| i.is_active()) {
            if injury.severity_level >= 4 {
                builder.raise_to(
                    RiskLevel::High,
                    format!(
                        "Severe active injury: {} (severity {})",
                        injury.body_part, injury.severity_level
                    ),
                    "Confirm this session was medically approved",
                );
            }
            if let Some(region) = BodyRegion::normalize(&injury.body_part) {
                if stressed_regions.contains(&region) {
                    builder.raise_to(
                        RiskLevel::Medium,
                        format!(
                            "Activity stresses the injured {}",
                            injury.body_part.to_lowercase()
                        ),
                        "Switch to an activity that unloads the injured area",
                    );
                }
            }
        }

        if let Some(wellness) = wellness {
            if wellness.sleep_hours < 6.0 {
                builder.raise_to(
                    RiskLevel::Medium,
                    format!("Short sleep ({:.1}h)", wellness.sleep_hours),
                    "Keep the session aerobic",
                );
            }
            if wellness.stress_level > 8 {
                builder.raise_to(
                    RiskLevel::Medium,
                    format!("Elevated stress level ({}/10)", wellness.stress_level),
                    "Reduce session complexity",
                );
            }
            if wellness.soreness_level > 8 {
                builder.raise_to(
                    RiskLevel::Medium,
                    format!("Severe muscle soreness ({}/10)", wellness.soreness_level),
                    "Lower volume and avoid eccentric loading",
                );
            }
        }

        builder.finish(player_id)
    }

    /// Body regions a live activity stresses, inferred from its name.
    fn stressed_regions(activity: &str) -> Vec<BodyRegion> {
        let activity = activity.to_lowercase();
        let mut regions = Vec::new();
        if ["run", "jog", "sprint", "jump"]
            .iter()
            .any(|kw| activity.contains(kw))
        {
            regions.push(BodyRegion::Knee);
            regions.push(BodyRegion::Ankle);
        }
        if ["overhead", "throw", "serve"]
            .iter()
            .any(|kw| activity.contains(kw))
        {
            regions.push(BodyRegion::Shoulder);
        }
        if ["lift", "row", "deadlift", "squat"]
            .iter()
            .any(|kw| activity.contains(kw))
        {
            regions.push(BodyRegion::Spine);
        }
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecoveryStatus;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn create_test_injury(body_part: &str, severity: u8) -> Injury {
        Injury {
            id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            body_part: body_part.to_string(),
            injury_type: "strain".to_string(),
            severity_level: severity,
            recovery_status: RecoveryStatus::Active,
            injury_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            expected_return_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_test_wellness(sleep: f64, stress: u8, soreness: u8, max_hr: Option<u16>) -> WellnessEntry {
        WellnessEntry {
            player_id: Uuid::new_v4(),
            entry_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            sleep_hours: sleep,
            stress_level: stress,
            soreness_level: soreness,
            energy_level: 7,
            hydration_level: 7,
            max_heart_rate: max_hr,
        }
    }

    #[test]
    fn test_no_factors_no_alert() {
        let service = RiskService::new();
        let wellness = create_test_wellness(8.0, 3, 3, Some(195));

        let alert = service.assess_pre_workout(Uuid::new_v4(), &[], Some(&wellness), 70.0);
        assert!(alert.is_none());
    }

    #[test]
    fn test_active_injury_is_at_least_medium() {
        let service = RiskService::new();
        let injuries = vec![create_test_injury("knee", 2)];

        let alert = service
            .assess_pre_workout(Uuid::new_v4(), &injuries, None, 50.0)
            .unwrap();
        assert!(alert.risk_level >= RiskLevel::Medium);
        assert!(!alert.immediate_action);
        assert!(alert.risk_factors[0].contains("Active injury"));
    }

    #[test]
    fn test_high_intensity_escalates_one_level() {
        let service = RiskService::new();
        let injuries = vec![create_test_injury("knee", 2)];

        let base = service
            .assess_pre_workout(Uuid::new_v4(), &injuries, None, 50.0)
            .unwrap();
        let escalated = service
            .assess_pre_workout(Uuid::new_v4(), &injuries, None, 95.0)
            .unwrap();
        assert_eq!(base.risk_level, RiskLevel::Medium);
        assert_eq!(escalated.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_extreme_soreness_is_high() {
        let service = RiskService::new();
        let wellness = create_test_wellness(8.0, 4, 9, None);

        let alert = service
            .assess_pre_workout(Uuid::new_v4(), &[], Some(&wellness), 60.0)
            .unwrap();
        assert_eq!(alert.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_heart_rate_above_95_pct_is_critical_hard_stop() {
        let service = RiskService::new();
        let wellness = create_test_wellness(8.0, 3, 3, Some(200));
        let metrics = RealTimeMetrics {
            heart_rate: Some(198),
            ..Default::default()
        };

        let alert = service
            .assess_real_time(Uuid::new_v4(), &[], Some(&wellness), &metrics)
            .unwrap();
        assert_eq!(alert.risk_level, RiskLevel::Critical);
        assert!(alert.immediate_action);
    }

    #[test]
    fn test_heart_rate_above_90_pct_is_high_without_hard_stop() {
        let service = RiskService::new();
        let wellness = create_test_wellness(8.0, 3, 3, Some(200));
        let metrics = RealTimeMetrics {
            heart_rate: Some(184), // 92%
            ..Default::default()
        };

        let alert = service
            .assess_real_time(Uuid::new_v4(), &[], Some(&wellness), &metrics)
            .unwrap();
        assert_eq!(alert.risk_level, RiskLevel::High);
        assert!(!alert.immediate_action);
    }

    #[test]
    fn test_missing_max_heart_rate_skips_ratio_checks() {
        let service = RiskService::new();
        let wellness = create_test_wellness(8.0, 3, 3, None);
        let metrics = RealTimeMetrics {
            heart_rate: Some(198),
            ..Default::default()
        };

        let alert = service.assess_real_time(Uuid::new_v4(), &[], Some(&wellness), &metrics);
        assert!(alert.is_none());
    }

    #[test]
    fn test_high_rpe_is_high() {
        let service = RiskService::new();
        let metrics = RealTimeMetrics {
            rpe: Some(9.0),
            ..Default::default()
        };

        let alert = service
            .assess_real_time(Uuid::new_v4(), &[], None, &metrics)
            .unwrap();
        assert_eq!(alert.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_running_stresses_injured_knee() {
        let service = RiskService::new();
        let injuries = vec![create_test_injury("knee", 2)];
        let metrics = RealTimeMetrics {
            activity: Some("interval running".to_string()),
            ..Default::default()
        };

        let alert = service
            .assess_real_time(Uuid::new_v4(), &injuries, None, &metrics)
            .unwrap();
        assert_eq!(alert.risk_level, RiskLevel::Medium);
        assert!(alert
            .risk_factors
            .iter()
            .any(|f| f.contains("stresses the injured knee")));
    }

    #[test]
    fn test_severe_injury_escalates_to_high_in_real_time() {
        let service = RiskService::new();
        let injuries = vec![create_test_injury("shoulder", 4)];
        let metrics = RealTimeMetrics::default();

        let alert = service
            .assess_real_time(Uuid::new_v4(), &injuries, None, &metrics)
            .unwrap();
        assert_eq!(alert.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_escalation_never_lowers_level() {
        let service = RiskService::new();
        // Critical HR factor plus several medium factors: level must stay
        // critical no matter the evaluation order.
        let wellness = create_test_wellness(4.0, 9, 9, Some(200));
        let injuries = vec![create_test_injury("knee", 2)];
        let metrics = RealTimeMetrics {
            heart_rate: Some(199),
            rpe: Some(9.5),
            activity: Some("running".to_string()),
            ..Default::default()
        };

        let alert = service
            .assess_real_time(Uuid::new_v4(), &injuries, Some(&wellness), &metrics)
            .unwrap();
        assert_eq!(alert.risk_level, RiskLevel::Critical);
        assert!(alert.risk_factors.len() >= 5);
    }
}
