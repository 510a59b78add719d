use std::collections::HashMap;
use tracing::debug;

use crate::models::{
    BodyRegion, ExerciseRestriction, Injury, MovementPattern, RestrictionType,
};

/// Declarative restriction rule for one body region.
#[derive(Debug, Clone, Copy)]
struct RestrictionRule {
    /// Intensity-limit points removed per severity level.
    severity_step: u8,
    /// Lowest intensity limit the rule can produce.
    floor: u8,
    /// Severity at which the restriction becomes prohibitive.
    prohibition_threshold: u8,
    movement_pattern: MovementPattern,
}

/// Maps active injuries to exercise restrictions via a body-region rule
/// table. Unknown body parts never auto-restrict.
#[derive(Clone)]
pub struct RestrictionService {
    rules: HashMap<BodyRegion, RestrictionRule>,
}

impl Default for RestrictionService {
    fn default() -> Self {
        Self::new()
    }
}

impl RestrictionService {
    pub fn new() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            BodyRegion::Knee,
            RestrictionRule {
                severity_step: 20,
                floor: 20,
                prohibition_threshold: 4,
                movement_pattern: MovementPattern::KneeDominant,
            },
        );
        rules.insert(
            BodyRegion::Ankle,
            RestrictionRule {
                severity_step: 20,
                floor: 25,
                prohibition_threshold: 4,
                movement_pattern: MovementPattern::KneeDominant,
            },
        );
        rules.insert(
            BodyRegion::Shoulder,
            RestrictionRule {
                severity_step: 15,
                floor: 30,
                prohibition_threshold: 4,
                movement_pattern: MovementPattern::Overhead,
            },
        );
        rules.insert(
            BodyRegion::Spine,
            RestrictionRule {
                severity_step: 25,
                floor: 10,
                prohibition_threshold: 3,
                movement_pattern: MovementPattern::SpinalLoading,
            },
        );
        rules.insert(
            BodyRegion::Wrist,
            RestrictionRule {
                severity_step: 15,
                floor: 40,
                prohibition_threshold: 5,
                movement_pattern: MovementPattern::GripLoadBearing,
            },
        );
        rules.insert(
            BodyRegion::Hand,
            RestrictionRule {
                severity_step: 15,
                floor: 40,
                prohibition_threshold: 5,
                movement_pattern: MovementPattern::GripLoadBearing,
            },
        );

        Self { rules }
    }

    /// Union of restrictions over the active injuries in the input.
    pub fn derive_restrictions(&self, injuries: &[Injury]) -> Vec<ExerciseRestriction> {
        injuries
            .iter()
            .filter(|injury| injury.is_active())
            .filter_map(|injury| self.restriction_for(injury))
            .collect()
    }

    fn restriction_for(&self, injury: &Injury) -> Option<ExerciseRestriction> {
        let region = match BodyRegion::normalize(&injury.body_part) {
            Some(region) => region,
            None => {
                debug!(
                    "No restriction rule for body part '{}', skipping",
                    injury.body_part
                );
                return None;
            }
        };
        let rule = self.rules.get(&region)?;
        let severity = injury.severity_level.min(5);

        let raw_limit = 100i16 - i16::from(rule.severity_step) * i16::from(severity);
        let intensity_limit = raw_limit.max(i16::from(rule.floor)) as u8;

        let restriction_type = if severity >= rule.prohibition_threshold {
            RestrictionType::Prohibited
        } else if severity >= 2 {
            RestrictionType::Limited
        } else {
            RestrictionType::Modified
        };

        Some(ExerciseRestriction {
            movement_pattern: rule.movement_pattern,
            body_part: injury.body_part.to_lowercase(),
            intensity_limit,
            restriction_type,
            reason: format!(
                "Active {} injury ({}), severity {}",
                injury.body_part.to_lowercase(),
                injury.injury_type,
                severity
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecoveryStatus;
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn create_test_injury(body_part: &str, severity: u8, status: RecoveryStatus) -> Injury {
        Injury {
            id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            body_part: body_part.to_string(),
            injury_type: "strain".to_string(),
            severity_level: severity,
            recovery_status: status,
            injury_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            expected_return_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_knee_restriction_formula() {
        let service = RestrictionService::new();
        let injuries = vec![create_test_injury("knee", 3, RecoveryStatus::Active)];

        let restrictions = service.derive_restrictions(&injuries);
        assert_eq!(restrictions.len(), 1);
        assert_eq!(restrictions[0].intensity_limit, 40); // 100 - 3*20
        assert_eq!(restrictions[0].restriction_type, RestrictionType::Limited);
        assert_eq!(
            restrictions[0].movement_pattern,
            MovementPattern::KneeDominant
        );
    }

    #[test]
    fn test_knee_severity_4_is_prohibited() {
        let service = RestrictionService::new();
        let injuries = vec![create_test_injury("knee", 4, RecoveryStatus::Active)];

        let restrictions = service.derive_restrictions(&injuries);
        assert_eq!(
            restrictions[0].restriction_type,
            RestrictionType::Prohibited
        );
        assert_eq!(restrictions[0].intensity_limit, 20); // floor
    }

    #[test]
    fn test_acl_synonym_maps_to_knee() {
        let service = RestrictionService::new();
        let injuries = vec![create_test_injury("ACL", 2, RecoveryStatus::Active)];

        let restrictions = service.derive_restrictions(&injuries);
        assert_eq!(restrictions.len(), 1);
        assert_eq!(
            restrictions[0].movement_pattern,
            MovementPattern::KneeDominant
        );
        assert_eq!(restrictions[0].intensity_limit, 60);
    }

    #[test]
    fn test_rotator_cuff_maps_to_shoulder() {
        let service = RestrictionService::new();
        let injuries = vec![create_test_injury("Rotator Cuff", 3, RecoveryStatus::Active)];

        let restrictions = service.derive_restrictions(&injuries);
        assert_eq!(restrictions.len(), 1);
        assert_eq!(restrictions[0].movement_pattern, MovementPattern::Overhead);
        assert_eq!(restrictions[0].intensity_limit, 55); // 100 - 3*15
    }

    #[test]
    fn test_unknown_body_part_yields_no_restriction() {
        let service = RestrictionService::new();
        let injuries = vec![create_test_injury("eyebrow", 5, RecoveryStatus::Active)];

        assert!(service.derive_restrictions(&injuries).is_empty());
    }

    #[test]
    fn test_inactive_injuries_are_ignored() {
        let service = RestrictionService::new();
        let injuries = vec![
            create_test_injury("knee", 4, RecoveryStatus::Recovering),
            create_test_injury("ankle", 5, RecoveryStatus::Recovered),
        ];

        assert!(service.derive_restrictions(&injuries).is_empty());
    }

    #[test]
    fn test_union_over_multiple_injuries() {
        let service = RestrictionService::new();
        let injuries = vec![
            create_test_injury("knee", 2, RecoveryStatus::Active),
            create_test_injury("shoulder", 4, RecoveryStatus::Active),
            create_test_injury("eyebrow", 3, RecoveryStatus::Active),
        ];

        let restrictions = service.derive_restrictions(&injuries);
        assert_eq!(restrictions.len(), 2);
    }

    #[test]
    fn test_severity_1_is_modified() {
        let service = RestrictionService::new();
        let injuries = vec![create_test_injury("ankle", 1, RecoveryStatus::Active)];

        let restrictions = service.derive_restrictions(&injuries);
        assert_eq!(restrictions[0].restriction_type, RestrictionType::Modified);
        assert_eq!(restrictions[0].intensity_limit, 80);
    }

    proptest! {
        #[test]
        fn prop_back_restriction_formula(severity in 1u8..=5) {
            let service = RestrictionService::new();
            let injuries = vec![create_test_injury("back", severity, RecoveryStatus::Active)];

            let restrictions = service.derive_restrictions(&injuries);
            prop_assert_eq!(restrictions.len(), 1);

            let expected = (100i16 - 25 * i16::from(severity)).max(10) as u8;
            prop_assert_eq!(restrictions[0].intensity_limit, expected);

            let prohibited =
                restrictions[0].restriction_type == RestrictionType::Prohibited;
            prop_assert_eq!(prohibited, severity >= 3);
        }
    }
}
