use crate::models::{ExerciseRestriction, ExerciseSubstitution, RestrictionType};

/// One row of the static substitution table.
#[derive(Debug, Clone)]
struct SubstitutionEntry {
    /// Keyword matched against the lowercased exercise name. Multi-word
    /// keywords sit earlier in the table so "overhead press" wins over
    /// the bare "press" family match.
    keyword: &'static str,
    substitute: &'static str,
    modifications: &'static [&'static str],
    reason: &'static str,
    regression_level: u8,
}

const SUBSTITUTION_TABLE: &[SubstitutionEntry] = &[
    SubstitutionEntry {
        keyword: "deadlift",
        substitute: "glute bridge",
        modifications: &["hip hinge from the floor", "light load only"],
        reason: "Removes axial spine loading while keeping the hip hinge",
        regression_level: 3,
    },
    SubstitutionEntry {
        keyword: "bench press",
        substitute: "floor press",
        modifications: &["neutral-grip dumbbells", "pause at the floor"],
        reason: "Limits shoulder extension range at the bottom",
        regression_level: 2,
    },
    SubstitutionEntry {
        keyword: "overhead press",
        substitute: "landmine press",
        modifications: &["keep the press below shoulder height", "single arm"],
        reason: "Avoids end-range overhead positions",
        regression_level: 2,
    },
    SubstitutionEntry {
        keyword: "squat",
        substitute: "leg press (limited range)",
        modifications: &["limit depth above parallel", "50% of working load"],
        reason: "Reduces knee flexion demand under load",
        regression_level: 2,
    },
    SubstitutionEntry {
        keyword: "running",
        substitute: "stationary bike",
        modifications: &["low resistance", "cap heart rate at zone 2"],
        reason: "Keeps aerobic stimulus without ground impact",
        regression_level: 3,
    },
    SubstitutionEntry {
        keyword: "jumping",
        substitute: "low box step-up",
        modifications: &["controlled tempo", "no flight phase"],
        reason: "Removes landing forces entirely",
        regression_level: 4,
    },
    SubstitutionEntry {
        keyword: "jump",
        substitute: "low box step-up",
        modifications: &["controlled tempo", "no flight phase"],
        reason: "Removes landing forces entirely",
        regression_level: 4,
    },
];

/// Resolves restricted exercises to safer substitutes.
#[derive(Clone, Default)]
pub struct SubstitutionService;

impl SubstitutionService {
    pub fn new() -> Self {
        Self
    }

    /// Restrictions that affect the given exercise: either the exercise
    /// name carries a keyword of the restriction's movement family, or it
    /// textually names the restricted body part.
    pub fn applicable_restrictions<'a>(
        &self,
        exercise: &str,
        restrictions: &'a [ExerciseRestriction],
    ) -> Vec<&'a ExerciseRestriction> {
        let name = exercise.to_lowercase();
        restrictions
            .iter()
            .filter(|restriction| {
                restriction
                    .movement_pattern
                    .keywords()
                    .iter()
                    .any(|kw| name.contains(kw))
                    || name.contains(&restriction.body_part)
            })
            .collect()
    }

    /// Substitute for one restricted exercise, or None when no restriction
    /// applies to it.
    pub fn resolve(
        &self,
        exercise: &str,
        restrictions: &[ExerciseRestriction],
    ) -> Option<ExerciseSubstitution> {
        let applicable = self.applicable_restrictions(exercise, restrictions);
        let first = applicable.first()?;

        let name = exercise.to_lowercase();
        if let Some(entry) = SUBSTITUTION_TABLE.iter().find(|e| name.contains(e.keyword)) {
            return Some(ExerciseSubstitution {
                original_exercise: exercise.to_string(),
                substitute_exercise: entry.substitute.to_string(),
                modifications: entry.modifications.iter().map(|m| m.to_string()).collect(),
                reason: entry.reason.to_string(),
                regression_level: entry.regression_level,
            });
        }

        // No table entry: synthesize a generic substitution from the first
        // applicable restriction.
        Some(ExerciseSubstitution {
            original_exercise: exercise.to_string(),
            substitute_exercise: format!("{exercise} (modified)"),
            modifications: vec![
                format!(
                    "Reduce intensity to at most {}% of normal",
                    first.intensity_limit
                ),
                "Stop immediately on pain".to_string(),
            ],
            reason: first.reason.clone(),
            regression_level: match first.restriction_type {
                RestrictionType::Prohibited => 4,
                RestrictionType::Limited => 3,
                RestrictionType::Modified => 2,
            },
        })
    }
}
