use serde::{Deserialize, Serialize};

/// Canonical body regions the rule engine knows how to restrict.
///
/// Free-text body parts from injury records are normalized here, including
/// common clinical synonyms ("acl" is a knee structure, "rotator cuff" a
/// shoulder one). Unknown body parts normalize to None and never produce a
/// restriction on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    Knee,
    Ankle,
    Shoulder,
    Spine,
    Wrist,
    Hand,
}

impl BodyRegion {
    /// Normalize a free-text body part, case-insensitively, with synonyms.
    pub fn normalize(body_part: &str) -> Option<Self> {
        let part = body_part.trim().to_lowercase();
        match part.as_str() {
            "knee" | "acl" | "mcl" | "pcl" | "meniscus" | "patella" => Some(Self::Knee),
            "ankle" | "achilles" | "calf" => Some(Self::Ankle),
            "shoulder" | "rotator cuff" | "labrum" | "ac joint" => Some(Self::Shoulder),
            "spine" | "back" | "lower back" | "lumbar" | "thoracic" => Some(Self::Spine),
            "wrist" | "forearm" => Some(Self::Wrist),
            "hand" | "finger" | "thumb" => Some(Self::Hand),
            _ => None,
        }
    }
}

/// Movement families used to match exercises against restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    KneeDominant,
    Overhead,
    SpinalLoading,
    GripLoadBearing,
}

impl MovementPattern {
    /// Exercise-name keywords that flag an exercise as belonging to this family.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::KneeDominant => &["squat", "lunge", "step-up", "step up", "jump"],
            Self::Overhead => &["press", "raise", "pullup", "pull-up", "snatch"],
            Self::SpinalLoading => &["deadlift", "squat", "row", "clean", "good morning"],
            Self::GripLoadBearing => &["grip", "carry", "hang", "curl"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionType {
    Prohibited,
    Limited,
    Modified,
}

/// A single exercise restriction derived from an active injury.
/// Ephemeral: recomputed per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRestriction {
    pub movement_pattern: MovementPattern,
    pub body_part: String,
    /// Percent of normal training intensity still allowed, 0-100.
    pub intensity_limit: u8,
    pub restriction_type: RestrictionType,
    pub reason: String,
}

/// A substitute exercise prescribed for a restricted one. Ephemeral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSubstitution {
    pub original_exercise: String,
    pub substitute_exercise: String,
    pub modifications: Vec<String>,
    pub reason: String,
    /// 1 (closest to the original) to 5 (fully regressed)
    pub regression_level: u8,
}
