use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily self-reported wellness questionnaire entry.
///
/// All scales run 1-10 except sleep_hours. Only the latest entry per
/// player is consulted by the engine; history lives with the collaborator
/// that owns the questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellnessEntry {
    pub player_id: Uuid,
    pub entry_date: NaiveDate,
    pub sleep_hours: f64,
    pub stress_level: u8,
    pub soreness_level: u8,
    pub energy_level: u8,
    pub hydration_level: u8,
    /// Tested or age-estimated max heart rate, used for live HR-ratio checks.
    /// When absent the ratio checks are skipped rather than guessed.
    pub max_heart_rate: Option<u16>,
}
