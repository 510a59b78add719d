use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Injured,
    LoadManagement,
    Illness,
}

/// Current availability record for a player. The external store guarantees
/// exactly one record with is_current=true per player; the engine reads it
/// and only writes back on injury create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAvailability {
    pub player_id: Uuid,
    pub availability_status: AvailabilityStatus,
    pub is_current: bool,
    pub medical_clearance_required: bool,
}
