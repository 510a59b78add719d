// Collaborator seam for the medical record store.
//
// Persistence itself (SQL mapping, migrations) is owned by an external
// collaborator; the engine only depends on this trait. The in-memory
// implementation backs the test suites and embedders without a durable
// store.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Injury, PlayerAvailability, WellnessEntry};

pub use memory::InMemoryMedicalStore;

/// Read/write access to the medical records the engine consults.
#[async_trait]
pub trait MedicalRecordStore: Send + Sync {
    /// All injury records for a player, any status.
    async fn find_injuries_by_player(&self, player_id: Uuid) -> Result<Vec<Injury>>;

    async fn find_injury(&self, injury_id: Uuid) -> Result<Option<Injury>>;

    /// The latest wellness entry for a player, if any exists.
    async fn find_latest_wellness(&self, player_id: Uuid) -> Result<Option<WellnessEntry>>;

    /// The single current availability record for a player.
    async fn find_current_availability(&self, player_id: Uuid)
        -> Result<Option<PlayerAvailability>>;

    async fn save_injury(&self, injury: &Injury) -> Result<()>;

    async fn save_availability(&self, availability: &PlayerAvailability) -> Result<()>;
}
