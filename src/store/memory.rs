use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::MedicalRecordStore;
use crate::models::{Injury, PlayerAvailability, WellnessEntry};

/// In-memory medical record store keyed by player/injury id.
#[derive(Clone, Default)]
pub struct InMemoryMedicalStore {
    injuries: Arc<RwLock<HashMap<Uuid, Injury>>>,
    wellness: Arc<RwLock<HashMap<Uuid, Vec<WellnessEntry>>>>,
    availability: Arc<RwLock<HashMap<Uuid, PlayerAvailability>>>,
}

impl InMemoryMedicalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a wellness entry; entries are kept in insertion order and the
    /// last one per player is treated as latest.
    pub async fn add_wellness(&self, entry: WellnessEntry) {
        let mut wellness = self.wellness.write().await;
        wellness.entry(entry.player_id).or_default().push(entry);
    }
}

#[async_trait]
impl MedicalRecordStore for InMemoryMedicalStore {
    async fn find_injuries_by_player(&self, player_id: Uuid) -> Result<Vec<Injury>> {
        let injuries = self.injuries.read().await;
        Ok(injuries
            .values()
            .filter(|i| i.player_id == player_id)
            .cloned()
            .collect())
    }

    async fn find_injury(&self, injury_id: Uuid) -> Result<Option<Injury>> {
        let injuries = self.injuries.read().await;
        Ok(injuries.get(&injury_id).cloned())
    }

    async fn find_latest_wellness(&self, player_id: Uuid) -> Result<Option<WellnessEntry>> {
        let wellness = self.wellness.read().await;
        Ok(wellness
            .get(&player_id)
            .and_then(|entries| entries.last().cloned()))
    }

    async fn find_current_availability(
        &self,
        player_id: Uuid,
    ) -> Result<Option<PlayerAvailability>> {
        let availability = self.availability.read().await;
        Ok(availability.get(&player_id).filter(|a| a.is_current).cloned())
    }

    async fn save_injury(&self, injury: &Injury) -> Result<()> {
        let mut injuries = self.injuries.write().await;
        injuries.insert(injury.id, injury.clone());
        Ok(())
    }

    async fn save_availability(&self, record: &PlayerAvailability) -> Result<()> {
        let mut availability = self.availability.write().await;
        availability.insert(record.player_id, record.clone());
        Ok(())
    }
}
