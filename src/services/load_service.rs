use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{self, MedicalCache};
use crate::config::EngineConfig;
use crate::models::{
    Injury, LoadAdjustment, LoadManagementData, LoadTrend, RealTimeMetrics, RiskLevel,
    WellnessEntry, BASELINE_LOAD, MIN_RECOMMENDED_LOAD,
};
use crate::store::MedicalRecordStore;

/// Cap on the reduction any single injury can contribute.
const MAX_INJURY_REDUCTION: f64 = 70.0;
/// Cap on the combined wellness reduction.
const MAX_WELLNESS_REDUCTION: f64 = 50.0;
/// Flat reduction while a player is on load management.
const LOAD_MANAGEMENT_REDUCTION: f64 = 30.0;

/// Training-load recommendation engine. Results are cached per player
/// with a short TTL purely as a performance optimization; a miss always
/// recomputes identically.
#[derive(Clone)]
pub struct LoadService {
    store: Arc<dyn MedicalRecordStore>,
    cache: Arc<dyn MedicalCache>,
    config: EngineConfig,
    trends: Arc<RwLock<HashMap<Uuid, Vec<LoadTrend>>>>,
}

impl LoadService {
    pub fn new(
        store: Arc<dyn MedicalRecordStore>,
        cache: Arc<dyn MedicalCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            cache,
            config,
            trends: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Compute (or fetch from cache) the recommended training load for a
    /// player. Collaborator outages degrade to "no medical data" rather
    /// than failing the call.
    pub async fn calculate_load_management(
        &self,
        player_id: Uuid,
        current_load: f64,
    ) -> Result<LoadManagementData> {
        let key = cache::cache_key("load", player_id, &[&format!("{current_load:.0}")]);
        if let Some(cached) = cache::get_json::<LoadManagementData>(self.cache.as_ref(), &key).await
        {
            return Ok(cached);
        }

        let injuries = match self.store.find_injuries_by_player(player_id).await {
            Ok(injuries) => injuries,
            Err(e) => {
                warn!("Injury lookup failed for {}, assuming none: {}", player_id, e);
                Vec::new()
            }
        };
        let wellness = match self.store.find_latest_wellness(player_id).await {
            Ok(wellness) => wellness,
            Err(e) => {
                warn!("Wellness lookup failed for {}, assuming none: {}", player_id, e);
                None
            }
        };
        let availability = match self.store.find_current_availability(player_id).await {
            Ok(availability) => availability,
            Err(e) => {
                warn!(
                    "Availability lookup failed for {}, assuming none: {}",
                    player_id, e
                );
                None
            }
        };

        let mut factors = Vec::new();
        let mut total_reduction = 0.0;

        let active: Vec<&Injury> = injuries.iter().filter(|i| i.is_active()).collect();
        for injury in &active {
            let modifier = Self::body_part_modifier(&injury.body_part);
            let contribution =
                (f64::from(injury.severity_level) * 10.0 * modifier).min(MAX_INJURY_REDUCTION);
            total_reduction += contribution;
            factors.push(format!(
                "{} injury severity {} (-{:.0}%)",
                injury.body_part.to_lowercase(),
                injury.severity_level,
                contribution
            ));
        }

        let wellness_reduction = wellness
            .as_ref()
            .map(|w| Self::wellness_reduction(w, &mut factors))
            .unwrap_or(0.0);
        total_reduction += wellness_reduction;

        if let Some(availability) = &availability {
            if availability.availability_status
                == crate::models::AvailabilityStatus::LoadManagement
            {
                total_reduction += LOAD_MANAGEMENT_REDUCTION;
                factors.push(format!(
                    "Player on load management (-{LOAD_MANAGEMENT_REDUCTION:.0}%)"
                ));
            }
        }

        let recommended_load = (BASELINE_LOAD - total_reduction)
            .max(MIN_RECOMMENDED_LOAD)
            .min(current_load.max(MIN_RECOMMENDED_LOAD));

        let injury_risk = Self::injury_risk(&active);
        let wellness_risk = Self::wellness_risk(wellness_reduction);
        let risk_level = injury_risk.escalate(wellness_risk);

        let load_reduction = BASELINE_LOAD - recommended_load;
        let data = LoadManagementData {
            player_id,
            baseline_load: BASELINE_LOAD,
            current_load,
            recommended_load,
            load_reduction,
            risk_level,
            factors,
            duration_days: Self::duration_days(load_reduction),
            last_updated: Utc::now(),
        };

        cache::set_json(
            self.cache.as_ref(),
            &key,
            &data,
            std::time::Duration::from_secs(self.config.load_cache_ttl_secs),
        )
        .await;

        info!(
            "Load recommendation for {}: {:.0}% ({:?})",
            player_id, data.recommended_load, data.risk_level
        );
        Ok(data)
    }

    /// Fan out load calculations per player concurrently; a single
    /// player's failure is logged and excluded, never aborting the batch.
    pub async fn calculate_batch_load_management(
        &self,
        requests: &[(Uuid, f64)],
    ) -> HashMap<Uuid, LoadManagementData> {
        let futures = requests.iter().map(|(player_id, current_load)| {
            let service = self.clone();
            let player_id = *player_id;
            let current_load = *current_load;
            async move {
                (
                    player_id,
                    service.calculate_load_management(player_id, current_load).await,
                )
            }
        });

        let mut results = HashMap::new();
        for (player_id, result) in join_all(futures).await {
            match result {
                Ok(data) => {
                    results.insert(player_id, data);
                }
                Err(e) => {
                    warn!("Batch load calculation failed for {}: {}", player_id, e);
                }
            }
        }
        results
    }

    /// Record whether the athlete stayed within tolerance of the planned
    /// session load. Retains a rolling window per player.
    pub async fn record_load_compliance(
        &self,
        player_id: Uuid,
        planned: f64,
        actual: f64,
        date: Option<NaiveDate>,
        notes: Option<String>,
    ) {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let compliance = (actual - planned).abs() <= self.config.compliance_tolerance;
        let entry = LoadTrend {
            player_id,
            date,
            load: actual,
            compliance,
            notes,
        };

        let cutoff = Utc::now().date_naive() - Duration::days(self.config.trend_retention_days);
        let mut trends = self.trends.write().await;
        let history = trends.entry(player_id).or_default();
        history.push(entry);
        history.retain(|t| t.date >= cutoff);
    }

    /// Load trend history for the last `days` days.
    pub async fn get_load_trends(&self, player_id: Uuid, days: i64) -> Vec<LoadTrend> {
        let cutoff = Utc::now().date_naive() - Duration::days(days);
        let trends = self.trends.read().await;
        trends
            .get(&player_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|t| t.date >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Mid-session load adjustment. Returns None when nothing fired; an
    /// adjustment, when present, is always a cut.
    pub async fn update_real_time_load(
        &self,
        player_id: Uuid,
        metrics: &RealTimeMetrics,
    ) -> Result<Option<LoadAdjustment>> {
        let injuries = self
            .store
            .find_injuries_by_player(player_id)
            .await
            .unwrap_or_else(|e| {
                warn!("Injury lookup failed for {}, assuming none: {}", player_id, e);
                Vec::new()
            });
        let wellness = self
            .store
            .find_latest_wellness(player_id)
            .await
            .unwrap_or_else(|e| {
                warn!("Wellness lookup failed for {}, assuming none: {}", player_id, e);
                None
            });

        let mut candidates: Vec<(f64, String)> = Vec::new();

        if let (Some(hr), Some(max_hr)) = (
            metrics.heart_rate,
            wellness.as_ref().and_then(|w| w.max_heart_rate),
        ) {
            if max_hr > 0 {
                let ratio = f64::from(hr) / f64::from(max_hr);
                if ratio > 0.95 {
                    candidates.push((
                        -30.0,
                        format!("Heart rate at {:.0}% of max", ratio * 100.0),
                    ));
                } else if ratio > 0.90 {
                    candidates.push((
                        -15.0,
                        format!("Heart rate at {:.0}% of max", ratio * 100.0),
                    ));
                }
            }
        }

        if let Some(rpe) = metrics.rpe {
            if rpe > 8.0 {
                candidates.push((-20.0, format!("RPE {rpe:.1} exceeds 8")));
            }
        }

        let has_active_injury = injuries.iter().any(Injury::is_active);
        if let Some(duration) = metrics.duration_minutes {
            if has_active_injury && duration > 60.0 {
                candidates.push((
                    -25.0,
                    format!("Injured player past {duration:.0} minutes of work"),
                ));
            }
        }

        let strongest = candidates
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0));

        Ok(strongest.map(|(adjustment, reason)| LoadAdjustment {
            player_id,
            recommended_adjustment: adjustment,
            reason,
            timestamp: Utc::now(),
        }))
    }

    /// Per-body-part load-reduction modifier, keyed on the raw lowercased
    /// body part so "acl" weighs heavier than a generic knee complaint.
    fn body_part_modifier(body_part: &str) -> f64 {
        match body_part.trim().to_lowercase().as_str() {
            "acl" | "spine" => 2.0,
            "back" | "lower back" => 1.8,
            "knee" => 1.5,
            "ankle" => 1.3,
            "shoulder" => 1.2,
            "wrist" => 0.8,
            "hand" => 0.6,
            _ => 1.0,
        }
    }

    fn wellness_reduction(wellness: &WellnessEntry, factors: &mut Vec<String>) -> f64 {
        let mut reduction: f64 = 0.0;

        let sleep_penalty = if wellness.sleep_hours < 5.0 {
            15.0
        } else if wellness.sleep_hours < 6.0 {
            10.0
        } else if wellness.sleep_hours < 7.0 {
            5.0
        } else {
            0.0
        };
        if sleep_penalty > 0.0 {
            factors.push(format!(
                "Short sleep {:.1}h (-{sleep_penalty:.0}%)",
                wellness.sleep_hours
            ));
            reduction += sleep_penalty;
        }

        let stress_penalty = if wellness.stress_level > 8 {
            15.0
        } else if wellness.stress_level > 6 {
            8.0
        } else {
            0.0
        };
        if stress_penalty > 0.0 {
            factors.push(format!(
                "Stress {}/10 (-{stress_penalty:.0}%)",
                wellness.stress_level
            ));
            reduction += stress_penalty;
        }

        let soreness_penalty = if wellness.soreness_level > 8 {
            20.0
        } else if wellness.soreness_level > 6 {
            10.0
        } else {
            0.0
        };
        if soreness_penalty > 0.0 {
            factors.push(format!(
                "Soreness {}/10 (-{soreness_penalty:.0}%)",
                wellness.soreness_level
            ));
            reduction += soreness_penalty;
        }

        let energy_penalty = if wellness.energy_level < 3 {
            15.0
        } else if wellness.energy_level < 5 {
            8.0
        } else {
            0.0
        };
        if energy_penalty > 0.0 {
            factors.push(format!(
                "Low energy {}/10 (-{energy_penalty:.0}%)",
                wellness.energy_level
            ));
            reduction += energy_penalty;
        }

        reduction.min(MAX_WELLNESS_REDUCTION)
    }

    fn injury_risk(active: &[&Injury]) -> RiskLevel {
        let max_severity = active.iter().map(|i| i.severity_level).max().unwrap_or(0);
        match max_severity {
            0 => RiskLevel::Low,
            1..=2 => RiskLevel::Medium,
            3 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    fn wellness_risk(reduction: f64) -> RiskLevel {
        if reduction >= 30.0 {
            RiskLevel::High
        } else if reduction >= 15.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn duration_days(reduction: f64) -> u32 {
        if reduction >= 50.0 {
            14
        } else if reduction >= 30.0 {
            10
        } else if reduction >= 10.0 {
            7
        } else {
            3
        }
    }
}
