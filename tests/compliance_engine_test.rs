// End-to-end scenarios against the engine facade with in-memory
// collaborators.

use chrono::{Duration, Utc};
use med_compliance::cache::InMemoryCache;
use med_compliance::models::*;
use med_compliance::store::{InMemoryMedicalStore, MedicalRecordStore};
use med_compliance::{ComplianceEngine, EngineConfig};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use uuid::Uuid;

fn build_engine() -> (ComplianceEngine, Arc<InMemoryMedicalStore>) {
    let store = Arc::new(InMemoryMedicalStore::new());
    let cache = Arc::new(InMemoryCache::new());
    let engine = ComplianceEngine::new(store.clone(), cache, EngineConfig::default());
    (engine, store)
}

fn injury(player_id: Uuid, body_part: &str, severity: u8) -> Injury {
    Injury {
        id: Uuid::new_v4(),
        player_id,
        body_part: body_part.to_string(),
        injury_type: "strain".to_string(),
        severity_level: severity,
        recovery_status: RecoveryStatus::Active,
        injury_date: Utc::now().date_naive() - Duration::days(14),
        expected_return_date: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn wellness(player_id: Uuid, max_hr: Option<u16>) -> WellnessEntry {
    WellnessEntry {
        player_id,
        entry_date: Utc::now().date_naive(),
        sleep_hours: 8.0,
        stress_level: 3,
        soreness_level: 3,
        energy_level: 7,
        hydration_level: 7,
        max_heart_rate: max_hr,
    }
}

#[tokio::test]
async fn empty_workout_for_healthy_player_is_compliant() {
    let (engine, _) = build_engine();
    let player_id = Uuid::new_v4().to_string();

    let result = engine.check_workout_compliance(&player_id, &[], 50.0).await;
    assert!(result.is_compliant);
    assert!(result.restrictions.is_empty());
    assert!(result.substitutions.is_empty());
}

#[tokio::test]
async fn severity_4_back_injury_blocks_deadlift() {
    let (engine, store) = build_engine();
    let player_id = Uuid::new_v4();
    store.save_injury(&injury(player_id, "back", 4)).await.unwrap();

    let result = engine
        .check_workout_compliance(&player_id.to_string(), &["deadlift".to_string()], 70.0)
        .await;

    assert!(!result.is_compliant);
    assert_eq!(result.substitutions[0].original_exercise, "deadlift");
    assert_eq!(result.substitutions[0].substitute_exercise, "glute bridge");
}

#[tokio::test]
async fn live_heart_rate_at_99_pct_is_a_hard_stop() {
    let (engine, store) = build_engine();
    let player_id = Uuid::new_v4();
    store.add_wellness(wellness(player_id, Some(200))).await;

    let metrics = RealTimeMetrics {
        heart_rate: Some(198),
        ..Default::default()
    };
    let alert = engine
        .assess_real_time_injury_risk(player_id, &metrics)
        .await
        .expect("hard stop expected");
    assert_eq!(alert.risk_level, RiskLevel::Critical);
    assert!(alert.immediate_action);
}

#[tokio::test]
async fn unknown_player_load_is_full_and_low_risk() {
    let (engine, _) = build_engine();

    let data = engine
        .calculate_load_management(Uuid::new_v4(), 100.0)
        .await
        .unwrap();
    assert_eq!(data.recommended_load, 100.0);
    assert_eq!(data.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn load_compliance_tolerance_boundary() {
    let (engine, _) = build_engine();
    let player_id = Uuid::new_v4();

    engine
        .record_load_compliance(player_id, 80.0, 75.0, None, None)
        .await;
    engine
        .record_load_compliance(player_id, 80.0, 60.0, None, None)
        .await;

    let trends = engine.get_load_trends(player_id, 7).await;
    assert_eq!(trends.len(), 2);
    assert!(trends[0].compliance);
    assert!(!trends[1].compliance);
}

#[tokio::test]
async fn knee_protocol_end_to_end_recovers_injury() {
    let (engine, store) = build_engine();
    let player_id = Uuid::new_v4();
    let knee = injury(player_id, "knee", 2);
    store.save_injury(&knee).await.unwrap();

    let milestones = engine
        .initialize_recovery_protocol(knee.id, "knee_injury", None)
        .await
        .unwrap();
    assert_eq!(milestones.len(), 6);
    assert!(milestones.iter().all(|m| !m.is_completed));
    for pair in milestones.windows(2) {
        assert!(pair[0].target_date < pair[1].target_date);
    }

    for milestone in &milestones {
        engine
            .record_adherence(
                knee.id,
                AdherenceEntry {
                    date: Utc::now().date_naive(),
                    activity: milestone.name.clone(),
                    entry_type: AdherenceEntryType::Milestone,
                    completed: true,
                    notes: None,
                    metrics: None,
                },
            )
            .await
            .unwrap();
    }

    let stored = store.find_injury(knee.id).await.unwrap().unwrap();
    assert_eq!(stored.recovery_status, RecoveryStatus::Recovered);

    // Repeat completion after terminal cleanup stays a no-op.
    engine
        .complete_milestone(knee.id, "Full training clearance")
        .await
        .unwrap();
}

#[tokio::test]
async fn phase_machine_rejects_skip_and_accepts_successor() {
    let (engine, store) = build_engine();
    let player_id = Uuid::new_v4();
    let knee = injury(player_id, "knee", 3);
    store.save_injury(&knee).await.unwrap();

    let protocol = engine.initiate_protocol(player_id, knee.id).await.unwrap();

    // rest -> sport_specific skips light_activity.
    let skip = engine
        .advance_phase(protocol.id, RecoveryPhase::SportSpecific, 80.0, "Dr. Reyes", None)
        .await;
    assert!(skip.is_err());

    engine
        .advance_phase(protocol.id, RecoveryPhase::LightActivity, 80.0, "Dr. Reyes", None)
        .await
        .unwrap();
    let advanced = engine
        .advance_phase(protocol.id, RecoveryPhase::SportSpecific, 85.0, "Dr. Reyes", None)
        .await
        .unwrap();
    assert_eq!(advanced.current_phase, RecoveryPhase::SportSpecific);
    assert_eq!(advanced.clearance_level, ClearanceLevel::LimitedContact);
}

#[tokio::test]
async fn concurrent_checks_for_distinct_players_do_not_interfere() {
    let (engine, store) = build_engine();

    let mut players = Vec::new();
    for i in 0..10 {
        let player_id = Uuid::new_v4();
        // Half the players carry an active knee injury.
        if i % 2 == 0 {
            store.save_injury(&injury(player_id, "knee", 3)).await.unwrap();
        }
        players.push((player_id, i % 2 == 0));
    }

    let handles: Vec<_> = players
        .iter()
        .map(|(player_id, _)| {
            let engine = engine.clone();
            let id = player_id.to_string();
            tokio::spawn(async move {
                engine
                    .check_workout_compliance(&id, &["back squat".to_string()], 60.0)
                    .await
            })
        })
        .collect();

    for (handle, (_, injured)) in handles.into_iter().zip(players.iter()) {
        let result = handle.await.unwrap();
        if *injured {
            assert!(!result.is_compliant);
            assert_eq!(result.restrictions.len(), 1);
        } else {
            assert!(result.is_compliant);
            assert!(result.restrictions.is_empty());
        }
    }
}

#[tokio::test]
async fn recommended_load_stays_within_bounds() {
    let (engine, store) = build_engine();
    let player_id = Uuid::new_v4();
    store.save_injury(&injury(player_id, "acl", 5)).await.unwrap();
    store.save_injury(&injury(player_id, "back", 5)).await.unwrap();

    let data = engine
        .calculate_load_management(player_id, 100.0)
        .await
        .unwrap();
    assert!(data.recommended_load >= 20.0);
    assert!(data.recommended_load <= 100.0);
    assert!(data.recommended_load <= data.current_load);
}
