//! Export / import and the persistence hook.

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use persona_core::config::PersonaConfig;
use persona_core::errors::{PersonaError, PersonaResult, TemporalError};
use persona_core::models::*;
use persona_core::traits::{ITemporalQuery, ITimelinePersistence};
use persona_temporal::TemporalEngine;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 5, 9, 30, 0).unwrap()
}

fn populated() -> TemporalEngine {
    let engine = TemporalEngine::new(PersonaConfig::default()).unwrap();
    for i in 0..12 {
        engine
            .append(
                NewEvent::new(
                    t0() + Duration::days(i),
                    EventKind::Interaction,
                    StateDelta::new().with("trust", 0.5).with("autonomy", -0.25),
                )
                .with_note(format!("day {i}")),
            )
            .unwrap();
        if i % 4 == 3 {
            engine.checkpoint(None).unwrap();
        }
    }
    engine
}

#[derive(Default)]
struct MemoryPersistence {
    saved: Mutex<Option<TimelineExport>>,
    archived: Mutex<Vec<StateEvent>>,
}

impl ITimelinePersistence for MemoryPersistence {
    fn save(&self, export: &TimelineExport) -> PersonaResult<()> {
        *self.saved.lock().unwrap() = Some(export.clone());
        Ok(())
    }

    fn load(&self) -> PersonaResult<Option<TimelineExport>> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn archive(&self, events: &[StateEvent]) -> PersonaResult<u64> {
        self.archived.lock().unwrap().extend_from_slice(events);
        Ok(events.len() as u64)
    }
}

#[test]
fn export_import_reproduces_reconstructions() {
    let engine = populated();
    let restored = TemporalEngine::deserialize(PersonaConfig::default(), engine.serialize()).unwrap();

    assert_eq!(restored.events(), engine.events());
    assert_eq!(restored.snapshots(), engine.snapshots());
    for h in (0..14 * 24).step_by(13) {
        let target = t0() + Duration::hours(h);
        assert_eq!(
            restored.reconstruct(target, Depth::Core, None).unwrap(),
            engine.reconstruct(target, Depth::Core, None).unwrap()
        );
    }

    // ids keep counting where the export left off
    let next = restored
        .append(NewEvent::new(
            t0() + Duration::days(20),
            EventKind::Reflection,
            StateDelta::new().with("loyalty", 1.0),
        ))
        .unwrap();
    assert_eq!(next, EventId(13));
}

#[test]
fn json_round_trip() {
    let engine = populated();
    let json = engine.to_json().unwrap();
    let restored = TemporalEngine::from_json(PersonaConfig::default(), &json).unwrap();
    assert_eq!(restored.stats().event_count, 12);
    assert_eq!(restored.stats().snapshot_count, 3);
}

#[test]
fn import_rejects_mismatched_dimensions() {
    let export = populated().serialize();
    let other = PersonaConfig::from_toml(
        r#"
        [[dimensions]]
        name = "trust"
        min = 0.0
        max = 10.0
        baseline = 5.0
        "#,
    )
    .unwrap();
    assert!(matches!(
        TemporalEngine::deserialize(other, export),
        Err(PersonaError::Temporal(TemporalError::ImportRejected(_)))
    ));
}

#[test]
fn import_rejects_unknown_version_and_bad_ordering() {
    let mut export = populated().serialize();
    export.schema_version = 99;
    assert!(matches!(
        TemporalEngine::deserialize(PersonaConfig::default(), export),
        Err(PersonaError::Temporal(TemporalError::SchemaVersionMismatch { found: 99, .. }))
    ));

    let mut shuffled = populated().serialize();
    shuffled.events.swap(0, 5);
    assert!(matches!(
        TemporalEngine::deserialize(PersonaConfig::default(), shuffled),
        Err(PersonaError::Validation(_))
    ));
}

#[test]
fn persistence_hook_save_load_and_archive() {
    let config = PersonaConfig::from_toml("[temporal]\ncompaction_retain_snapshots = 2").unwrap();
    let engine = TemporalEngine::deserialize(config.clone(), populated().serialize()).unwrap();
    let store = MemoryPersistence::default();

    assert!(TemporalEngine::load_from(config.clone(), &store).unwrap().is_none());

    let result = engine.compact_into(&store).unwrap();
    assert!(result.events_moved() > 0);
    assert_eq!(store.archived.lock().unwrap().len(), result.events_moved());

    engine.save_to(&store).unwrap();
    let loaded = TemporalEngine::load_from(config, &store).unwrap().unwrap();
    assert_eq!(loaded.events(), engine.events());
    assert_eq!(loaded.stats().compacted_through, engine.stats().compacted_through);

    let target = t0() + Duration::days(11);
    assert_eq!(
        loaded.reconstruct(target, Depth::Core, None).unwrap(),
        engine.reconstruct(target, Depth::Core, None).unwrap()
    );
}
