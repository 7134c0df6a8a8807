#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use hunt_core::{HuntEngine, InMemoryHuntStore};
use hunt_types::{Checkpoint, Condition, ConditionKind, Coordinate, Hunt, HuntId, UserId};
use std::sync::Arc;
use uuid::Uuid;

/// Creates an engine over a fresh in-memory store
pub fn create_test_engine() -> (Arc<InMemoryHuntStore>, HuntEngine<InMemoryHuntStore>) {
    let store = Arc::new(InMemoryHuntStore::new());
    let engine = HuntEngine::new(store.clone());
    (store, engine)
}

pub fn coordinate(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate {
        latitude,
        longitude,
    }
}

/// Wall-clock time on the given day in a fixed UTC offset
pub fn local_time(hour: u32, minute: u32, offset_hours: i32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(offset_hours * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 15, hour, minute, 0)
        .unwrap()
}

pub fn noon() -> DateTime<FixedOffset> {
    local_time(12, 0, 0)
}

/// Creates a hunt owned by a random user
pub fn create_hunt(store: &InMemoryHuntStore, name: &str) -> HuntId {
    let hunt = Hunt {
        id: Uuid::new_v4(),
        name: name.to_string(),
        owner_id: Uuid::new_v4(),
        is_public: true,
        created_at: Utc::now(),
    };
    let id = hunt.id;
    store.insert_hunt(hunt).unwrap();
    id
}

pub fn add_checkpoint(
    store: &InMemoryHuntStore,
    hunt_id: HuntId,
    name: &str,
    location: Coordinate,
) -> Checkpoint {
    let checkpoint = Checkpoint {
        id: Uuid::new_v4(),
        hunt_id,
        name: name.to_string(),
        clue: format!("Find the {}", name.to_lowercase()),
        location,
    };
    store.insert_checkpoint(checkpoint.clone()).unwrap();
    checkpoint
}

pub fn add_condition(store: &InMemoryHuntStore, checkpoint: &Checkpoint, kind: ConditionKind) {
    store
        .insert_condition(Condition {
            id: Uuid::new_v4(),
            checkpoint_id: checkpoint.id,
            kind,
        })
        .unwrap();
}

pub fn requires(checkpoint: &Checkpoint) -> ConditionKind {
    ConditionKind::RequiredLocation {
        required_checkpoint_id: checkpoint.id,
    }
}

/// A stored (UTC) daily window
pub fn utc_window(start: &str, end: &str) -> ConditionKind {
    ConditionKind::TimeWindow {
        start: start.to_string(),
        end: end.to_string(),
    }
}

/// The two-stop hunt used across the scenario tests
pub struct DowntownAdventure {
    pub store: Arc<InMemoryHuntStore>,
    pub engine: HuntEngine<InMemoryHuntStore>,
    pub hunt_id: HuntId,
    pub fountain: Checkpoint,
    pub library: Checkpoint,
    pub player: UserId,
}

pub fn downtown_adventure() -> DowntownAdventure {
    let (store, engine) = create_test_engine();
    let hunt_id = create_hunt(&store, "Downtown Adventure");
    let fountain = add_checkpoint(&store, hunt_id, "Fountain", coordinate(39.9982, -81.7346));
    let library = add_checkpoint(&store, hunt_id, "Library", coordinate(39.9990, -81.7350));
    add_condition(&store, &library, requires(&fountain));

    DowntownAdventure {
        store,
        engine,
        hunt_id,
        fountain,
        library,
        player: Uuid::new_v4(),
    }
}

/// Creates a hunt of `count` unconditioned checkpoints spaced well apart
pub fn create_linear_hunt(store: &InMemoryHuntStore, count: usize) -> (HuntId, Vec<Checkpoint>) {
    let hunt_id = create_hunt(store, &format!("Walk of {}", count));
    let checkpoints = (0..count)
        .map(|i| {
            add_checkpoint(
                store,
                hunt_id,
                &format!("Stop {}", i + 1),
                coordinate(40.0 + i as f64 * 0.01, -81.0),
            )
        })
        .collect();
    (hunt_id, checkpoints)
}
