use crate::storage::{HuntStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hunt_types::{
    CheckIn, CheckInId, Checkpoint, CheckpointId, Condition, Hunt, HuntId, PlayerHunt,
    PlayerHuntId, PlayerHuntStatus, UserId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    hunts: HashMap<HuntId, Hunt>,
    checkpoints: Vec<Checkpoint>,
    conditions: Vec<Condition>,
    check_ins: Vec<CheckIn>,
    player_hunts: Vec<PlayerHunt>,
}

/// Process-local [`HuntStore`] with the same uniqueness guarantees as the
/// database schema. Useful for embedding the engine without a database and
/// for tests; it can also simulate an outage, a slow backend, or failing
/// status writes.
#[derive(Debug, Default)]
pub struct InMemoryHuntStore {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
    failing_status_updates: AtomicU64,
}

impl InMemoryHuntStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }

    async fn gate(&self) -> Result<(), StoreError> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Fail the next `count` status updates with [`StoreError::Unavailable`]
    /// without touching the record.
    pub fn fail_next_status_updates(&self, count: u64) {
        self.failing_status_updates.store(count, Ordering::Relaxed);
    }

    pub fn insert_hunt(&self, hunt: Hunt) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let duplicate_name = state
            .hunts
            .values()
            .any(|existing| existing.owner_id == hunt.owner_id && existing.name == hunt.name);
        if duplicate_name {
            return Err(StoreError::Conflict(format!("hunt name '{}'", hunt.name)));
        }
        state.hunts.insert(hunt.id, hunt);
        Ok(())
    }

    pub fn insert_checkpoint(&self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.hunts.contains_key(&checkpoint.hunt_id) {
            return Err(StoreError::NotFound(format!("hunt {}", checkpoint.hunt_id)));
        }
        state.checkpoints.push(checkpoint);
        Ok(())
    }

    pub fn insert_condition(&self, condition: Condition) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state
            .checkpoints
            .iter()
            .any(|checkpoint| checkpoint.id == condition.checkpoint_id)
        {
            return Err(StoreError::NotFound(format!(
                "checkpoint {}",
                condition.checkpoint_id
            )));
        }
        state.conditions.push(condition);
        Ok(())
    }

    pub fn check_in_count(&self) -> usize {
        self.lock().map(|state| state.check_ins.len()).unwrap_or(0)
    }
}

#[async_trait]
impl HuntStore for InMemoryHuntStore {
    async fn find_hunt(&self, hunt_id: HuntId) -> Result<Option<Hunt>, StoreError> {
        self.gate().await?;
        Ok(self.lock()?.hunts.get(&hunt_id).cloned())
    }

    async fn load_checkpoints(&self, hunt_id: HuntId) -> Result<Vec<Checkpoint>, StoreError> {
        self.gate().await?;
        Ok(self
            .lock()?
            .checkpoints
            .iter()
            .filter(|checkpoint| checkpoint.hunt_id == hunt_id)
            .cloned()
            .collect())
    }

    async fn load_conditions(
        &self,
        checkpoint_id: CheckpointId,
    ) -> Result<Vec<Condition>, StoreError> {
        self.gate().await?;
        Ok(self
            .lock()?
            .conditions
            .iter()
            .filter(|condition| condition.checkpoint_id == checkpoint_id)
            .cloned()
            .collect())
    }

    async fn load_check_ins(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
    ) -> Result<Vec<CheckIn>, StoreError> {
        self.gate().await?;
        Ok(self
            .lock()?
            .check_ins
            .iter()
            .filter(|check_in| check_in.player_id == player_id && check_in.hunt_id == hunt_id)
            .cloned()
            .collect())
    }

    async fn find_check_in(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        checkpoint_id: CheckpointId,
    ) -> Result<Option<CheckIn>, StoreError> {
        self.gate().await?;
        Ok(self
            .lock()?
            .check_ins
            .iter()
            .find(|check_in| {
                check_in.player_id == player_id
                    && check_in.hunt_id == hunt_id
                    && check_in.checkpoint_id == checkpoint_id
            })
            .cloned())
    }

    async fn create_check_in(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        checkpoint_id: CheckpointId,
        timestamp: DateTime<Utc>,
    ) -> Result<CheckInId, StoreError> {
        self.gate().await?;
        let mut state = self.lock()?;
        let duplicate = state.check_ins.iter().any(|check_in| {
            check_in.player_id == player_id
                && check_in.hunt_id == hunt_id
                && check_in.checkpoint_id == checkpoint_id
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "check-in for checkpoint {}",
                checkpoint_id
            )));
        }

        let id = Uuid::new_v4();
        state.check_ins.push(CheckIn {
            id,
            player_id,
            hunt_id,
            checkpoint_id,
            checked_in_at: timestamp,
        });
        Ok(id)
    }

    async fn find_player_hunt(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
    ) -> Result<Option<PlayerHunt>, StoreError> {
        self.gate().await?;
        Ok(self
            .lock()?
            .player_hunts
            .iter()
            .find(|record| record.player_id == player_id && record.hunt_id == hunt_id)
            .cloned())
    }

    async fn find_player_hunt_by_id(
        &self,
        player_hunt_id: PlayerHuntId,
    ) -> Result<Option<PlayerHunt>, StoreError> {
        self.gate().await?;
        Ok(self
            .lock()?
            .player_hunts
            .iter()
            .find(|record| record.id == player_hunt_id)
            .cloned())
    }

    async fn create_player_hunt(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        timestamp: DateTime<Utc>,
    ) -> Result<PlayerHuntId, StoreError> {
        self.gate().await?;
        let mut state = self.lock()?;
        if state
            .player_hunts
            .iter()
            .any(|record| record.player_id == player_id && record.hunt_id == hunt_id)
        {
            return Err(StoreError::Conflict(format!("player hunt for {}", hunt_id)));
        }

        let id = Uuid::new_v4();
        state.player_hunts.push(PlayerHunt {
            id,
            player_id,
            hunt_id,
            status: PlayerHuntStatus::Started,
            started_at: timestamp,
            completed_at: None,
        });
        Ok(id)
    }

    async fn update_player_hunt_status(
        &self,
        player_hunt_id: PlayerHuntId,
        status: PlayerHuntStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        self.gate().await?;
        let injected = self.failing_status_updates.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |remaining| remaining.checked_sub(1),
        );
        if injected.is_ok() {
            return Err(StoreError::Unavailable("status write dropped".to_string()));
        }

        let mut state = self.lock()?;
        let record = state
            .player_hunts
            .iter_mut()
            .find(|record| record.id == player_hunt_id)
            .ok_or_else(|| StoreError::NotFound(format!("player hunt {}", player_hunt_id)))?;

        if record.status != PlayerHuntStatus::Started {
            return Err(StoreError::Conflict(format!(
                "player hunt {} is already {}",
                player_hunt_id,
                record.status.as_str()
            )));
        }
        record.status = status;
        record.completed_at = completed_at;
        Ok(())
    }
}
