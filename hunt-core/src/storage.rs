use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hunt_types::{
    CheckIn, CheckInId, Checkpoint, CheckpointId, Condition, Hunt, HuntError, HuntId, PlayerHunt,
    PlayerHuntId, PlayerHuntStatus, UserId,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out")]
    Timeout,
    /// A uniqueness constraint or a status precondition rejected the write.
    #[error("conflicting write: {0}")]
    Conflict(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("record not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for HuntError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => HuntError::StorageTimeout,
            other => HuntError::StorageUnavailable {
                message: other.to_string(),
            },
        }
    }
}

/// Persistence collaborator consumed by [`crate::HuntEngine`].
///
/// `create_check_in` must reject a second record for the same
/// (player, hunt, checkpoint) and `create_player_hunt` a second record for the
/// same (player, hunt), both with [`StoreError::Conflict`]. Application-level
/// pre-checks alone do not close the race between concurrent callers.
///
/// `update_player_hunt_status` is a compare-and-set: it only applies to a
/// record that is still STARTED, answers [`StoreError::Conflict`] for any
/// other current status and [`StoreError::NotFound`] for a missing record.
#[async_trait]
pub trait HuntStore: Send + Sync {
    async fn find_hunt(&self, hunt_id: HuntId) -> Result<Option<Hunt>, StoreError>;

    async fn load_checkpoints(&self, hunt_id: HuntId) -> Result<Vec<Checkpoint>, StoreError>;

    async fn load_conditions(
        &self,
        checkpoint_id: CheckpointId,
    ) -> Result<Vec<Condition>, StoreError>;

    async fn load_check_ins(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
    ) -> Result<Vec<CheckIn>, StoreError>;

    async fn find_check_in(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        checkpoint_id: CheckpointId,
    ) -> Result<Option<CheckIn>, StoreError>;

    async fn create_check_in(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        checkpoint_id: CheckpointId,
        timestamp: DateTime<Utc>,
    ) -> Result<CheckInId, StoreError>;

    async fn find_player_hunt(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
    ) -> Result<Option<PlayerHunt>, StoreError>;

    async fn find_player_hunt_by_id(
        &self,
        player_hunt_id: PlayerHuntId,
    ) -> Result<Option<PlayerHunt>, StoreError>;

    async fn create_player_hunt(
        &self,
        player_id: UserId,
        hunt_id: HuntId,
        timestamp: DateTime<Utc>,
    ) -> Result<PlayerHuntId, StoreError>;

    /// Move a STARTED record to `status`.
    async fn update_player_hunt_status(
        &self,
        player_hunt_id: PlayerHuntId,
        status: PlayerHuntStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;
}
