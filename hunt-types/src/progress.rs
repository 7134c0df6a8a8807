use crate::{CheckInId, Checkpoint, CheckpointId, HuntError, HuntId, PlayerHuntId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PlayerHuntStatus {
    NotStarted,
    Started,
    Completed,
    Abandoned,
}

impl PlayerHuntStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PlayerHuntStatus::Completed | PlayerHuntStatus::Abandoned)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerHuntStatus::NotStarted => "NOT_STARTED",
            PlayerHuntStatus::Started => "STARTED",
            PlayerHuntStatus::Completed => "COMPLETED",
            PlayerHuntStatus::Abandoned => "ABANDONED",
        }
    }
}

impl std::str::FromStr for PlayerHuntStatus {
    type Err = HuntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NOT_STARTED" => Ok(PlayerHuntStatus::NotStarted),
            "STARTED" => Ok(PlayerHuntStatus::Started),
            "COMPLETED" => Ok(PlayerHuntStatus::Completed),
            "ABANDONED" => Ok(PlayerHuntStatus::Abandoned),
            other => Err(HuntError::StorageUnavailable {
                message: format!("unknown player hunt status '{}'", other),
            }),
        }
    }
}

/// A player's participation record for one hunt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerHunt {
    pub id: PlayerHuntId,
    pub player_id: UserId,
    pub hunt_id: HuntId,
    pub status: PlayerHuntStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckIn {
    pub id: CheckInId,
    pub player_id: UserId,
    pub hunt_id: HuntId,
    pub checkpoint_id: CheckpointId,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Progress {
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CheckpointStatus {
    Locked,
    Available,
    Completed,
}

/// Checkpoint as shown on a player's map or list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckpointView {
    pub checkpoint: Checkpoint,
    pub status: CheckpointStatus,
    pub distance_meters: Option<f64>,
    pub distance_label: Option<String>,
    pub bearing_degrees: Option<f64>,
    pub direction: Option<String>,
}

/// Result of a successful check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckInReceipt {
    pub check_in_id: CheckInId,
    pub progress: Progress,
    pub hunt_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_storage_names() {
        for status in [
            PlayerHuntStatus::NotStarted,
            PlayerHuntStatus::Started,
            PlayerHuntStatus::Completed,
            PlayerHuntStatus::Abandoned,
        ] {
            assert_eq!(status.as_str().parse::<PlayerHuntStatus>(), Ok(status));
        }
        assert!("PAUSED".parse::<PlayerHuntStatus>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PlayerHuntStatus::NotStarted.is_terminal());
        assert!(!PlayerHuntStatus::Started.is_terminal());
        assert!(PlayerHuntStatus::Completed.is_terminal());
        assert!(PlayerHuntStatus::Abandoned.is_terminal());
    }

    #[test]
    fn test_empty_progress_is_not_complete() {
        let progress = Progress {
            completed: 0,
            total: 0,
            percentage: 0,
        };
        assert!(!progress.is_complete());
    }
}
