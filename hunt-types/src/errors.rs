use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::PlayerHuntStatus;

/// Every expected, caller-recoverable outcome of a hunt operation that is not a success.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum HuntError {
    #[error("Hunt has not been started by this player")]
    HuntNotStarted,
    #[error("Checkpoint is locked")]
    CheckpointLocked,
    #[error("Checkpoint already checked in")]
    AlreadyCheckedIn,
    #[error("Too far from checkpoint: {distance_meters:.1}m away")]
    TooFar { distance_meters: f64 },
    #[error("Hunt already started by this player")]
    DuplicateStart,
    #[error("Invalid coordinates: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("Cannot move player hunt from {from:?} to {to:?}")]
    InvalidTransition {
        from: PlayerHuntStatus,
        to: PlayerHuntStatus,
    },
    #[error("Hunt not found")]
    HuntNotFound,
    #[error("Checkpoint not found")]
    CheckpointNotFound,
    #[error("Condition not found")]
    ConditionNotFound,
    #[error("Player hunt not found")]
    PlayerHuntNotFound,
    #[error("Only the hunt owner may do that")]
    NotHuntOwner,
    #[error("A hunt named '{name}' already exists")]
    DuplicateHuntName { name: String },
    #[error("A checkpoint cannot require itself")]
    SelfDependency,
    #[error("Required checkpoint belongs to a different hunt")]
    ForeignCheckpoint,
    #[error("Checkpoint dependencies would form a cycle")]
    DependencyCycle,
    #[error("Invalid time window: {value}")]
    InvalidTimeWindow { value: String },
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },
    #[error("Storage operation timed out")]
    StorageTimeout,
}

impl HuntError {
    /// Errors the caller should surface as a quiet no-op rather than a failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, HuntError::AlreadyCheckedIn)
    }
}
