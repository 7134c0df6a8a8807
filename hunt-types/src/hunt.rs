use crate::{CheckpointId, ConditionId, HuntError, HuntId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Hunt {
    pub id: HuntId,
    pub name: String,
    pub owner_id: UserId,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting anything outside [-90, 90] x [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, HuntError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<(), HuntError> {
        let latitude_ok = (-90.0..=90.0).contains(&self.latitude);
        let longitude_ok = (-180.0..=180.0).contains(&self.longitude);

        if latitude_ok && longitude_ok {
            Ok(())
        } else {
            Err(HuntError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// A single GPS-addressable stop within a hunt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub hunt_id: HuntId,
    pub name: String,
    pub clue: String,
    pub location: Coordinate,
}

/// What gates a checkpoint. Time windows are "HH:MM" strings; stored
/// records hold UTC, evaluated records hold the viewer's local clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ConditionKind {
    RequiredLocation { required_checkpoint_id: CheckpointId },
    TimeWindow { start: String, end: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Condition {
    pub id: ConditionId,
    pub checkpoint_id: CheckpointId,
    pub kind: ConditionKind,
}

impl Condition {
    /// The checkpoint this condition depends on, if it is a dependency edge.
    pub fn required_checkpoint(&self) -> Option<CheckpointId> {
        match &self.kind {
            ConditionKind::RequiredLocation {
                required_checkpoint_id,
            } => Some(*required_checkpoint_id),
            ConditionKind::TimeWindow { .. } => None,
        }
    }
}
