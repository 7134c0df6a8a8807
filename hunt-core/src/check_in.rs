use crate::conditions::is_reachable;
use crate::geodesy::distance_meters;
use hunt_types::{
    CheckIn, Checkpoint, Condition, Coordinate, HuntError, PlayerHunt, PlayerHuntStatus,
};

/// Maximum distance between player and checkpoint for a valid check-in.
pub const PROXIMITY_THRESHOLD_METERS: f64 = 50.0;

/// Round-off allowance for distances computed through degree/radian conversions.
const DISTANCE_EPSILON_METERS: f64 = 1e-6;

pub fn within_proximity(distance_meters: f64, threshold_meters: f64) -> bool {
    distance_meters <= threshold_meters + DISTANCE_EPSILON_METERS
}

/// Everything needed to decide a check-in, already read from storage.
#[derive(Debug, Clone)]
pub struct CheckInAttempt<'a> {
    pub player_hunt: Option<&'a PlayerHunt>,
    pub checkpoint: &'a Checkpoint,
    /// Conditions on the viewer's local clock.
    pub conditions: &'a [Condition],
    pub check_ins: &'a [CheckIn],
    pub existing: Option<&'a CheckIn>,
    pub location: Coordinate,
    pub now_local: &'a str,
    pub threshold_meters: f64,
}

impl CheckInAttempt<'_> {
    /// Run the preconditions in order; the first failure wins. Returns the
    /// player's distance to the checkpoint on success.
    pub fn authorize(&self) -> Result<f64, HuntError> {
        let started = self
            .player_hunt
            .is_some_and(|record| record.status == PlayerHuntStatus::Started);
        if !started {
            return Err(HuntError::HuntNotStarted);
        }

        if !is_reachable(
            self.checkpoint,
            self.conditions,
            self.check_ins,
            self.now_local,
        ) {
            return Err(HuntError::CheckpointLocked);
        }

        if self.existing.is_some() {
            return Err(HuntError::AlreadyCheckedIn);
        }

        let distance = distance_meters(&self.location, &self.checkpoint.location);
        if !within_proximity(distance, self.threshold_meters) {
            return Err(HuntError::TooFar {
                distance_meters: distance,
            });
        }

        Ok(distance)
    }
}
