use hunt_types::{HuntError, PlayerHunt, PlayerHuntStatus, Progress};

/// Status of a (player, hunt) pair; no record means the hunt was never started.
pub fn status_of(record: Option<&PlayerHunt>) -> PlayerHuntStatus {
    record
        .map(|player_hunt| player_hunt.status)
        .unwrap_or(PlayerHuntStatus::NotStarted)
}

/// Validate a status change. Terminal states accept nothing.
pub fn transition(
    from: PlayerHuntStatus,
    to: PlayerHuntStatus,
) -> Result<PlayerHuntStatus, HuntError> {
    use PlayerHuntStatus::*;

    match (from, to) {
        (NotStarted, Started) => Ok(Started),
        (Started, Started) => Err(HuntError::DuplicateStart),
        (Started, Completed) | (Started, Abandoned) => Ok(to),
        _ => Err(HuntError::InvalidTransition { from, to }),
    }
}

pub fn ensure_can_start(existing: Option<&PlayerHunt>) -> Result<(), HuntError> {
    transition(status_of(existing), PlayerHuntStatus::Started).map(|_| ())
}

pub fn abandon(record: &PlayerHunt) -> Result<PlayerHuntStatus, HuntError> {
    transition(record.status, PlayerHuntStatus::Abandoned)
}

/// Completion only follows from progress; `None` means the hunt stays as it is.
pub fn completion_for(
    record: &PlayerHunt,
    progress: &Progress,
) -> Result<Option<PlayerHuntStatus>, HuntError> {
    if !progress.is_complete() {
        return Ok(None);
    }
    transition(record.status, PlayerHuntStatus::Completed).map(Some)
}
