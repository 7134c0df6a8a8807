use hunt_types::{CheckIn, Checkpoint, Condition, ConditionKind};
use tracing::debug;

/// Decide whether a checkpoint's conditions all pass.
///
/// `conditions` must already be on the viewer's local clock (see
/// [`crate::time_window::localize_conditions`]) and `now_local` is the viewer's
/// "HH:MM". `check_ins` are the player's check-ins for the checkpoint's hunt.
/// An empty condition list is always reachable.
pub fn is_reachable(
    checkpoint: &Checkpoint,
    conditions: &[Condition],
    check_ins: &[CheckIn],
    now_local: &str,
) -> bool {
    conditions.iter().all(|condition| {
        let passed = condition_passes(checkpoint, condition, check_ins, now_local);
        if !passed {
            debug!(
                "Checkpoint {} blocked by condition {} ({:?})",
                checkpoint.id, condition.id, condition.kind
            );
        }
        passed
    })
}

pub fn condition_passes(
    checkpoint: &Checkpoint,
    condition: &Condition,
    check_ins: &[CheckIn],
    now_local: &str,
) -> bool {
    match &condition.kind {
        ConditionKind::RequiredLocation {
            required_checkpoint_id,
        } => check_ins.iter().any(|check_in| {
            check_in.hunt_id == checkpoint.hunt_id
                && check_in.checkpoint_id == *required_checkpoint_id
        }),
        ConditionKind::TimeWindow { start, end } => within_window(start, end, now_local),
    }
}

/// Inclusive "HH:MM" comparison. A window whose end is before its start
/// (one that crosses midnight) never matches.
pub fn within_window(start: &str, end: &str, now_local: &str) -> bool {
    start <= now_local && now_local <= end
}
