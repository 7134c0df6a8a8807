use crate::conditions::is_reachable;
use hunt_types::{CheckIn, Checkpoint, CheckpointId, CheckpointStatus, Condition, Progress};
use std::collections::{HashMap, HashSet};

/// Count distinct checked-in checkpoints against the hunt's checkpoint set.
/// An empty hunt reports 0%.
pub fn compute_progress(checkpoints: &[Checkpoint], check_ins: &[CheckIn]) -> Progress {
    let hunt_checkpoints: HashSet<CheckpointId> = checkpoints.iter().map(|cp| cp.id).collect();
    let checked_in: HashSet<CheckpointId> = check_ins
        .iter()
        .map(|check_in| check_in.checkpoint_id)
        .filter(|id| hunt_checkpoints.contains(id))
        .collect();

    let total = hunt_checkpoints.len() as u32;
    let completed = checked_in.len() as u32;
    let percentage = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    Progress {
        completed,
        total,
        percentage,
    }
}

pub fn checkpoint_status(
    checkpoint: &Checkpoint,
    conditions: &[Condition],
    check_ins: &[CheckIn],
    now_local: &str,
) -> CheckpointStatus {
    if check_ins
        .iter()
        .any(|check_in| check_in.checkpoint_id == checkpoint.id)
    {
        CheckpointStatus::Completed
    } else if is_reachable(checkpoint, conditions, check_ins, now_local) {
        CheckpointStatus::Available
    } else {
        CheckpointStatus::Locked
    }
}

/// Status of every checkpoint, in the order given. `conditions` is keyed by
/// checkpoint id; checkpoints missing from it have no conditions.
pub fn checkpoint_statuses(
    checkpoints: &[Checkpoint],
    conditions: &HashMap<CheckpointId, Vec<Condition>>,
    check_ins: &[CheckIn],
    now_local: &str,
) -> Vec<(CheckpointId, CheckpointStatus)> {
    checkpoints
        .iter()
        .map(|checkpoint| {
            let gates = conditions
                .get(&checkpoint.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            (
                checkpoint.id,
                checkpoint_status(checkpoint, gates, check_ins, now_local),
            )
        })
        .collect()
}
