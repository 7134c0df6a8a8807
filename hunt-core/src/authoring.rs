//! Validation applied when an owner edits a hunt's structure.

use crate::time_window::parse_clock_time;
use hunt_types::{Checkpoint, CheckpointId, Condition, ConditionKind, Coordinate, HuntError};
use std::collections::{HashMap, HashSet};

pub fn validate_location(location: &Coordinate) -> Result<(), HuntError> {
    location.validate()
}

/// Check a new condition for `checkpoint` against the rest of its hunt.
/// `hunt_checkpoints` are all checkpoints of the same hunt and
/// `hunt_conditions` every condition already attached to them.
pub fn validate_condition(
    checkpoint: &Checkpoint,
    kind: &ConditionKind,
    hunt_checkpoints: &[Checkpoint],
    hunt_conditions: &[Condition],
) -> Result<(), HuntError> {
    match kind {
        ConditionKind::RequiredLocation {
            required_checkpoint_id,
        } => {
            if *required_checkpoint_id == checkpoint.id {
                return Err(HuntError::SelfDependency);
            }
            let same_hunt = hunt_checkpoints.iter().any(|candidate| {
                candidate.id == *required_checkpoint_id && candidate.hunt_id == checkpoint.hunt_id
            });
            if !same_hunt {
                return Err(HuntError::ForeignCheckpoint);
            }
            ensure_acyclic(hunt_conditions, checkpoint.id, *required_checkpoint_id)
        }
        ConditionKind::TimeWindow { start, end } => {
            parse_clock_time(start)?;
            parse_clock_time(end)?;
            Ok(())
        }
    }
}

/// Reject the edge `dependent -> required` if `required` already depends,
/// directly or transitively, on `dependent`.
pub fn ensure_acyclic(
    conditions: &[Condition],
    dependent: CheckpointId,
    required: CheckpointId,
) -> Result<(), HuntError> {
    let mut edges: HashMap<CheckpointId, Vec<CheckpointId>> = HashMap::new();
    for condition in conditions {
        if let Some(target) = condition.required_checkpoint() {
            edges.entry(condition.checkpoint_id).or_default().push(target);
        }
    }

    let mut stack = vec![required];
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == dependent {
            return Err(HuntError::DependencyCycle);
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(next) = edges.get(&current) {
            stack.extend(next.iter().copied());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn stops(count: usize) -> Vec<Checkpoint> {
        let hunt_id = Uuid::new_v4();
        (0..count)
            .map(|i| Checkpoint {
                id: Uuid::new_v4(),
                hunt_id,
                name: format!("Stop {}", i),
                clue: String::new(),
                location: Coordinate {
                    latitude: 0.0,
                    longitude: 0.0,
                },
            })
            .collect()
    }

    fn edge(from: &Checkpoint, to: &Checkpoint) -> Condition {
        Condition {
            id: Uuid::new_v4(),
            checkpoint_id: from.id,
            kind: ConditionKind::RequiredLocation {
                required_checkpoint_id: to.id,
            },
        }
    }

    fn requires(target: &Checkpoint) -> ConditionKind {
        ConditionKind::RequiredLocation {
            required_checkpoint_id: target.id,
        }
    }

    #[test]
    fn test_self_dependency_rejected() {
        let hunt = stops(1);
        assert_eq!(
            validate_condition(&hunt[0], &requires(&hunt[0]), &hunt, &[]),
            Err(HuntError::SelfDependency)
        );
    }

    #[test]
    fn test_foreign_checkpoint_rejected() {
        let hunt = stops(1);
        let other = stops(1);
        assert_eq!(
            validate_condition(&hunt[0], &requires(&other[0]), &hunt, &[]),
            Err(HuntError::ForeignCheckpoint)
        );
    }

    #[test]
    fn test_chain_is_fine_but_cycle_is_not() {
        let hunt = stops(3);
        let existing = vec![edge(&hunt[1], &hunt[0]), edge(&hunt[2], &hunt[1])];

        // A requires C while C -> B -> A already exists
        assert_eq!(
            validate_condition(&hunt[0], &requires(&hunt[2]), &hunt, &existing),
            Err(HuntError::DependencyCycle)
        );

        // C additionally requiring A is a diamond, not a cycle
        assert!(validate_condition(&hunt[2], &requires(&hunt[0]), &hunt, &existing).is_ok());
    }

    #[test]
    fn test_two_node_cycle() {
        let hunt = stops(2);
        let existing = vec![edge(&hunt[0], &hunt[1])];
        assert_eq!(
            ensure_acyclic(&existing, hunt[1].id, hunt[0].id),
            Err(HuntError::DependencyCycle)
        );
    }

    #[test]
    fn test_time_window_validation() {
        let hunt = stops(1);
        let good = ConditionKind::TimeWindow {
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        };
        let bad = ConditionKind::TimeWindow {
            start: "09:00".to_string(),
            end: "25:00".to_string(),
        };

        assert!(validate_condition(&hunt[0], &good, &hunt, &[]).is_ok());
        assert_eq!(
            validate_condition(&hunt[0], &bad, &hunt, &[]),
            Err(HuntError::InvalidTimeWindow {
                value: "25:00".to_string()
            })
        );
    }

    #[test]
    fn test_location_validation() {
        assert!(validate_location(&Coordinate {
            latitude: 39.9982,
            longitude: -81.7346
        })
        .is_ok());
        assert!(matches!(
            validate_location(&Coordinate {
                latitude: 120.0,
                longitude: 0.0
            }),
            Err(HuntError::InvalidCoordinates { .. })
        ));
    }
}
