pub mod hunt_repository;
pub mod hunt_store;

pub use hunt_repository::HuntRepository;
pub use hunt_store::SeaOrmHuntStore;

use crate::entities::{check_ins, checkpoints, conditions, hunts, player_hunts};
use hunt_core::StoreError;
use hunt_types::{
    CheckIn, Checkpoint, Condition, ConditionKind, Coordinate, Hunt, PlayerHunt, PlayerHuntStatus,
};
use sea_orm::{ConnAcquireErr, DbErr, SqlErr};

pub(crate) fn store_error(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return StoreError::Conflict(detail);
    }

    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => StoreError::Timeout,
        DbErr::RecordNotFound(detail) => StoreError::NotFound(detail),
        DbErr::RecordNotUpdated => StoreError::NotFound("record not updated".to_string()),
        other => StoreError::Unavailable(other.to_string()),
    }
}

pub(crate) fn model_to_hunt(model: hunts::Model) -> Hunt {
    Hunt {
        id: model.id,
        name: model.name,
        owner_id: model.owner_id,
        is_public: model.is_public,
        created_at: model.created_at,
    }
}

pub(crate) fn model_to_checkpoint(model: checkpoints::Model) -> Checkpoint {
    Checkpoint {
        id: model.id,
        hunt_id: model.hunt_id,
        name: model.name,
        clue: model.clue,
        location: Coordinate {
            latitude: model.latitude,
            longitude: model.longitude,
        },
    }
}

pub(crate) fn model_to_condition(model: conditions::Model) -> Result<Condition, StoreError> {
    let kind = match (
        model.kind.as_str(),
        model.required_checkpoint_id,
        model.window_start,
        model.window_end,
    ) {
        (conditions::KIND_REQUIRED_LOCATION, Some(required_checkpoint_id), _, _) => {
            ConditionKind::RequiredLocation {
                required_checkpoint_id,
            }
        }
        (conditions::KIND_TIME_WINDOW, _, Some(start), Some(end)) => {
            ConditionKind::TimeWindow { start, end }
        }
        (kind, ..) => {
            return Err(StoreError::Corrupt(format!(
                "condition {} has kind '{}' without its fields",
                model.id, kind
            )));
        }
    };

    Ok(Condition {
        id: model.id,
        checkpoint_id: model.checkpoint_id,
        kind,
    })
}

pub(crate) fn condition_to_model(condition: &Condition) -> conditions::ActiveModel {
    use sea_orm::ActiveValue::Set;

    let (kind, required, start, end) = match &condition.kind {
        ConditionKind::RequiredLocation {
            required_checkpoint_id,
        } => (
            conditions::KIND_REQUIRED_LOCATION,
            Some(*required_checkpoint_id),
            None,
            None,
        ),
        ConditionKind::TimeWindow { start, end } => (
            conditions::KIND_TIME_WINDOW,
            None,
            Some(start.clone()),
            Some(end.clone()),
        ),
    };

    conditions::ActiveModel {
        id: Set(condition.id),
        checkpoint_id: Set(condition.checkpoint_id),
        kind: Set(kind.to_string()),
        required_checkpoint_id: Set(required),
        window_start: Set(start),
        window_end: Set(end),
    }
}

pub(crate) fn model_to_player_hunt(model: player_hunts::Model) -> Result<PlayerHunt, StoreError> {
    let status = model
        .status
        .parse::<PlayerHuntStatus>()
        .map_err(|err| StoreError::Corrupt(err.to_string()))?;

    Ok(PlayerHunt {
        id: model.id,
        player_id: model.player_id,
        hunt_id: model.hunt_id,
        status,
        started_at: model.started_at,
        completed_at: model.completed_at,
    })
}

pub(crate) fn model_to_check_in(model: check_ins::Model) -> CheckIn {
    CheckIn {
        id: model.id,
        player_id: model.player_id,
        hunt_id: model.hunt_id,
        checkpoint_id: model.checkpoint_id,
        checked_in_at: model.checked_in_at,
    }
}
