use hunt_types::HuntError;
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

pub type JsonReply = WithStatus<Json>;

pub fn json_reply<T: Serialize>(value: &T, status: StatusCode) -> JsonReply {
    warp::reply::with_status(warp::reply::json(value), status)
}

pub fn bad_request(message: &str) -> JsonReply {
    json_reply(
        &serde_json::json!({ "error": message }),
        StatusCode::BAD_REQUEST,
    )
}

pub fn status_for(err: &HuntError) -> StatusCode {
    match err {
        HuntError::InvalidCoordinates { .. } | HuntError::InvalidTimeWindow { .. } => {
            StatusCode::BAD_REQUEST
        }
        HuntError::CheckpointLocked | HuntError::NotHuntOwner => StatusCode::FORBIDDEN,
        HuntError::HuntNotFound
        | HuntError::CheckpointNotFound
        | HuntError::ConditionNotFound
        | HuntError::PlayerHuntNotFound => StatusCode::NOT_FOUND,
        HuntError::HuntNotStarted
        | HuntError::AlreadyCheckedIn
        | HuntError::DuplicateStart
        | HuntError::InvalidTransition { .. }
        | HuntError::DuplicateHuntName { .. } => StatusCode::CONFLICT,
        HuntError::TooFar { .. }
        | HuntError::SelfDependency
        | HuntError::ForeignCheckpoint
        | HuntError::DependencyCycle => StatusCode::UNPROCESSABLE_ENTITY,
        HuntError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        HuntError::StorageTimeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

/// `{ "error": <message>, "detail": <HuntError>, "benign": bool }`
pub fn error_reply(err: &HuntError) -> JsonReply {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!("Hunt store failure: {}", err);
    }

    json_reply(
        &serde_json::json!({
            "error": err.to_string(),
            "detail": err,
            "benign": err.is_benign(),
        }),
        status,
    )
}
