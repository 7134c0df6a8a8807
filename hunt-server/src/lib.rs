use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Filter;

use crate::responses::{bad_request, error_reply, json_reply, JsonReply};
use hunt_core::{HuntEngine, HuntStore};
use hunt_persistence::HuntRepository;
use hunt_types::{Coordinate, HuntError};

pub mod config;
pub mod responses;

/// The engine as the routes hold it, independent of the store behind it.
pub type SharedEngine = HuntEngine<dyn HuntStore>;

/// Caller identity. Authentication happens in front of this service.
const PLAYER_HEADER: &str = "x-player-id";

#[derive(Debug, Deserialize)]
struct CheckInRequest {
    latitude: f64,
    longitude: f64,
    utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct CheckpointsQuery {
    latitude: Option<f64>,
    longitude: Option<f64>,
    utc_offset_minutes: Option<i32>,
}

fn viewer_now(utc_offset_minutes: Option<i32>) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(utc_offset_minutes.unwrap_or(0).checked_mul(60)?)?;
    Some(Utc::now().with_timezone(&offset))
}

pub fn create_routes(
    engine: SharedEngine,
    hunt_repository: Arc<HuntRepository>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let engine_filter = warp::any().map(move || engine.clone());

    let repository_filter = warp::any().map({
        let hunt_repository = hunt_repository.clone();
        move || hunt_repository.clone()
    });

    let player = warp::header::<Uuid>(PLAYER_HEADER);

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Public hunt discovery
    let public_hunts = warp::path!("hunts")
        .and(warp::get())
        .and(repository_filter.clone())
        .and_then(handle_public_hunts);

    let start = warp::path!("hunts" / Uuid / "start")
        .and(warp::post())
        .and(player)
        .and(engine_filter.clone())
        .and_then(handle_start_hunt);

    let abandon = warp::path!("player-hunts" / Uuid / "abandon")
        .and(warp::post())
        .and(player)
        .and(engine_filter.clone())
        .and_then(handle_abandon_hunt);

    let check_in = warp::path!("hunts" / Uuid / "checkpoints" / Uuid / "check-in")
        .and(warp::post())
        .and(player)
        .and(warp::body::content_length_limit(4 * 1024))
        .and(warp::body::json::<CheckInRequest>())
        .and(engine_filter.clone())
        .and_then(handle_check_in);

    let progress = warp::path!("hunts" / Uuid / "progress")
        .and(warp::get())
        .and(player)
        .and(engine_filter.clone())
        .and_then(handle_progress);

    let checkpoints = warp::path!("hunts" / Uuid / "checkpoints")
        .and(warp::get())
        .and(player)
        .and(warp::query::<CheckpointsQuery>())
        .and(engine_filter.clone())
        .and_then(handle_checkpoints);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", PLAYER_HEADER])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(public_hunts)
        .or(start)
        .or(abandon)
        .or(check_in)
        .or(progress)
        .or(checkpoints)
        .with(cors)
        .with(warp::log("hunt_server"))
}

async fn handle_public_hunts(
    hunt_repository: Arc<HuntRepository>,
) -> Result<JsonReply, warp::Rejection> {
    Ok(match hunt_repository.list_public_hunts().await {
        Ok(hunts) => json_reply(&hunts, StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

async fn handle_start_hunt(
    hunt_id: Uuid,
    player_id: Uuid,
    engine: SharedEngine,
) -> Result<JsonReply, warp::Rejection> {
    Ok(match engine.start_hunt(player_id, hunt_id, Utc::now()).await {
        Ok(player_hunt_id) => json_reply(
            &serde_json::json!({ "player_hunt_id": player_hunt_id }),
            StatusCode::CREATED,
        ),
        Err(err) => error_reply(&err),
    })
}

async fn handle_abandon_hunt(
    player_hunt_id: Uuid,
    player_id: Uuid,
    engine: SharedEngine,
) -> Result<JsonReply, warp::Rejection> {
    // Someone else's record is reported the same as a missing one
    let result = match engine.player_hunt(player_hunt_id).await {
        Ok(record) if record.player_id == player_id => engine.abandon_hunt(player_hunt_id).await,
        Ok(_) => Err(HuntError::PlayerHuntNotFound),
        Err(err) => Err(err),
    };

    Ok(match result {
        Ok(()) => json_reply(
            &serde_json::json!({ "player_hunt_id": player_hunt_id }),
            StatusCode::OK,
        ),
        Err(err) => error_reply(&err),
    })
}

async fn handle_check_in(
    hunt_id: Uuid,
    checkpoint_id: Uuid,
    player_id: Uuid,
    request: CheckInRequest,
    engine: SharedEngine,
) -> Result<JsonReply, warp::Rejection> {
    let location = match Coordinate::new(request.latitude, request.longitude) {
        Ok(location) => location,
        Err(err) => return Ok(error_reply(&err)),
    };
    let Some(now) = viewer_now(request.utc_offset_minutes) else {
        return Ok(bad_request("Invalid UTC offset"));
    };

    Ok(
        match engine
            .attempt_check_in(player_id, hunt_id, checkpoint_id, location, now)
            .await
        {
            Ok(receipt) => json_reply(&receipt, StatusCode::CREATED),
            Err(err) => error_reply(&err),
        },
    )
}

async fn handle_progress(
    hunt_id: Uuid,
    player_id: Uuid,
    engine: SharedEngine,
) -> Result<JsonReply, warp::Rejection> {
    Ok(match engine.get_progress(player_id, hunt_id).await {
        Ok(progress) => json_reply(&progress, StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

async fn handle_checkpoints(
    hunt_id: Uuid,
    player_id: Uuid,
    query: CheckpointsQuery,
    engine: SharedEngine,
) -> Result<JsonReply, warp::Rejection> {
    let position = match (query.latitude, query.longitude) {
        (Some(latitude), Some(longitude)) => match Coordinate::new(latitude, longitude) {
            Ok(position) => Some(position),
            Err(err) => return Ok(error_reply(&err)),
        },
        (None, None) => None,
        _ => return Ok(bad_request("latitude and longitude must be given together")),
    };
    let Some(now) = viewer_now(query.utc_offset_minutes) else {
        return Ok(bad_request("Invalid UTC offset"));
    };

    Ok(
        match engine
            .checkpoint_statuses(player_id, hunt_id, position, now)
            .await
        {
            Ok(views) => json_reply(&views, StatusCode::OK),
            Err(err) => error_reply(&err),
        },
    )
}
