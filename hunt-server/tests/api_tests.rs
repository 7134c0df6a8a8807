
use hunt_types::{CheckInReceipt, CheckpointStatus, CheckpointView, Coordinate, Hunt, Progress};
use test_helpers::*;
use uuid::Uuid;

async fn start(
    app: &(impl warp::Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + 'static),
    player: Uuid,
    hunt_id: Uuid,
) -> warp::http::Response<warp::hyper::body::Bytes> {
    warp::test::request()
        .method("POST")
        .path(&format!("/hunts/{}/start", hunt_id))
        .header("x-player-id", player.to_string())
        .reply(app)
        .await
}

async fn check_in(
    app: &(impl warp::Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + 'static),
    player: Uuid,
    hunt_id: Uuid,
    checkpoint_id: Uuid,
    location: Coordinate,
) -> warp::http::Response<warp::hyper::body::Bytes> {
    warp::test::request()
        .method("POST")
        .path(&format!(
            "/hunts/{}/checkpoints/{}/check-in",
            hunt_id, checkpoint_id
        ))
        .header("x-player-id", player.to_string())
        .json(&check_in_body(location))
        .reply(app)
        .await
}

#[tokio::test]
async fn test_public_hunt_listing() {
    let server = TestHuntServer::new().await;
    let owner = Uuid::new_v4();
    server
        .repository
        .create_hunt(owner, "Open Trail", true)
        .await
        .unwrap();
    server
        .repository
        .create_hunt(owner, "Secret Trail", false)
        .await
        .unwrap();

    let response = warp::test::request()
        .method("GET")
        .path("/hunts")
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), 200);
    let hunts: Vec<Hunt> = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(hunts.len(), 1);
    assert_eq!(hunts[0].name, "Open Trail");
}

#[tokio::test]
async fn test_downtown_adventure_over_http() {
    let server = TestHuntServer::new().await;
    let adventure = server.downtown_adventure().await;
    let app = server.routes();
    let player = Uuid::new_v4();
    let hunt_id = adventure.hunt.id;

    let response = start(&app, player, hunt_id).await;
    assert_eq!(response.status(), 201);
    assert!(body_json(response.body())["player_hunt_id"].is_string());

    // Library is gated on the fountain
    let response = check_in(&app, player, hunt_id, adventure.library.id, LIBRARY).await;
    assert_eq!(response.status(), 403);
    assert_eq!(body_json(response.body())["detail"], "CheckpointLocked");

    let response = check_in(&app, player, hunt_id, adventure.fountain.id, FOUNTAIN).await;
    assert_eq!(response.status(), 201);
    let receipt: CheckInReceipt = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(receipt.progress.percentage, 50);
    assert!(!receipt.hunt_completed);

    let response = check_in(&app, player, hunt_id, adventure.library.id, LIBRARY).await;
    assert_eq!(response.status(), 201);
    let receipt: CheckInReceipt = serde_json::from_slice(response.body()).unwrap();
    assert!(receipt.hunt_completed);

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/hunts/{}/progress", hunt_id))
        .header("x-player-id", player.to_string())
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);
    let progress: Progress = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(
        progress,
        Progress {
            completed: 2,
            total: 2,
            percentage: 100
        }
    );
}

#[tokio::test]
async fn test_check_in_rejections() {
    let server = TestHuntServer::new().await;
    let adventure = server.downtown_adventure().await;
    let app = server.routes();
    let player = Uuid::new_v4();
    let hunt_id = adventure.hunt.id;

    let response = check_in(&app, player, hunt_id, adventure.fountain.id, FOUNTAIN).await;
    assert_eq!(response.status(), 409);
    assert_eq!(body_json(response.body())["detail"], "HuntNotStarted");

    start(&app, player, hunt_id).await;

    // Roughly 200m south of the fountain
    let far = Coordinate {
        latitude: 39.9964,
        longitude: -81.7346,
    };
    let response = check_in(&app, player, hunt_id, adventure.fountain.id, far).await;
    assert_eq!(response.status(), 422);
    let body = body_json(response.body());
    assert!(body["detail"]["TooFar"]["distance_meters"].as_f64().unwrap() > 50.0);

    let response = check_in(&app, player, hunt_id, adventure.fountain.id, FOUNTAIN).await;
    assert_eq!(response.status(), 201);

    let response = check_in(&app, player, hunt_id, adventure.fountain.id, FOUNTAIN).await;
    assert_eq!(response.status(), 409);
    let body = body_json(response.body());
    assert_eq!(body["detail"], "AlreadyCheckedIn");
    assert_eq!(body["benign"], true);

    let invalid = Coordinate {
        latitude: 95.0,
        longitude: 0.0,
    };
    let response = check_in(&app, player, hunt_id, adventure.library.id, invalid).await;
    assert_eq!(response.status(), 400);

    let response = check_in(&app, player, hunt_id, Uuid::new_v4(), FOUNTAIN).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_start_errors() {
    let server = TestHuntServer::new().await;
    let adventure = server.downtown_adventure().await;
    let app = server.routes();
    let player = Uuid::new_v4();

    assert_eq!(start(&app, player, adventure.hunt.id).await.status(), 201);

    let response = start(&app, player, adventure.hunt.id).await;
    assert_eq!(response.status(), 409);
    assert_eq!(body_json(response.body())["detail"], "DuplicateStart");

    let response = start(&app, player, Uuid::new_v4()).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_abandon_is_owner_only_and_terminal() {
    let server = TestHuntServer::new().await;
    let adventure = server.downtown_adventure().await;
    let app = server.routes();
    let player = Uuid::new_v4();

    let response = start(&app, player, adventure.hunt.id).await;
    let player_hunt_id = body_json(response.body())["player_hunt_id"]
        .as_str()
        .unwrap()
        .to_string();
    let abandon = |who: Uuid| {
        warp::test::request()
            .method("POST")
            .path(&format!("/player-hunts/{}/abandon", player_hunt_id))
            .header("x-player-id", who.to_string())
    };

    let response = abandon(Uuid::new_v4()).reply(&app).await;
    assert_eq!(response.status(), 404);

    let response = abandon(player).reply(&app).await;
    assert_eq!(response.status(), 200);

    let response = abandon(player).reply(&app).await;
    assert_eq!(response.status(), 409);

    // Abandoned hunts take no more check-ins
    let response = check_in(
        &app,
        player,
        adventure.hunt.id,
        adventure.fountain.id,
        FOUNTAIN,
    )
    .await;
    assert_eq!(body_json(response.body())["detail"], "HuntNotStarted");
}

#[tokio::test]
async fn test_checkpoint_listing_with_position() {
    let server = TestHuntServer::new().await;
    let adventure = server.downtown_adventure().await;
    let app = server.routes();
    let player = Uuid::new_v4();

    let response = warp::test::request()
        .method("GET")
        .path(&format!(
            "/hunts/{}/checkpoints?latitude={}&longitude={}&utc_offset_minutes=-300",
            adventure.hunt.id, FOUNTAIN.latitude, FOUNTAIN.longitude
        ))
        .header("x-player-id", player.to_string())
        .reply(&app)
        .await;

    assert_eq!(response.status(), 200);
    let views: Vec<CheckpointView> = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(views.len(), 2);

    let fountain = views
        .iter()
        .find(|view| view.checkpoint.id == adventure.fountain.id)
        .unwrap();
    let library = views
        .iter()
        .find(|view| view.checkpoint.id == adventure.library.id)
        .unwrap();

    assert_eq!(fountain.status, CheckpointStatus::Available);
    assert_eq!(fountain.distance_label.as_deref(), Some("0m"));
    assert_eq!(library.status, CheckpointStatus::Locked);
    assert!(library.distance_meters.unwrap() > 50.0);
    assert!(library.direction.is_some());
}

#[tokio::test]
async fn test_checkpoint_listing_rejects_half_a_position() {
    let server = TestHuntServer::new().await;
    let adventure = server.downtown_adventure().await;

    let response = warp::test::request()
        .method("GET")
        .path(&format!(
            "/hunts/{}/checkpoints?latitude=39.9",
            adventure.hunt.id
        ))
        .header("x-player-id", Uuid::new_v4().to_string())
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), 400);
}
