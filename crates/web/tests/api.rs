// Drives the full router in-process against the in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use storage::Database;
use storage::models::{Game, NewGame, NewParticipant, Phase, TeamCode};
use storage::repository::{MemoryStore, PickStore, seed_teams};
use storage::services::EngineSettings;
use tower::ServiceExt;
use uuid::Uuid;
use web::middleware::auth::ApiKeys;
use web::state::AppState;

const API_KEY: &str = "feed-key";

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    participant_id: Uuid,
    games: Vec<Game>,
}

fn code(raw: &str) -> TeamCode {
    TeamCode::parse(raw).unwrap()
}

/// Week 1: NYJ-BUF kicked off an hour ago, DAL-NYG kicks off in two days.
/// Week 2: NE-MIA kicks off in nine days.
async fn setup() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    seed_teams(store.as_ref()).await.unwrap();

    let now = Utc::now();
    let mut games = Vec::new();
    for (week, home, away, start_time) in [
        (1, "NYJ", "BUF", now - Duration::hours(1)),
        (1, "DAL", "NYG", now + Duration::days(2)),
        (2, "NE", "MIA", now + Duration::days(9)),
    ] {
        let game = store
            .upsert_game(&NewGame {
                phase: Phase::Reg,
                week,
                home_team: code(home),
                away_team: code(away),
                start_time,
            })
            .await
            .unwrap();
        games.push(game);
    }

    let participant = store
        .upsert_participant(&NewParticipant {
            participant_id: Uuid::new_v4(),
            display_name: "Alice".to_string(),
            email: None,
        })
        .await
        .unwrap();

    let db = Database::from_store(store.clone());
    let router = web::app(
        AppState::new(db, EngineSettings::default()),
        ApiKeys::from_comma_separated(API_KEY),
    );

    TestApp {
        router,
        store,
        participant_id: participant.participant_id,
        games,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn submit_body(participant_id: Uuid, week: i32, team: &str) -> Value {
    json!({
        "user_id": participant_id,
        "week": week,
        "team": team,
        "phase": "REG"
    })
}

// ===========================================================================
// Availability
// ===========================================================================

#[tokio::test]
async fn available_teams_skip_started_games_unless_lock_is_ignored() {
    let app = setup().await;
    let uri = format!("/api/picks/available/{}", app.participant_id);

    let (status, body) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week"], 1);
    assert_eq!(body["phase"], "reg");
    assert_eq!(body["available_teams"], json!(["DAL", "NYG"]));

    let (status, body) = send(&app.router, get(&format!("{}?ignoreLock=1", uri))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_teams"], json!(["BUF", "DAL", "NYG", "NYJ"]));
}

#[tokio::test]
async fn available_teams_for_unknown_participant_is_not_found() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        get(&format!("/api/picks/available/{}", Uuid::new_v4())),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

// ===========================================================================
// Submission
// ===========================================================================

#[tokio::test]
async fn submitting_a_started_game_is_locked_and_writes_nothing() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/picks/submit",
            submit_body(app.participant_id, 1, "NYJ"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "locked");
    assert!(body["error"].is_string());
    assert!(
        app.store
            .picks_for_participant(app.participant_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn accepted_pick_returns_created_with_next_availability() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/picks/submit",
            submit_body(app.participant_id, 1, "dal"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pick"]["team"], "DAL");
    assert_eq!(body["pick"]["status"], "pending");
    assert_eq!(body["available"]["week"], 2);
    assert_eq!(body["available"]["available_teams"], json!(["MIA", "NE"]));

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/picks/submit",
            submit_body(app.participant_id, 1, "NYG"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "already_picked");
}

#[tokio::test]
async fn malformed_submission_and_week_zero_are_rejected() {
    let app = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/picks/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"user_id\": "))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/picks/submit",
            submit_body(app.participant_id, 0, "DAL"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_week");

    let (status, body) = send(
        &app.router,
        post_json("/api/picks/submit", submit_body(Uuid::new_v4(), 0, "DAL"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/picks/submit",
            submit_body(app.participant_id, 1, ""),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_failed");
}

// ===========================================================================
// History and leaderboard
// ===========================================================================

#[tokio::test]
async fn history_lists_picks_with_team_and_kickoff() {
    let app = setup().await;
    send(
        &app.router,
        post_json(
            "/api/picks/submit",
            submit_body(app.participant_id, 2, "NE"),
            None,
        ),
    )
    .await;
    send(
        &app.router,
        post_json(
            "/api/picks/submit",
            submit_body(app.participant_id, 1, "NYG"),
            None,
        ),
    )
    .await;

    let (status, body) = send(
        &app.router,
        get(&format!("/api/picks/history/{}", app.participant_id)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let picks = body["picks"].as_array().unwrap();
    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0]["week"], 1);
    assert_eq!(picks[0]["team"]["code"], "NYG");
    assert_eq!(picks[0]["team"]["name"], "New York Giants");
    assert!(picks[0]["game"]["start_time"].is_string());
    assert_eq!(picks[1]["team"]["code"], "NE");
    assert_eq!(picks[1]["status"], "pending");
}

#[tokio::test]
async fn resolving_a_game_moves_the_picker_to_eliminated() {
    let app = setup().await;
    send(
        &app.router,
        post_json(
            "/api/picks/submit",
            submit_body(app.participant_id, 1, "DAL"),
            None,
        ),
    )
    .await;

    let (status, body) = send(&app.router, get("/api/leaderboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stillIn"].as_array().unwrap().len(), 1);
    assert!(body["eliminated"].as_array().unwrap().is_empty());

    let dal_game = &app.games[1];
    let (status, body) = send(
        &app.router,
        post_json(
            &format!("/api/games/{}/result", dal_game.game_id),
            json!({ "team": "DAL", "outcome": "win" }),
            Some(API_KEY),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["result"]["team"], "DAL");
    assert_eq!(body["updated_picks"][0]["status"], "win");
    assert_eq!(body["standings"]["still_in"], 0);
    assert_eq!(body["standings"]["eliminated"], 1);

    let (_, body) = send(&app.router, get("/api/leaderboard")).await;
    assert!(body["stillIn"].as_array().unwrap().is_empty());
    let eliminated = body["eliminated"].as_array().unwrap();
    assert_eq!(eliminated.len(), 1);
    assert_eq!(eliminated[0]["name"], "Alice");
    assert_eq!(eliminated[0]["eliminated"], true);
    assert_eq!(eliminated[0]["picks"][0]["team_code"], "DAL");
}

// ===========================================================================
// Feeds
// ===========================================================================

#[tokio::test]
async fn feeds_require_an_api_key() {
    let app = setup().await;
    let game = json!({
        "phase": "reg",
        "week": 3,
        "home_team": "KC",
        "away_team": "LV",
        "start_time": (Utc::now() + Duration::days(16)).to_rfc3339()
    });

    let (status, body) = send(&app.router, post_json("/api/games", game.clone(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let (status, _) = send(
        &app.router,
        post_json("/api/games", game.clone(), Some("wrong-key")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app.router, post_json("/api/games", game, Some(API_KEY))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["home_team"], "KC");

    let (status, body) = send(&app.router, get("/api/games?phase=reg&week=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn registering_a_participant_is_an_upsert() {
    let app = setup().await;
    let participant_id = Uuid::new_v4();
    let uri = format!("/api/participants/{}", participant_id);

    let put = |name: &str, key: Option<&str>| {
        let mut builder = Request::builder()
            .method("PUT")
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
        }
        builder
            .body(Body::from(json!({ "display_name": name }).to_string()))
            .unwrap()
    };

    let (status, _) = send(&app.router, put("Bob", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app.router, put("Bob", Some(API_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Bob");
    assert_eq!(body["eliminated"], false);

    send(&app.router, put("Robert", Some(API_KEY))).await;
    let (status, body) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Robert");
}
