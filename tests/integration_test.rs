use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use origin_quiz::api;
use origin_quiz::matcher::AnswerMatcher;
use origin_quiz::reference::{CollegeDirectory, ReferenceTables};
use origin_quiz::state::store::StatsStore;
use origin_quiz::state::AppState;
use origin_quiz::types::{Difficulty, OriginType, Player};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const COLLEGES: &str = r#"{"colleges": {
    "duke": {"conference": "ACC"},
    "duke university": {"conference": "ACC"},
    "kentucky": {"conference": "SEC"},
    "university of kentucky": {"conference": "SEC"}
}}"#;

fn roster() -> Vec<Player> {
    vec![Player {
        name: "Jayson Tatum".to_string(),
        origin: "Duke".to_string(),
        origin_type: OriginType::College,
        team: Some("BOS".to_string()),
        nba_conference: Some("Eastern".to_string()),
        college_conference: Some("ACC".to_string()),
        alternate_answer: None,
        difficulty: Some(Difficulty::Easy),
    }]
}

fn app_with(store: StatsStore) -> Router {
    let colleges = CollegeDirectory::from_json(COLLEGES).unwrap();
    let matcher = AnswerMatcher::new(Arc::new(ReferenceTables::with_colleges(colleges).unwrap()));
    let state = Arc::new(AppState::new(roster(), matcher, store));
    api::router(state, "static")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

/// End-to-end flow: new game, a right and a wrong answer, stats
#[tokio::test]
async fn test_full_quiz_flow() {
    let app = app_with(StatsStore::in_memory().await.unwrap());

    let (status, game) = post(&app, "/api/new-game", json!({"difficulty": "easy"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["player_count"], 1);
    assert_eq!(game["has_difficulty_data"], true);
    let session_id = game["session_id"].as_str().unwrap().to_string();

    let (status, question) = post(
        &app,
        "/api/next-question",
        json!({"session_id": session_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(question["player_name"], "Jayson Tatum");
    assert_eq!(question["team"], "BOS");
    assert_eq!(question["question_number"], 1);

    let (status, outcome) = post(
        &app,
        "/api/submit-answer",
        json!({"session_id": session_id, "answer": "Duke University"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["correct"], true);
    assert_eq!(outcome["answer"], "Duke");
    assert_eq!(outcome["origin_type"], "College");
    assert_eq!(outcome["conference_stats"]["college"]["ACC"]["correct"], 1);
    assert_eq!(outcome["conference_stats"]["nba"]["Western"]["total"], 0);

    post(&app, "/api/next-question", json!({"session_id": session_id})).await;
    let (_, outcome) = post(
        &app,
        "/api/submit-answer",
        json!({"session_id": session_id, "answer": "Kentucky"}),
    )
    .await;
    assert_eq!(outcome["correct"], false);
    assert_eq!(outcome["score"], 1);
    assert_eq!(outcome["total"], 2);

    let (status, stats) = post(&app, "/api/stats", json!({"session_id": session_id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({"score": 1, "total": 2, "percentage": 50.0}));
}

#[tokio::test]
async fn test_session_errors() {
    let app = app_with(StatsStore::in_memory().await.unwrap());

    let (status, body) = post(&app, "/api/next-question", json!({"session_id": "bogus"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid session");

    let (status, _) = post(&app, "/api/stats", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, game) = post(&app, "/api/new-game", json!({})).await;
    let session_id = game["session_id"].as_str().unwrap();
    let (status, body) = post(
        &app,
        "/api/submit-answer",
        json!({"session_id": session_id, "answer": "Duke"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No active question");
}

#[tokio::test]
async fn test_new_game_without_body_uses_defaults() {
    let app = app_with(StatsStore::in_memory().await.unwrap());
    let (status, game) = send(&app, "POST", "/api/new-game", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["player_count"], 1);
    assert!(game["session_id"].is_string());
}

#[tokio::test]
async fn test_malformed_body_returns_json_error() {
    let app = app_with(StatsStore::in_memory().await.unwrap());
    let request = Request::builder()
        .method("POST")
        .uri("/api/submit-answer")
        .header("content-type", "application/json")
        .body(Body::from("{\"session_id\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_medium_includes_easy_players() {
    let app = app_with(StatsStore::in_memory().await.unwrap());
    let (status, body) = post(&app, "/api/new-game", json!({"difficulty": "medium"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player_count"], 1);
}

#[tokio::test]
async fn test_leaderboard_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = StatsStore::open(&dir.path().join("stats.db")).await.unwrap();
    let app = app_with(store);

    let (status, _) = post(
        &app,
        "/api/leaderboard/save",
        json!({"display_name": "ann", "game_mode": "quick10", "difficulty": "easy", "score": 8, "total": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    post(
        &app,
        "/api/leaderboard/save",
        json!({"game_mode": "quick10", "difficulty": "easy", "score": 9, "total": 12}),
    )
    .await;

    let (status, body) = get(&app, "/api/leaderboard/quick10-easy").await;
    assert_eq!(status, StatusCode::OK);
    let board = body["leaderboard"].as_array().unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["display_name"], "Anonymous");
    assert_eq!(board[0]["percentage"], 75.0);
    assert_eq!(board[1]["rank"], 2);

    let (_, body) = get(&app, "/api/leaderboard/survival-hard").await;
    assert_eq!(body, json!({"leaderboard": []}));

    let (status, body) = post(
        &app,
        "/api/leaderboard/save",
        json!({"display_name": "ann", "score": 8, "total": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    assert!(dir.path().join("stats.db").exists());
}

#[tokio::test]
async fn test_user_stats_round_trip() {
    let app = app_with(StatsStore::in_memory().await.unwrap());

    for correct in [1, 0, 1] {
        let (status, body) = post(
            &app,
            "/api/user-stats/save",
            json!({
                "display_name": "ann",
                "player_name": "Jayson Tatum",
                "player_team": "BOS",
                "nba_conference": "Eastern",
                "college_conference": "ACC",
                "correct": correct
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }

    let (status, body) = get(&app, "/api/user-stats/ann").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall"], json!({"total": 3, "correct": 2, "percentage": 66.7}));
    assert_eq!(body["teams"][0]["team"], "BOS");
    assert_eq!(body["conferences"][0]["conference"], "ACC");
    assert_eq!(body["missed_players"][0]["player"], "Jayson Tatum");
    assert_eq!(body["missed_players"][0]["attempts"], 3);
    assert_eq!(body["recent_history"].as_array().unwrap().len(), 3);

    let (status, _) = post(
        &app,
        "/api/user-stats/save",
        json!({"display_name": "ann"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_path_falls_through_to_static_files() {
    let app = app_with(StatsStore::in_memory().await.unwrap());
    let (status, _) = get(&app, "/does-not-exist.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
