//! HTTP API for the quiz front end.
//!
//! Session endpoints take the session id in the JSON body; stats endpoints
//! read and write the persistent store. Failures are `{"error": "..."}`.

use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::store::{NewScore, NewUserStat, RankedScore, UserStatsReport};
use crate::state::{AnswerOutcome, AppState, NewGame, Question, SessionStats};
use crate::types::Difficulty;

#[derive(Debug, Default, Deserialize)]
pub struct NewGameRequest {
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveScoreRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub game_mode: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SaveUserStatRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub player_team: Option<String>,
    #[serde(default)]
    pub nba_conference: Option<String>,
    #[serde(default)]
    pub college_conference: Option<String>,
    /// Clients send either a boolean or 0/1
    #[serde(default, deserialize_with = "bool_or_int")]
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<RankedScore>,
}

/// JSON body extractor whose failures render as `{"error": "..."}`.
///
/// Content type is not enforced and an empty body reads as `{}`, so a bare
/// `POST /api/new-game` starts a game with defaults.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
        parse_body(&bytes).map(ApiJson)
    }
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let body = if bytes.trim_ascii().is_empty() {
        b"{}".as_slice()
    } else {
        bytes
    };
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

fn bool_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

/// Trimmed, non-empty value of an optional field
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn session_id(id: Option<String>) -> Result<String, ApiError> {
    present(id).ok_or(ApiError::InvalidSession)
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Start a new quiz session.
///
/// POST /api/new-game
pub async fn new_game(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewGameRequest>,
) -> Result<Json<NewGame>, ApiError> {
    let difficulty = Difficulty::parse_lenient(req.difficulty.as_deref());
    Ok(Json(state.new_game(difficulty).await?))
}

/// POST /api/next-question
pub async fn next_question(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SessionRequest>,
) -> Result<Json<Question>, ApiError> {
    let id = session_id(req.session_id)?;
    Ok(Json(state.next_question(&id).await?))
}

/// POST /api/submit-answer
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SubmitAnswerRequest>,
) -> Result<Json<AnswerOutcome>, ApiError> {
    let id = session_id(req.session_id)?;
    Ok(Json(state.submit_answer(&id, &req.answer).await?))
}

/// POST /api/stats
pub async fn session_stats(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SessionRequest>,
) -> Result<Json<SessionStats>, ApiError> {
    let id = session_id(req.session_id)?;
    Ok(Json(state.stats(&id).await?))
}

/// Record a finished game on the leaderboard.
///
/// POST /api/leaderboard/save
pub async fn save_score(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SaveScoreRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(game_mode), Some(score), Some(total)) = (present(req.game_mode), req.score, req.total)
    else {
        return Err(ApiError::MissingFields);
    };

    let display_name = present(req.display_name).unwrap_or_else(|| "Anonymous".to_string());
    let difficulty = present(req.difficulty).unwrap_or_else(|| "hard".to_string());
    tracing::info!(
        "Saving {}/{} for {} on {}-{}",
        score,
        total,
        display_name,
        game_mode,
        difficulty
    );

    state
        .store
        .save_score(NewScore {
            display_name,
            game_mode,
            difficulty,
            score,
            total,
        })
        .await
        .map_err(ApiError::storage("Failed to save score"))?;
    Ok(success())
}

/// Top ten for a leaderboard key such as `quick10-easy`.
///
/// GET /api/leaderboard/{game_mode}
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Path(game_mode): Path<String>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let leaderboard = state
        .store
        .top_scores(&game_mode)
        .await
        .map_err(ApiError::storage("Failed to fetch leaderboard"))?;
    Ok(Json(LeaderboardResponse { leaderboard }))
}

/// Record one answered question for a named user.
///
/// POST /api/user-stats/save
pub async fn save_user_stat(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SaveUserStatRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(display_name), Some(player_name)) =
        (present(req.display_name), present(req.player_name))
    else {
        return Err(ApiError::MissingFields);
    };

    state
        .store
        .save_user_stat(NewUserStat {
            display_name,
            player_name,
            player_team: present(req.player_team),
            nba_conference: present(req.nba_conference),
            college_conference: present(req.college_conference),
            correct: req.correct,
        })
        .await
        .map_err(ApiError::storage("Failed to save stat"))?;
    Ok(success())
}

/// GET /api/user-stats/{display_name}
pub async fn user_stats(
    State(state): State<Arc<AppState>>,
    Path(display_name): Path<String>,
) -> Result<Json<UserStatsReport>, ApiError> {
    let report = state
        .store
        .user_stats(&display_name)
        .await
        .map_err(ApiError::storage("Failed to fetch stats"))?;
    Ok(Json(report))
}

/// All API routes plus static files from `static_dir`
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<std::path::Path>) -> Router {
    Router::new()
        .route("/api/new-game", post(new_game))
        .route("/api/next-question", post(next_question))
        .route("/api/submit-answer", post(submit_answer))
        .route("/api/stats", post(session_stats))
        .route("/api/leaderboard/save", post(save_score))
        .route("/api/leaderboard/{game_mode}", get(leaderboard))
        .route("/api/user-stats/save", post(save_user_stat))
        .route("/api/user-stats/{display_name}", get(user_stats))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
