use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use origin_quiz::{
    api,
    config::AppConfig,
    matcher::AnswerMatcher,
    reference::{CollegeDirectory, ReferenceTables},
    roster,
    state::{store::StatsStore, AppState},
    tasks,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "origin_quiz=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting NBA origin quiz...");

    let config = AppConfig::from_env();

    // Reference data
    let colleges = CollegeDirectory::load_or_empty(&config.colleges_path);
    let tables = match ReferenceTables::with_colleges(colleges) {
        Ok(tables) => tables,
        Err(e) => {
            tracing::error!("Invalid reference tables: {}", e);
            return;
        }
    };
    let matcher = AnswerMatcher::new(Arc::new(tables));
    let players = roster::load_or_sample(&config.players_path);

    let store = match StatsStore::open_or_memory(&config.stats_path).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open stats store: {}", e);
            return;
        }
    };

    let state = Arc::new(AppState::new(players, matcher, store));
    if !state.has_difficulty_data {
        tracing::warn!("Player data has no difficulty tiers; every game uses the full roster");
    }

    // Spawn background task for dropping abandoned sessions
    tasks::spawn_session_reaper(state.clone(), config.session_ttl);

    let app = api::router(state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
