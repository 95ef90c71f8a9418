mod session;
pub mod store;

pub use session::{AnswerOutcome, GameSession, NewGame, Question, SessionStats};

use crate::matcher::AnswerMatcher;
use crate::roster;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use self::store::StatsStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<SessionId, GameSession>>>,
    /// Full roster; each session keeps its own difficulty-filtered pool
    pub roster: Arc<Vec<Player>>,
    /// Whether the roster carries difficulty tiers at all
    pub has_difficulty_data: bool,
    pub matcher: AnswerMatcher,
    pub store: Arc<StatsStore>,
}

impl AppState {
    pub fn new(roster: Vec<Player>, matcher: AnswerMatcher, store: StatsStore) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            has_difficulty_data: roster::has_difficulty_data(&roster),
            roster: Arc::new(roster),
            matcher,
            store: Arc::new(store),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
