use super::*;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::time::Duration;

/// One quiz run
#[derive(Debug, Clone)]
pub struct GameSession {
    pub score: u32,
    pub total: u32,
    pub difficulty: Difficulty,
    pub available_players: Vec<Player>,
    /// Names already asked in the current pass over the pool
    pub used_players: Vec<String>,
    pub current_player: Option<Player>,
    pub conference_stats: ConferenceStats,
    pub last_active: DateTime<Utc>,
}

impl GameSession {
    fn new(difficulty: Difficulty, available_players: Vec<Player>) -> Self {
        Self {
            score: 0,
            total: 0,
            difficulty,
            available_players,
            used_players: Vec::new(),
            current_player: None,
            conference_stats: ConferenceStats::default(),
            last_active: Utc::now(),
        }
    }

    /// Pick a random player not yet asked, starting over once the pool is used up
    fn pick_player(&mut self) -> Option<Player> {
        let mut unused: Vec<&Player> = self
            .available_players
            .iter()
            .filter(|p| !self.used_players.contains(&p.name))
            .collect();
        if unused.is_empty() {
            self.used_players.clear();
            unused = self.available_players.iter().collect();
        }

        let player = unused.choose(&mut rand::rng()).map(|p| (*p).clone())?;
        self.used_players.push(player.name.clone());
        self.current_player = Some(player.clone());
        Some(player)
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGame {
    pub session_id: SessionId,
    pub player_count: usize,
    pub has_difficulty_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub player_name: String,
    pub team: String,
    pub nba_conference: String,
    pub question_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Accepted answer(s) for display, e.g. "G League Ignite or France"
    pub answer: String,
    pub origin_type: OriginType,
    pub college_conference: Option<String>,
    pub nba_conference: Option<String>,
    pub player_name: String,
    pub player_team: Option<String>,
    pub score: u32,
    pub total: u32,
    pub conference_stats: ConferenceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
}

impl AppState {
    /// Start a session over the players admitted by `difficulty`
    pub async fn new_game(&self, difficulty: Difficulty) -> Result<NewGame, ApiError> {
        let pool: Vec<Player> = if self.has_difficulty_data {
            self.roster
                .iter()
                .filter(|p| difficulty.admits(p.difficulty))
                .cloned()
                .collect()
        } else {
            tracing::debug!("Roster has no difficulty tiers, using all players");
            self.roster.to_vec()
        };

        if pool.is_empty() {
            return Err(ApiError::NoPlayers(difficulty.as_str().to_string()));
        }

        let session_id = ulid::Ulid::new().to_string();
        let player_count = pool.len();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), GameSession::new(difficulty, pool));

        tracing::info!(
            "New {} game {} with {} players",
            difficulty.as_str(),
            session_id,
            player_count
        );

        Ok(NewGame {
            session_id,
            player_count,
            has_difficulty_data: self.has_difficulty_data,
        })
    }

    pub async fn next_question(&self, session_id: &str) -> Result<Question, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or(ApiError::InvalidSession)?;
        session.touch();

        let player = session
            .pick_player()
            .ok_or_else(|| ApiError::NoPlayers(session.difficulty.as_str().to_string()))?;

        Ok(Question {
            player_name: player.name,
            team: player.team.unwrap_or_default(),
            nba_conference: player.nba_conference.unwrap_or_default(),
            question_number: session.total + 1,
        })
    }

    /// Grade an answer to the current question. The question is consumed, so a
    /// second submit without a new question fails with `NoActiveQuestion`.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerOutcome, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or(ApiError::InvalidSession)?;
        session.touch();

        let player = session
            .current_player
            .as_ref()
            .ok_or(ApiError::NoActiveQuestion)?;
        if player.origin.trim().is_empty() {
            return Err(ApiError::IncompletePlayer(player.name.clone()));
        }
        let Some(player) = session.current_player.take() else {
            return Err(ApiError::NoActiveQuestion);
        };

        let answer = answer.trim();
        let context = player.origin_context();
        let mut correct =
            self.matcher
                .is_match(answer, &player.origin, player.origin_type, Some(&context));

        if !correct {
            if let Some(alt) = player.alternate_answer.as_deref().filter(|a| !a.is_empty()) {
                correct = self
                    .matcher
                    .is_match(answer, alt, OriginType::Country, Some(&context));
            }
        }

        session.total += 1;
        if correct {
            session.score += 1;
        }
        session.conference_stats.record(
            player.nba_conference.as_deref(),
            player.college_conference.as_deref(),
            correct,
        );

        tracing::debug!(
            session = session_id,
            player = %player.name,
            correct,
            "Answer graded"
        );

        Ok(AnswerOutcome {
            correct,
            answer: player.answer_display(),
            origin_type: player.origin_type,
            college_conference: player.college_conference,
            nba_conference: player.nba_conference,
            player_name: player.name,
            player_team: player.team,
            score: session.score,
            total: session.total,
            conference_stats: session.conference_stats.clone(),
        })
    }

    pub async fn stats(&self, session_id: &str) -> Result<SessionStats, ApiError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id).ok_or(ApiError::InvalidSession)?;
        Ok(SessionStats {
            score: session.score,
            total: session.total,
            percentage: percentage(session.score, session.total),
        })
    }

    /// Drop sessions idle for longer than `ttl`, returning how many were removed.
    /// A TTL reaching back past the earliest representable time removes nothing.
    pub async fn reap_idle_sessions(&self, ttl: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl))
        else {
            return 0;
        };
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_active >= cutoff);
        before - sessions.len()
    }
}
