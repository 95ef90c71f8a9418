//! Leaderboard and per-user answer history, kept in SQLite.
//!
//! Each save is a single-row insert; reports are computed by SQL at read time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::types::{percentage, round1, LeaderboardKey};

const LEADERBOARD_LIMIT: i64 = 10;
const MISSED_PLAYERS_LIMIT: i64 = 10;
const RECENT_HISTORY_LIMIT: i64 = 50;
/// Groups with fewer answers than this are too noisy to report
const MIN_GROUP_ANSWERS: i64 = 3;
const MIN_MISSED_ATTEMPTS: i64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Stats directory could not be created: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stats database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stats database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// A finished game to record
#[derive(Debug, Clone)]
pub struct NewScore {
    pub display_name: String,
    pub game_mode: String,
    pub difficulty: String,
    pub score: u32,
    pub total: u32,
}

/// One answered question to record
#[derive(Debug, Clone)]
pub struct NewUserStat {
    pub display_name: String,
    pub player_name: String,
    pub player_team: Option<String>,
    pub nba_conference: Option<String>,
    pub college_conference: Option<String>,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedScore {
    pub rank: usize,
    pub display_name: String,
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub total: u32,
    pub correct: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStats {
    pub team: String,
    pub total: u32,
    pub correct: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferenceAccuracy {
    pub conference: String,
    pub total: u32,
    pub correct: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissedPlayer {
    pub player: String,
    pub attempts: u32,
    pub correct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub correct: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatsReport {
    pub overall: OverallStats,
    pub teams: Vec<TeamStats>,
    pub conferences: Vec<ConferenceAccuracy>,
    pub missed_players: Vec<MissedPlayer>,
    pub recent_history: Vec<HistoryPoint>,
}

/// Leaderboards are split by mode and difficulty, e.g. "quick10-easy"
pub fn leaderboard_key(game_mode: &str, difficulty: &str) -> LeaderboardKey {
    format!("{}-{}", game_mode, difficulty)
}

/// SQLite integers back into the u32 counts used everywhere else
fn count(n: i64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone)]
pub struct StatsStore {
    pool: SqlitePool,
}

impl StatsStore {
    /// Open (creating if needed) the database at `path` and run migrations
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::migrated(pool).await
    }

    /// A private database that lives as long as the store
    pub async fn in_memory() -> Result<Self, StoreError> {
        // every in-memory connection is its own database, so keep exactly one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::migrated(pool).await
    }

    /// Open the database, or keep stats in memory if it can't be used
    pub async fn open_or_memory(path: &Path) -> Result<Self, StoreError> {
        match Self::open(path).await {
            Ok(store) => {
                tracing::info!("Stats store ready at {}", path.display());
                Ok(store)
            }
            Err(e) => {
                tracing::error!("Stats store unavailable at {}: {}", path.display(), e);
                tracing::warn!("Leaderboard and user stats will not be persisted");
                Self::in_memory().await
            }
        }
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn save_score(&self, new: NewScore) -> Result<(), StoreError> {
        let percentage = if new.total > 0 {
            f64::from(new.score) / f64::from(new.total) * 100.0
        } else {
            0.0
        };

        let key = leaderboard_key(&new.game_mode, &new.difficulty);
        sqlx::query(
            // language=SQLite
            r#"
                INSERT INTO leaderboard (display_name, game_mode, score, total, percentage, timestamp)
                VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.display_name)
        .bind(key)
        .bind(i64::from(new.score))
        .bind(i64::from(new.total))
        .bind(percentage)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Ten best results for a leaderboard key, ranked from 1
    pub async fn top_scores(&self, key: &str) -> Result<Vec<RankedScore>, StoreError> {
        let rows: Vec<(String, i64, i64, f64, DateTime<Utc>)> = sqlx::query_as(
            // language=SQLite
            r#"
                SELECT display_name, score, total, percentage, timestamp
                FROM leaderboard
                WHERE game_mode = ?
                ORDER BY score DESC, percentage DESC, timestamp ASC, id ASC
                LIMIT ?
            "#,
        )
        .bind(key)
        .bind(LEADERBOARD_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(
                |(i, (display_name, score, total, pct, timestamp))| RankedScore {
                    rank: i + 1,
                    display_name,
                    score: count(score),
                    total: count(total),
                    percentage: round1(pct),
                    timestamp,
                },
            )
            .collect())
    }

    pub async fn save_user_stat(&self, new: NewUserStat) -> Result<(), StoreError> {
        sqlx::query(
            // language=SQLite
            r#"
                INSERT INTO user_stats
                    (display_name, player_name, player_team, nba_conference,
                     college_conference, correct, timestamp)
                VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.display_name)
        .bind(new.player_name)
        .bind(new.player_team)
        .bind(new.nba_conference)
        .bind(new.college_conference)
        .bind(new.correct)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn user_stats(&self, display_name: &str) -> Result<UserStatsReport, StoreError> {
        let (total, correct): (i64, i64) = sqlx::query_as(
            // language=SQLite
            r#"
                SELECT COUNT(*), COALESCE(SUM(correct), 0)
                FROM user_stats
                WHERE display_name = ?
            "#,
        )
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;
        let (total, correct) = (count(total), count(correct));

        let teams = self
            .group_accuracy(display_name, GroupColumn::Team)
            .await?
            .into_iter()
            .map(|(team, total, correct)| TeamStats {
                team,
                total,
                correct,
                percentage: percentage(correct, total),
            })
            .collect();

        let conferences = self
            .group_accuracy(display_name, GroupColumn::CollegeConference)
            .await?
            .into_iter()
            .map(|(conference, total, correct)| ConferenceAccuracy {
                conference,
                total,
                correct,
                percentage: percentage(correct, total),
            })
            .collect();

        Ok(UserStatsReport {
            overall: OverallStats {
                total,
                correct,
                percentage: percentage(correct, total),
            },
            teams,
            conferences,
            missed_players: self.missed_players(display_name).await?,
            recent_history: self.recent_history(display_name).await?,
        })
    }

    /// Groups with enough answers, best accuracy first
    async fn group_accuracy(
        &self,
        display_name: &str,
        column: GroupColumn,
    ) -> Result<Vec<(String, u32, u32)>, StoreError> {
        let column = column.as_sql();
        let sql = format!(
            r#"
                SELECT {column}, COUNT(*), SUM(correct)
                FROM user_stats
                WHERE display_name = ? AND {column} IS NOT NULL
                GROUP BY {column}
                HAVING COUNT(*) >= ?
                ORDER BY CAST(SUM(correct) AS REAL) / COUNT(*) DESC, {column} ASC
            "#
        );
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(&sql)
            .bind(display_name)
            .bind(MIN_GROUP_ANSWERS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(name, total, correct)| (name, count(total), count(correct)))
            .collect())
    }

    /// Players answered at least twice and not always right, worst first
    async fn missed_players(&self, display_name: &str) -> Result<Vec<MissedPlayer>, StoreError> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            // language=SQLite
            r#"
                SELECT player_name, COUNT(*), SUM(correct)
                FROM user_stats
                WHERE display_name = ?
                GROUP BY player_name
                HAVING COUNT(*) >= ? AND SUM(correct) < COUNT(*)
                ORDER BY CAST(SUM(correct) AS REAL) / COUNT(*) ASC, COUNT(*) DESC, player_name ASC
                LIMIT ?
            "#,
        )
        .bind(display_name)
        .bind(MIN_MISSED_ATTEMPTS)
        .bind(MISSED_PLAYERS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(player, attempts, correct)| MissedPlayer {
                player,
                attempts: count(attempts),
                correct: count(correct),
            })
            .collect())
    }

    /// Last answers, oldest first
    async fn recent_history(&self, display_name: &str) -> Result<Vec<HistoryPoint>, StoreError> {
        let mut rows: Vec<(bool, DateTime<Utc>)> = sqlx::query_as(
            // language=SQLite
            r#"
                SELECT correct, timestamp
                FROM user_stats
                WHERE display_name = ?
                ORDER BY id DESC
                LIMIT ?
            "#,
        )
        .bind(display_name)
        .bind(RECENT_HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        rows.reverse();

        Ok(rows
            .into_iter()
            .map(|(correct, timestamp)| HistoryPoint { correct, timestamp })
            .collect())
    }
}

/// Columns a user's answers can be grouped by
#[derive(Debug, Clone, Copy)]
enum GroupColumn {
    Team,
    CollegeConference,
}

impl GroupColumn {
    fn as_sql(self) -> &'static str {
        match self {
            GroupColumn::Team => "player_team",
            GroupColumn::CollegeConference => "college_conference",
        }
    }
}
