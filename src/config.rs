//! Runtime configuration from environment variables

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Longest accepted idle timeout for quiz sessions
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// SQLite database holding leaderboard and per-user answer history
    pub stats_path: PathBuf,
    pub players_path: PathBuf,
    pub colleges_path: PathBuf,
    pub static_dir: PathBuf,
    /// Sessions idle longer than this are dropped
    pub session_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            stats_path: PathBuf::from("data/stats.db"),
            players_path: PathBuf::from("data/nba_players.json"),
            colleges_path: PathBuf::from("data/us_colleges.json"),
            static_dir: PathBuf::from("static"),
            session_ttl: Duration::from_secs(3600),
        }
    }
}

impl AppConfig {
    /// Load config from environment variables, defaulting anything unset
    ///
    /// - PORT
    /// - STATS_PATH
    /// - PLAYERS_PATH
    /// - COLLEGES_PATH
    /// - STATIC_DIR
    /// - SESSION_TTL_SECS
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed_var("PORT").unwrap_or(defaults.port),
            stats_path: path_var("STATS_PATH").unwrap_or(defaults.stats_path),
            players_path: path_var("PLAYERS_PATH").unwrap_or(defaults.players_path),
            colleges_path: path_var("COLLEGES_PATH").unwrap_or(defaults.colleges_path),
            static_dir: path_var("STATIC_DIR").unwrap_or(defaults.static_dir),
            session_ttl: parsed_var("SESSION_TTL_SECS")
                .and_then(session_ttl)
                .unwrap_or(defaults.session_ttl),
        }
    }
}

/// Zero would reap sessions as soon as they're created; huge values are capped
fn session_ttl(secs: u64) -> Option<Duration> {
    if secs == 0 {
        tracing::warn!("Ignoring SESSION_TTL_SECS=0, using default");
        return None;
    }
    let ttl = Duration::from_secs(secs);
    if ttl > MAX_SESSION_TTL {
        tracing::warn!(
            "SESSION_TTL_SECS={} exceeds {}s, capping",
            secs,
            MAX_SESSION_TTL.as_secs()
        );
        return Some(MAX_SESSION_TTL);
    }
    Some(ttl)
}

fn string_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn path_var(name: &str) -> Option<PathBuf> {
    string_var(name).map(PathBuf::from)
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = string_var(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "STATS_PATH",
        "PLAYERS_PATH",
        "COLLEGES_PATH",
        "STATIC_DIR",
        "SESSION_TTL_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        clear_env();
        let config = AppConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.stats_path, PathBuf::from("data/stats.db"));
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
    }

    #[test]
    #[serial]
    fn test_reads_and_trims_values() {
        clear_env();
        std::env::set_var("PORT", " 9000 ");
        std::env::set_var("STATS_PATH", "/tmp/quiz/stats.db");
        std::env::set_var("SESSION_TTL_SECS", "60");
        let config = AppConfig::from_env();
        assert_eq!(config.port, 9000);
        assert_eq!(config.stats_path, PathBuf::from("/tmp/quiz/stats.db"));
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back() {
        clear_env();
        std::env::set_var("PORT", "eighty");
        std::env::set_var("SESSION_TTL_SECS", "-5");
        std::env::set_var("PLAYERS_PATH", "   ");
        let config = AppConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.players_path, PathBuf::from("data/nba_players.json"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_session_ttl_rejects_zero_and_caps_huge_values() {
        clear_env();
        std::env::set_var("SESSION_TTL_SECS", "0");
        assert_eq!(AppConfig::from_env().session_ttl, Duration::from_secs(3600));

        std::env::set_var("SESSION_TTL_SECS", "1000000000000000");
        assert_eq!(AppConfig::from_env().session_ttl, MAX_SESSION_TTL);
        clear_env();
    }
}
