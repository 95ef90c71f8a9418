//! NBA player roster loading

use std::path::Path;

use crate::reference::ReferenceError;
use crate::types::{OriginType, Player};

/// Load the roster written by the player-data fetch
pub fn load(path: &Path) -> Result<Vec<Player>, ReferenceError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ReferenceError::Parse {
        path: display,
        source,
    })
}

/// Load the roster, falling back to the built-in sample when the file is
/// missing or unreadable
pub fn load_or_sample(path: &Path) -> Vec<Player> {
    match load(path) {
        Ok(players) if !players.is_empty() => {
            tracing::info!("Loaded {} NBA players", players.len());
            players
        }
        Ok(_) => {
            tracing::warn!("{} has no players, using sample roster", path.display());
            sample()
        }
        Err(e) => {
            tracing::warn!("{}. Using sample roster.", e);
            sample()
        }
    }
}

/// Whether the roster carries difficulty tiers. Only the first few players are
/// inspected; a roster generated before tiers existed has none at all.
pub fn has_difficulty_data(players: &[Player]) -> bool {
    players.iter().take(5).any(|p| p.difficulty.is_some())
}

/// Small hand-written roster used when no generated data is available
pub fn sample() -> Vec<Player> {
    [
        ("LeBron James", "St. Vincent-St. Mary HS", OriginType::HighSchool),
        ("Stephen Curry", "Davidson", OriginType::College),
        ("Kevin Durant", "Texas", OriginType::College),
        ("Giannis Antetokounmpo", "Greece", OriginType::Country),
        ("Luka Dončić", "Slovenia", OriginType::Country),
        ("Nikola Jokić", "Serbia", OriginType::Country),
        ("Joel Embiid", "Cameroon", OriginType::Country),
        ("Damian Lillard", "Weber State", OriginType::College),
        ("Jayson Tatum", "Duke", OriginType::College),
        ("Anthony Davis", "Kentucky", OriginType::College),
    ]
    .into_iter()
    .map(|(name, origin, origin_type)| Player {
        name: name.to_string(),
        origin: origin.to_string(),
        origin_type,
        team: None,
        nba_conference: None,
        college_conference: None,
        alternate_answer: None,
        difficulty: None,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    #[test]
    fn test_sample_roster_has_no_tiers() {
        let players = sample();
        assert_eq!(players.len(), 10);
        assert!(!has_difficulty_data(&players));
    }

    #[test]
    fn test_load_generated_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nba_players.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "Rudy Gobert", "origin": "France", "type": "Country",
                 "team": "MIN", "nba_conference": "Western", "difficulty": "easy"},
                {"name": "Scoot Henderson", "origin": "G League Ignite", "type": "Other",
                 "alternate_answer": null, "difficulty": "medium"}
            ]"#,
        )
        .unwrap();

        let players = load_or_sample(&path);
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].origin_type, OriginType::Country);
        assert_eq!(players[0].difficulty, Some(Difficulty::Easy));
        assert!(has_difficulty_data(&players));
    }

    #[test]
    fn test_missing_or_empty_roster_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(load_or_sample(&missing).len(), 10);

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert_eq!(load_or_sample(&empty).len(), 10);
    }
}
