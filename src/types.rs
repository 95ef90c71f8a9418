use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type LeaderboardKey = String;

/// What kind of place a player's origin names
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OriginType {
    College,
    Country,
    #[serde(rename = "High School")]
    HighSchool,
    #[default]
    #[serde(other)]
    Other,
}

impl OriginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginType::College => "College",
            OriginType::Country => "Country",
            OriginType::HighSchool => "High School",
            OriginType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a requested difficulty. Anything unrecognized plays the full roster.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("easy") => Difficulty::Easy,
            Some("medium") => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Whether a player tiered at `tier` belongs in a game of this difficulty
    pub fn admits(&self, tier: Option<Difficulty>) -> bool {
        match self {
            Difficulty::Easy => tier == Some(Difficulty::Easy),
            Difficulty::Medium => matches!(tier, Some(Difficulty::Easy | Difficulty::Medium)),
            Difficulty::Hard => true,
        }
    }
}

/// A roster entry as produced by the player-data fetch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub origin: String,
    #[serde(rename = "type", default)]
    pub origin_type: OriginType,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub nba_conference: Option<String>,
    #[serde(default)]
    pub college_conference: Option<String>,
    /// Home country for special-program players (G League Ignite, Overtime Elite)
    #[serde(default)]
    pub alternate_answer: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl Player {
    pub fn origin_context(&self) -> PlayerOrigin {
        PlayerOrigin {
            origin: self.origin.clone(),
            alternate_answer: self.alternate_answer.clone(),
            origin_type: self.origin_type,
        }
    }

    /// "origin" or "origin or alternate" for display after an answer
    pub fn answer_display(&self) -> String {
        match self.alternate_answer.as_deref() {
            Some(alt) if !alt.is_empty() => format!("{} or {}", self.origin, alt),
            _ => self.origin.clone(),
        }
    }
}

/// Player context handed to the answer matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerOrigin {
    pub origin: String,
    pub alternate_answer: Option<String>,
    pub origin_type: OriginType,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }
}

/// Per-session accuracy split by NBA and college conference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConferenceStats {
    pub nba: BTreeMap<String, Tally>,
    pub college: BTreeMap<String, Tally>,
}

impl Default for ConferenceStats {
    fn default() -> Self {
        let nba = ["Eastern", "Western"]
            .into_iter()
            .map(|c| (c.to_string(), Tally::default()))
            .collect();
        Self {
            nba,
            college: BTreeMap::new(),
        }
    }
}

impl ConferenceStats {
    /// Only the two known NBA conferences are tracked; college conferences
    /// are created on first sight.
    pub fn record(&mut self, nba: Option<&str>, college: Option<&str>, correct: bool) {
        if let Some(tally) = nba.and_then(|c| self.nba.get_mut(c)) {
            tally.record(correct);
        }
        if let Some(conf) = college.filter(|c| !c.is_empty()) {
            self.college.entry(conf.to_string()).or_default().record(correct);
        }
    }
}

/// Percentage rounded to one decimal, 0 when nothing was attempted
pub fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(f64::from(correct) / f64::from(total) * 100.0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
