//! Read-only reference tables backing the answer matcher.
//!
//! Three tables are loaded once at startup and shared immutably:
//! - school abbreviations ("uconn" -> "connecticut")
//! - special developmental programs (G League Ignite, Overtime Elite)
//! - the college directory (name variant -> conference)

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Errors raised while building reference tables
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Duplicate abbreviation key '{0}'")]
    DuplicateAbbreviation(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Common school abbreviations mapping to their expanded names
const BUILTIN_ABBREVIATIONS: &[(&str, &str)] = &[
    ("uconn", "connecticut"),
    ("k state", "kansas state"),
    ("k-state", "kansas state"),
    ("vt", "virginia tech"),
    ("ku", "kansas"),
    ("uk", "kentucky"),
    ("unlv", "nevada las vegas"),
    // Could also be South Carolina; the college directory disambiguates
    ("usc", "southern california"),
    ("fsu", "florida state"),
    ("osu", "ohio state"),
    ("asu", "arizona state"),
    ("lsu", "louisiana state"),
    ("tcu", "texas christian"),
    ("smu", "southern methodist"),
    ("byu", "brigham young"),
    ("ucf", "central florida"),
    ("vcu", "virginia commonwealth"),
    ("ucla", "california los angeles"),
    ("ucsb", "california santa barbara"),
    ("ucsd", "california san diego"),
    ("uci", "california irvine"),
    ("ucd", "california davis"),
    ("ucr", "california riverside"),
    ("unc", "north carolina"),
    ("uva", "virginia"),
    ("psu", "penn state"),
    ("msu", "michigan state"),
    ("iu", "indiana"),
    ("ttu", "texas tech"),
    ("ksu", "kansas state"),
    ("wvu", "west virginia"),
    ("uga", "georgia"),
    ("ua", "arizona"),
    ("uf", "florida"),
    ("ut", "texas"),
    ("ou", "oklahoma"),
    ("gw", "george washington"),
    ("gmu", "george mason"),
    ("sju", "st johns"),
    ("bc", "boston college"),
    ("nd", "notre dame"),
    ("gt", "georgia tech"),
    ("usa", "united states"),
];

/// Accepted names for non-traditional pathways (G League Ignite, Overtime Elite)
const BUILTIN_SPECIAL_PROGRAMS: &[&str] =
    &["g league ignite", "ignite", "overtime elite", "ot elite"];

/// Fragments that mark an origin string as a special program
const SPECIAL_PROGRAM_MARKERS: &[&str] = &["ignite", "overtime elite"];

/// Lowercase and drop all whitespace, the form abbreviations are keyed by
pub fn space_collapsed(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercase, trim and collapse runs of whitespace to a single space
fn space_normalized(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Default)]
pub struct SchoolAbbreviations {
    expansions: HashMap<String, String>,
}

impl SchoolAbbreviations {
    /// Build from (abbreviation, expansion) pairs. Keys are space-collapsed and
    /// must stay unique after that.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ReferenceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut expansions = HashMap::new();
        for (abbr, expansion) in pairs {
            let key = space_collapsed(abbr.as_ref());
            let value = space_normalized(expansion.as_ref());
            if expansions.insert(key.clone(), value).is_some() {
                return Err(ReferenceError::DuplicateAbbreviation(key));
            }
        }
        Ok(Self { expansions })
    }

    pub fn builtin() -> Result<Self, ReferenceError> {
        Self::from_pairs(BUILTIN_ABBREVIATIONS.iter().copied())
    }

    /// Look up an already space-collapsed key
    pub fn expand(&self, collapsed: &str) -> Option<&str> {
        self.expansions.get(collapsed).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.expansions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expansions.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpecialPrograms {
    aliases: HashSet<String>,
}

impl SpecialPrograms {
    pub fn builtin() -> Self {
        let aliases = BUILTIN_SPECIAL_PROGRAMS
            .iter()
            .map(|alias| alias.to_string())
            .collect();
        Self { aliases }
    }

    pub fn is_alias(&self, alias: &str) -> bool {
        self.aliases.contains(alias)
    }

    /// Whether a lowercase origin string names a special program
    pub fn is_program_origin(&self, origin: &str) -> bool {
        self.is_alias(origin) || SPECIAL_PROGRAM_MARKERS.iter().any(|m| origin.contains(m))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollegeEntry {
    /// Entries scraped without a conference are kept; the matcher treats
    /// them as a lookup miss.
    #[serde(default)]
    pub conference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CollegeFile {
    #[serde(default)]
    colleges: HashMap<String, CollegeEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct CollegeDirectory {
    entries: HashMap<String, CollegeEntry>,
}

impl CollegeDirectory {
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, CollegeEntry)>,
        K: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, entry)| (space_normalized(name.as_ref()), entry))
            .collect();
        Self { entries }
    }

    /// Parse the `{"colleges": {...}}` document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: CollegeFile = serde_json::from_str(json)?;
        Ok(Self::from_entries(file.colleges))
    }

    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ReferenceError::Parse {
            path: display,
            source,
        })
    }

    /// Load the directory, or fall back to an empty one. Without it the
    /// college same-school rule never fires, which only makes matching stricter.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(directory) => {
                tracing::info!(
                    "Loaded {} college variations for answer matching",
                    directory.len()
                );
                directory
            }
            Err(e) => {
                tracing::warn!("{}. College name matching will be limited.", e);
                Self::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CollegeEntry> {
        self.entries.get(&space_normalized(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the matcher reads, bundled for injection
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub abbreviations: SchoolAbbreviations,
    pub programs: SpecialPrograms,
    pub colleges: CollegeDirectory,
}

impl ReferenceTables {
    pub fn new(
        abbreviations: SchoolAbbreviations,
        programs: SpecialPrograms,
        colleges: CollegeDirectory,
    ) -> Self {
        Self {
            abbreviations,
            programs,
            colleges,
        }
    }

    /// Built-in abbreviation and program tables around a given directory
    pub fn with_colleges(colleges: CollegeDirectory) -> Result<Self, ReferenceError> {
        Ok(Self::new(
            SchoolAbbreviations::builtin()?,
            SpecialPrograms::builtin(),
            colleges,
        ))
    }
}
