//! Same-school resolution for college answers.
//!
//! Two names found in the college directory are compared by conference first,
//! then by their keyword sets. The sub-rules below are empirically tuned and run
//! in a fixed order; the first one that returns a verdict other than `Pass` wins.

use std::collections::BTreeSet;

use super::{MatchError, Verdict};
use crate::reference::CollegeDirectory;

/// Words that don't identify a school
const STOP_WORDS: &[&str] = &[
    "university",
    "of",
    "the",
    "at",
    "state",
    "college",
    "and",
    "a",
    "an",
];

/// Raw strings at or below this length are treated as abbreviations
const ABBREVIATION_MAX_LEN: usize = 4;

/// Shared by UCLA, UCSB, USC and friends, so overlap on it alone proves nothing
const AMBIGUOUS_KEYWORD: &str = "california";

/// Both sides of a college comparison
#[derive(Debug, Clone, Copy)]
pub struct CollegePair<'a> {
    pub user_raw: &'a str,
    pub correct_raw: &'a str,
    pub user_expanded: &'a str,
    pub correct_expanded: &'a str,
}

impl CollegePair<'_> {
    fn user_is_abbreviation(&self) -> bool {
        self.user_raw.chars().count() <= ABBREVIATION_MAX_LEN
    }

    fn correct_is_abbreviation(&self) -> bool {
        self.correct_raw.chars().count() <= ABBREVIATION_MAX_LEN
    }
}

type SubRule = fn(&CollegePair<'_>, &Keywords<'_>) -> Verdict;

/// Keyword sets of both expanded names
#[derive(Debug)]
pub struct Keywords<'a> {
    pub user: BTreeSet<&'a str>,
    pub correct: BTreeSet<&'a str>,
}

const SUB_RULES: &[(&str, SubRule)] = &[
    ("college.full_name_keywords", full_name_keywords),
    ("college.abbreviation_overlap", abbreviation_overlap),
    ("college.abbreviation_substring", abbreviation_substring),
];

/// Split on whitespace and hyphens, drop stop words
fn keywords(name: &str) -> BTreeSet<&str> {
    name.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .collect()
}

/// Run the college rule. `Ok(None)` means the rule does not apply or no
/// sub-rule decided; the caller moves on to the generic fallbacks.
pub fn resolve(
    pair: &CollegePair<'_>,
    directory: &CollegeDirectory,
) -> Result<Option<(Verdict, &'static str)>, MatchError> {
    let (Some(user_entry), Some(correct_entry)) =
        (directory.get(pair.user_raw), directory.get(pair.correct_raw))
    else {
        return Ok(None);
    };

    let user_conf = user_entry
        .conference
        .as_deref()
        .ok_or_else(|| MatchError::LookupMiss(pair.user_raw.to_string()))?;
    let correct_conf = correct_entry
        .conference
        .as_deref()
        .ok_or_else(|| MatchError::LookupMiss(pair.correct_raw.to_string()))?;

    if user_conf != correct_conf {
        return Ok(Some((Verdict::Reject, "college.conference_mismatch")));
    }

    let kw = Keywords {
        user: keywords(pair.user_expanded),
        correct: keywords(pair.correct_expanded),
    };

    for &(name, rule) in SUB_RULES {
        match rule(pair, &kw) {
            Verdict::Pass => continue,
            verdict => return Ok(Some((verdict, name))),
        }
    }
    Ok(None)
}

/// Neither side looks like an abbreviation: keywords must be identical.
/// "iowa state university" and "university of iowa" both reduce to {iowa},
/// so this accepts them; that collision is a known limitation of the stop-word
/// list.
fn full_name_keywords(pair: &CollegePair<'_>, kw: &Keywords<'_>) -> Verdict {
    if pair.user_is_abbreviation() || pair.correct_is_abbreviation() {
        return Verdict::Pass;
    }
    if kw.user == kw.correct {
        Verdict::Accept
    } else {
        Verdict::Pass
    }
}

/// At least one side is an abbreviation: any shared keyword will do, unless
/// the only one shared is "california".
fn abbreviation_overlap(pair: &CollegePair<'_>, kw: &Keywords<'_>) -> Verdict {
    if !pair.user_is_abbreviation() && !pair.correct_is_abbreviation() {
        return Verdict::Pass;
    }
    let shared: Vec<&str> = kw.user.intersection(&kw.correct).copied().collect();
    match shared.as_slice() {
        [] | [AMBIGUOUS_KEYWORD] => Verdict::Pass,
        _ => Verdict::Accept,
    }
}

fn abbreviation_substring(pair: &CollegePair<'_>, _kw: &Keywords<'_>) -> Verdict {
    let user_inside = pair.user_is_abbreviation() && pair.correct_raw.contains(pair.user_raw);
    let correct_inside =
        pair.correct_is_abbreviation() && pair.user_raw.contains(pair.correct_raw);
    if user_inside || correct_inside {
        Verdict::Accept
    } else {
        Verdict::Pass
    }
}
