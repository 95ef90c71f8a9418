//! Answer equivalence engine
//!
//! Decides whether a free-text guess should count against a canonical origin
//! string. Rules run in a fixed order and the first one to reach a verdict wins.
//! Matching never fails outward: blank input or incomplete reference data is
//! logged and counts as a wrong answer.

mod college;
pub mod normalize;

use std::sync::Arc;

use crate::reference::{space_collapsed, ReferenceTables};
use crate::types::{OriginType, PlayerOrigin};

use self::college::CollegePair;
use self::normalize::{comparable, lower_trim, similarity};

/// Minimum edit-distance similarity accepted as a typo
pub const SIMILARITY_THRESHOLD: f64 = 0.80;

/// Shortest expansion that may be matched by containment
const MIN_CONTAINMENT_LEN: usize = 3;

/// Substring fallback needs at least this many chars (or words) contained
const MIN_SUBSTRING_LEN: usize = 5;
const MIN_SUBSTRING_WORDS: usize = 3;

/// Longest raw answer treated as a bare abbreviation by the boundary rule
const SHORT_ABBREVIATION_MAX_LEN: usize = 3;

/// Failures inside matching. Never surfaced to callers; they degrade to a
/// rejected answer.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Missing {0}")]
    MissingInput(&'static str),

    #[error("College '{0}' has no conference in the directory")]
    LookupMiss(String),
}

/// Outcome of a single rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    Pass,
}

/// A matching decision and the rule that made it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub accepted: bool,
    pub rule: &'static str,
}

impl Decision {
    const NO_MATCH: Self = Self {
        accepted: false,
        rule: "no_match",
    };
    const FAILED: Self = Self {
        accepted: false,
        rule: "error",
    };
}

/// Both answers in every form the rules look at, computed once per call
#[derive(Debug)]
struct Answers {
    user_raw: String,
    correct_raw: String,
    user_expanded: String,
    correct_expanded: String,
    user_cmp: String,
    correct_cmp: String,
}

type Rule = fn(
    &AnswerMatcher,
    &Answers,
    OriginType,
    Option<&PlayerOrigin>,
) -> Result<(Verdict, &'static str), MatchError>;

const RULES: &[Rule] = &[
    exact,
    fuzzy,
    expansion_containment,
    special_program,
    same_college,
    substring,
    short_abbreviation,
];

/// Stateless matcher over shared, immutable reference tables.
/// Cloning is cheap and clones can be used from any thread.
#[derive(Debug, Clone)]
pub struct AnswerMatcher {
    tables: Arc<ReferenceTables>,
}

impl AnswerMatcher {
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self { tables }
    }

    /// Whether `user_answer` should be accepted for `correct_answer`
    pub fn is_match(
        &self,
        user_answer: &str,
        correct_answer: &str,
        origin_type: OriginType,
        player: Option<&PlayerOrigin>,
    ) -> bool {
        self.evaluate(user_answer, correct_answer, origin_type, player)
            .accepted
    }

    /// Like [`is_match`](Self::is_match), but reports which rule decided
    pub fn evaluate(
        &self,
        user_answer: &str,
        correct_answer: &str,
        origin_type: OriginType,
        player: Option<&PlayerOrigin>,
    ) -> Decision {
        match self.try_evaluate(user_answer, correct_answer, origin_type, player) {
            Ok(decision) => {
                tracing::debug!(
                    user_answer,
                    correct_answer,
                    origin_type = origin_type.as_str(),
                    accepted = decision.accepted,
                    rule = decision.rule,
                    "Answer checked"
                );
                decision
            }
            Err(e) => {
                tracing::warn!(
                    user_answer,
                    correct_answer,
                    origin_type = origin_type.as_str(),
                    "Answer check failed, counting as wrong: {}",
                    e
                );
                Decision::FAILED
            }
        }
    }

    fn try_evaluate(
        &self,
        user_answer: &str,
        correct_answer: &str,
        origin_type: OriginType,
        player: Option<&PlayerOrigin>,
    ) -> Result<Decision, MatchError> {
        let answers = self.prepare(user_answer, correct_answer)?;

        for rule in RULES {
            match rule(self, &answers, origin_type, player)? {
                (Verdict::Pass, _) => continue,
                (verdict, name) => {
                    return Ok(Decision {
                        accepted: verdict == Verdict::Accept,
                        rule: name,
                    })
                }
            }
        }
        Ok(Decision::NO_MATCH)
    }

    fn prepare(&self, user_answer: &str, correct_answer: &str) -> Result<Answers, MatchError> {
        let user_raw = lower_trim(user_answer);
        let correct_raw = lower_trim(correct_answer);
        // Blank input is an error, so reflexivity holds only for non-blank answers
        if user_raw.is_empty() {
            return Err(MatchError::MissingInput("user answer"));
        }
        if correct_raw.is_empty() {
            return Err(MatchError::MissingInput("correct answer"));
        }

        let user_expanded = self.expand(&user_raw);
        let correct_expanded = self.expand(&correct_raw);

        Ok(Answers {
            user_cmp: comparable(&user_raw),
            correct_cmp: comparable(&correct_raw),
            user_raw,
            correct_raw,
            user_expanded,
            correct_expanded,
        })
    }

    fn expand(&self, raw: &str) -> String {
        self.tables
            .abbreviations
            .expand(&space_collapsed(raw))
            .map_or_else(|| raw.to_string(), str::to_string)
    }
}

fn verdict(accepted: bool, name: &'static str) -> Result<(Verdict, &'static str), MatchError> {
    Ok((if accepted { Verdict::Accept } else { Verdict::Pass }, name))
}

fn exact(
    _m: &AnswerMatcher,
    a: &Answers,
    _t: OriginType,
    _p: Option<&PlayerOrigin>,
) -> Result<(Verdict, &'static str), MatchError> {
    verdict(
        a.user_expanded == a.correct_expanded || a.user_raw == a.correct_raw,
        "exact",
    )
}

fn fuzzy(
    _m: &AnswerMatcher,
    a: &Answers,
    _t: OriginType,
    _p: Option<&PlayerOrigin>,
) -> Result<(Verdict, &'static str), MatchError> {
    verdict(
        similarity(&a.user_cmp, &a.correct_cmp) >= SIMILARITY_THRESHOLD,
        "fuzzy",
    )
}

/// "uconn" expands to "connecticut", found inside "university of connecticut"
fn expansion_containment(
    _m: &AnswerMatcher,
    a: &Answers,
    _t: OriginType,
    _p: Option<&PlayerOrigin>,
) -> Result<(Verdict, &'static str), MatchError> {
    let contained =
        a.correct_raw.contains(&a.user_expanded) || a.user_raw.contains(&a.correct_expanded);
    let shorter = a
        .user_expanded
        .chars()
        .count()
        .min(a.correct_expanded.chars().count());
    verdict(
        contained && shorter >= MIN_CONTAINMENT_LEN,
        "expansion_containment",
    )
}

/// Program aliases are interchangeable for G League Ignite / Overtime Elite
/// players. Their home country is checked by the caller against
/// `alternate_answer`.
fn special_program(
    m: &AnswerMatcher,
    a: &Answers,
    _t: OriginType,
    player: Option<&PlayerOrigin>,
) -> Result<(Verdict, &'static str), MatchError> {
    let Some(player) = player else {
        return verdict(false, "special_program");
    };
    let programs = &m.tables.programs;
    let origin = lower_trim(&player.origin);
    verdict(
        programs.is_program_origin(&origin) && programs.is_alias(&a.user_raw),
        "special_program",
    )
}

fn same_college(
    m: &AnswerMatcher,
    a: &Answers,
    origin_type: OriginType,
    _p: Option<&PlayerOrigin>,
) -> Result<(Verdict, &'static str), MatchError> {
    if origin_type != OriginType::College {
        return verdict(false, "college");
    }
    let pair = CollegePair {
        user_raw: &a.user_raw,
        correct_raw: &a.correct_raw,
        user_expanded: &a.user_expanded,
        correct_expanded: &a.correct_expanded,
    };
    Ok(college::resolve(&pair, &m.tables.colleges)?.unwrap_or((Verdict::Pass, "college")))
}

/// "st vincent st mary" inside "st vincent st mary hs"
fn substring(
    _m: &AnswerMatcher,
    a: &Answers,
    _t: OriginType,
    _p: Option<&PlayerOrigin>,
) -> Result<(Verdict, &'static str), MatchError> {
    let contained = if a.correct_cmp.contains(a.user_cmp.as_str()) {
        Some(&a.user_cmp)
    } else if a.user_cmp.contains(a.correct_cmp.as_str()) {
        Some(&a.correct_cmp)
    } else {
        None
    };
    let substantial = contained.is_some_and(|s| {
        s.chars().count() >= MIN_SUBSTRING_LEN || s.split_whitespace().count() >= MIN_SUBSTRING_WORDS
    });
    verdict(substantial, "substring")
}

/// A bare abbreviation of three chars or fewer must start the longer answer or
/// stand alone as one of its words.
fn short_abbreviation(
    _m: &AnswerMatcher,
    a: &Answers,
    _t: OriginType,
    _p: Option<&PlayerOrigin>,
) -> Result<(Verdict, &'static str), MatchError> {
    let (shorter, longer) = if a.user_raw.chars().count() < a.correct_raw.chars().count() {
        (&a.user_raw, &a.correct_raw)
    } else {
        (&a.correct_raw, &a.user_raw)
    };
    let accepted = shorter.chars().count() <= SHORT_ABBREVIATION_MAX_LEN
        && longer.contains(shorter.as_str())
        && (longer.starts_with(shorter.as_str())
            || longer.split(' ').any(|token| token == shorter.as_str()));
    verdict(accepted, "short_abbreviation")
}
