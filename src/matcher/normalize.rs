//! Text normalization and edit-distance similarity for answer comparison.

/// Characters dropped before fuzzy and substring comparison
const STRIPPED_PUNCTUATION: &[char] = &['.', '-', '\''];

/// Lowercase and trim, the "raw" form every rule starts from
pub fn lower_trim(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Remove anything inside parentheses, parentheses included.
/// "st. vincent-st. mary hs (oh)" -> "st. vincent-st. mary hs "
pub fn strip_parenthetical(s: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parenthetical content, periods, hyphens and apostrophes removed, whitespace
/// collapsed. Both fuzzy and substring rules compare in this form.
pub fn comparable(s: &str) -> String {
    let stripped: String = strip_parenthetical(s)
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    collapse_whitespace(&stripped)
}

/// `1 - levenshtein / max_len` over chars. Empty input never matches.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    let max_len = a.chars().count().max(b.chars().count());
    1.0 - distance as f64 / max_len as f64
}
