//! US state name ⇄ abbreviation detection for free-text location terms.
//!
//! # Design
//! The dataset stores worksite states as two-letter codes, while users tend
//! to type full names. `detect_state` recognises either form and produces the
//! alternate spelling so callers can OR both terms together.
//!
//! Detection runs the rules in `MatchRule::PRIORITY` order and stops at the
//! first rule that fires, so at most one state is detected per term. Inside
//! the trailing-name and whole-word rules, names are tried in table order,
//! except that a name is tried before any shorter name it contains, so
//! "West Virginia" is never read as "Virginia".
//!
//! All lookup tables are immutable statics built on first use.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// A (lowercase full name, two-letter code) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEntry {
    pub name: &'static str,
    pub code: &'static str,
}

const fn entry(name: &'static str, code: &'static str) -> StateEntry {
    StateEntry { name, code }
}

/// The 50 states, DC and three territories.
pub static STATES: [StateEntry; 54] = [
    entry("alabama", "AL"),
    entry("alaska", "AK"),
    entry("arizona", "AZ"),
    entry("arkansas", "AR"),
    entry("california", "CA"),
    entry("colorado", "CO"),
    entry("connecticut", "CT"),
    entry("delaware", "DE"),
    entry("florida", "FL"),
    entry("georgia", "GA"),
    entry("hawaii", "HI"),
    entry("idaho", "ID"),
    entry("illinois", "IL"),
    entry("indiana", "IN"),
    entry("iowa", "IA"),
    entry("kansas", "KS"),
    entry("kentucky", "KY"),
    entry("louisiana", "LA"),
    entry("maine", "ME"),
    entry("maryland", "MD"),
    entry("massachusetts", "MA"),
    entry("michigan", "MI"),
    entry("minnesota", "MN"),
    entry("mississippi", "MS"),
    entry("missouri", "MO"),
    entry("montana", "MT"),
    entry("nebraska", "NE"),
    entry("nevada", "NV"),
    entry("new hampshire", "NH"),
    entry("new jersey", "NJ"),
    entry("new mexico", "NM"),
    entry("new york", "NY"),
    entry("north carolina", "NC"),
    entry("north dakota", "ND"),
    entry("ohio", "OH"),
    entry("oklahoma", "OK"),
    entry("oregon", "OR"),
    entry("pennsylvania", "PA"),
    entry("rhode island", "RI"),
    entry("south carolina", "SC"),
    entry("south dakota", "SD"),
    entry("tennessee", "TN"),
    entry("texas", "TX"),
    entry("utah", "UT"),
    entry("vermont", "VT"),
    entry("virginia", "VA"),
    entry("washington", "WA"),
    entry("west virginia", "WV"),
    entry("wisconsin", "WI"),
    entry("wyoming", "WY"),
    entry("district of columbia", "DC"),
    entry("puerto rico", "PR"),
    entry("guam", "GU"),
    entry("virgin islands", "VI"),
];

static BY_NAME: LazyLock<HashMap<&'static str, &'static StateEntry>> =
    LazyLock::new(|| STATES.iter().map(|s| (s.name, s)).collect());

static BY_CODE: LazyLock<HashMap<&'static str, &'static StateEntry>> =
    LazyLock::new(|| STATES.iter().map(|s| (s.code, s)).collect());

/// Code → title-cased name ("DC" → "District Of Columbia").
static DISPLAY_NAMES: LazyLock<HashMap<&'static str, String>> =
    LazyLock::new(|| STATES.iter().map(|s| (s.code, title_case(s.name))).collect());

/// Table order, with each name moved ahead of the first shorter name it contains.
static SEARCH_ORDER: LazyLock<Vec<&'static StateEntry>> = LazyLock::new(|| {
    let mut entries: Vec<&'static StateEntry> = Vec::with_capacity(STATES.len());
    for state in STATES.iter() {
        match entries
            .iter()
            .position(|earlier| earlier.name != state.name && state.name.contains(earlier.name))
        {
            Some(at) => entries.insert(at, state),
            None => entries.push(state),
        }
    }
    entries
});

static WORD_PATTERNS: LazyLock<Vec<(Regex, &'static StateEntry)>> = LazyLock::new(|| {
    SEARCH_ORDER
        .iter()
        .map(|s| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(s.name));
            let re = Regex::new(&pattern).expect("state name pattern is a valid regex");
            (re, *s)
        })
        .collect()
});

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// One detection strategy. Variants are listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// The whole term is a state name ("Connecticut").
    ExactName,
    /// The whole term is a two-letter code ("CT").
    ExactCode,
    /// The term ends with a state name ("jobs in Connecticut").
    TrailingName,
    /// A state name appears as a whole word ("Connecticut jobs").
    WholeWord,
}

impl MatchRule {
    pub const PRIORITY: [MatchRule; 4] = [
        MatchRule::ExactName,
        MatchRule::ExactCode,
        MatchRule::TrailingName,
        MatchRule::WholeWord,
    ];

    fn apply(self, trimmed: &str) -> Option<(String, &'static StateEntry)> {
        match self {
            MatchRule::ExactName => {
                let state = BY_NAME.get(trimmed.to_ascii_lowercase().as_str())?;
                Some((state.code.to_string(), *state))
            }
            MatchRule::ExactCode => {
                if trimmed.chars().count() != 2 {
                    return None;
                }
                let state = BY_CODE.get(trimmed.to_ascii_uppercase().as_str())?;
                Some((display_name(state).to_string(), *state))
            }
            MatchRule::TrailingName => SEARCH_ORDER.iter().find_map(|state| {
                let split = trimmed.len().checked_sub(state.name.len())?;
                if !trimmed.is_char_boundary(split) {
                    return None;
                }
                let (prefix, tail) = trimmed.split_at(split);
                tail.eq_ignore_ascii_case(state.name)
                    .then(|| (format!("{prefix}{}", state.code), *state))
            }),
            MatchRule::WholeWord => WORD_PATTERNS.iter().find_map(|(re, state)| {
                re.is_match(trimmed)
                    .then(|| (re.replace(trimmed, NoExpand(state.code)).into_owned(), *state))
            }),
        }
    }
}

/// A detected state together with the alternate spelling of the term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMatch {
    /// The trimmed input term.
    pub original: String,
    /// The term with the state written the other way.
    pub alternate: String,
    /// Title-cased display name, e.g. "New York".
    pub state_name: &'static str,
    pub state_abbrev: &'static str,
    /// The rule that fired.
    pub rule: MatchRule,
}

fn display_name(state: &StateEntry) -> &'static str {
    DISPLAY_NAMES
        .get(state.code)
        .map(String::as_str)
        .unwrap_or(state.name)
}

/// Detect a state name or abbreviation in `term`.
///
/// Returns `None` for empty input or when no rule fires; callers then treat
/// the term as an ordinary substring.
pub fn detect_state(term: &str) -> Option<StateMatch> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return None;
    }

    MatchRule::PRIORITY.iter().find_map(|rule| {
        let (alternate, state) = rule.apply(trimmed)?;
        Some(StateMatch {
            original: trimmed.to_string(),
            alternate,
            state_name: display_name(state),
            state_abbrev: state.code,
            rule: *rule,
        })
    })
}

/// Terms to OR together for a location search: `term` first, then the
/// alternate spelling if a state was detected.
pub fn expand_location(term: &str) -> Vec<String> {
    let mut terms = vec![term.to_string()];
    if let Some(detected) = detect_state(term) {
        terms.push(detected.alternate);
    }
    terms
}

/// A hint shown when a search comes back empty.
pub fn state_suggestion(query: &str) -> Option<String> {
    let detected = detect_state(query)?;
    Some(format!(
        "In the dataset, \"{}\" is stored as \"{}\". Try searching for \"{}\" instead.",
        detected.state_name, detected.state_abbrev, detected.state_abbrev
    ))
}

/// Title-cased name for a two-letter code, case-insensitive.
pub fn abbrev_to_name(code: &str) -> Option<&'static str> {
    let state = BY_CODE.get(code.trim().to_ascii_uppercase().as_str())?;
    Some(display_name(state))
}

/// Canonical (uppercase) code if `code` names a known state.
pub fn normalize_code(code: &str) -> Option<&'static str> {
    BY_CODE
        .get(code.trim().to_ascii_uppercase().as_str())
        .map(|s| s.code)
}
