//! The subset of PostgREST horizontal filtering the LCA client relies on.
//!
//! Column filters arrive as `column=op.value`; composite filters as
//! `or=(a.op.v,b.op.v)` / `and=(...)`, nestable with `or(...)` / `and(...)`.
//! Pattern operators (`like`, `ilike`, `match`, `imatch`) compile to a
//! `Regex` once at parse time.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::error::MockError;

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug)]
pub enum Condition {
    Compare { column: String, op: Cmp, value: String },
    Pattern { column: String, regex: Regex },
    Any(Vec<Condition>),
    All(Vec<Condition>),
}

impl Condition {
    /// Parse the value side of `column=op.value`.
    pub fn column(column: &str, expr: &str) -> Result<Self, MockError> {
        let (op, raw) = expr
            .split_once('.')
            .ok_or_else(|| MockError::MalformedFilter(format!("{column}={expr}")))?;
        let value = unquote(raw);
        let column = column.to_string();

        let compare = |op| -> Result<Self, MockError> {
            Ok(Condition::Compare { column: column.clone(), op, value: value.to_string() })
        };
        match op {
            "eq" => compare(Cmp::Eq),
            "neq" => compare(Cmp::Neq),
            "gt" => compare(Cmp::Gt),
            "gte" => compare(Cmp::Gte),
            "lt" => compare(Cmp::Lt),
            "lte" => compare(Cmp::Lte),
            "like" => pattern(column.clone(), &glob_to_regex(value), false),
            "ilike" => pattern(column.clone(), &glob_to_regex(value), true),
            "match" => pattern(column.clone(), value, false),
            "imatch" => pattern(column.clone(), value, true),
            other => Err(MockError::MalformedFilter(format!("unknown operator {other:?}"))),
        }
    }

    /// Parse the value of an `or=` / `and=` parameter, e.g. `(a.eq.1,b.eq.2)`.
    pub fn group(any: bool, expr: &str) -> Result<Self, MockError> {
        let inner = expr
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| MockError::MalformedFilter(format!("group {expr:?}")))?;

        let items = split_top_level(inner);
        if items.iter().all(|i| i.trim().is_empty()) {
            return Err(MockError::MalformedFilter("empty group".to_string()));
        }

        let conditions = items
            .into_iter()
            .map(|item| {
                let item = item.trim();
                if let Some(rest) = item.strip_prefix("or") {
                    if rest.starts_with('(') {
                        return Condition::group(true, rest);
                    }
                }
                if let Some(rest) = item.strip_prefix("and") {
                    if rest.starts_with('(') {
                        return Condition::group(false, rest);
                    }
                }
                let (column, expr) = item
                    .split_once('.')
                    .ok_or_else(|| MockError::MalformedFilter(item.to_string()))?;
                Condition::column(column, expr)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(if any { Condition::Any(conditions) } else { Condition::All(conditions) })
    }

    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::Compare { column, op, value } => {
                let Some(cell) = row.get(column).and_then(cell_text) else {
                    return false;
                };
                let ord = compare_text(&cell, value);
                match op {
                    Cmp::Eq => ord == Ordering::Equal,
                    Cmp::Neq => ord != Ordering::Equal,
                    Cmp::Gt => ord == Ordering::Greater,
                    Cmp::Gte => ord != Ordering::Less,
                    Cmp::Lt => ord == Ordering::Less,
                    Cmp::Lte => ord != Ordering::Greater,
                }
            }
            Condition::Pattern { column, regex } => row
                .get(column)
                .and_then(cell_text)
                .is_some_and(|cell| regex.is_match(&cell)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.matches(row)),
            Condition::All(conditions) => conditions.iter().all(|c| c.matches(row)),
        }
    }
}

fn pattern(column: String, source: &str, case_insensitive: bool) -> Result<Condition, MockError> {
    let regex = RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| MockError::MalformedFilter(e.to_string()))?;
    Ok(Condition::Pattern { column, regex })
}

/// `*` and `%` are wildcards; everything else is literal.
fn glob_to_regex(glob: &str) -> String {
    let pieces: Vec<String> = glob.split(['*', '%']).map(regex::escape).collect();
    format!("(?s)^{}$", pieces.join(".*"))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Split on commas that are outside parentheses and double quotes.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                items.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&s[start..]);
    items
}

/// Text form of a cell; `None` for SQL NULL.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numeric comparison when both sides are numbers, text comparison otherwise.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    fn sample() -> Row {
        row(json!({
            "employer_name": "Acme Analytics LLC",
            "worksite_address": "1 Elm St Hartford Hartford CT 06103",
            "wage_rate_of_pay_from": 135000,
            "pw_wage_level": "III",
            "wage_rate_of_pay_to": null
        }))
    }

    #[test]
    fn ilike_is_case_insensitive_substring() {
        let c = Condition::column("employer_name", "ilike.*analytics*").unwrap();
        assert!(c.matches(&sample()));
        let c = Condition::column("employer_name", "like.*analytics*").unwrap();
        assert!(!c.matches(&sample()));
    }

    #[test]
    fn ilike_escapes_regex_metacharacters() {
        let c = Condition::column("employer_name", "ilike.*(LLC*").unwrap();
        assert!(!c.matches(&sample()));
    }

    #[test]
    fn numeric_comparisons() {
        assert!(Condition::column("wage_rate_of_pay_from", "gte.135000").unwrap().matches(&sample()));
        assert!(Condition::column("wage_rate_of_pay_from", "lte.140000").unwrap().matches(&sample()));
        assert!(!Condition::column("wage_rate_of_pay_from", "gt.135000").unwrap().matches(&sample()));
        // 99999 < 135000 numerically even though "99999" > "135000" as text.
        assert!(Condition::column("wage_rate_of_pay_from", "gt.99999").unwrap().matches(&sample()));
    }

    #[test]
    fn null_never_matches() {
        assert!(!Condition::column("wage_rate_of_pay_to", "lte.1").unwrap().matches(&sample()));
        assert!(!Condition::column("missing", "eq.x").unwrap().matches(&sample()));
    }

    #[test]
    fn match_uses_regex() {
        let c = Condition::column("worksite_address", r"match.[^A-Za-z]CT\s\s*[0-9]{5}").unwrap();
        assert!(c.matches(&sample()));
    }

    #[test]
    fn or_group_with_nested_and() {
        let c = Condition::group(
            true,
            "(employer_name.eq.Nobody,and(pw_wage_level.eq.III,wage_rate_of_pay_from.gt.100000))",
        )
        .unwrap();
        assert!(c.matches(&sample()));
    }

    #[test]
    fn and_group_requires_all() {
        let c = Condition::group(false, "(pw_wage_level.eq.III,wage_rate_of_pay_from.lte.100000)").unwrap();
        assert!(!c.matches(&sample()));
    }

    #[test]
    fn quoted_values_keep_commas() {
        let c = Condition::group(true, r#"(employer_name.eq."Acme, Inc",pw_wage_level.eq.III)"#).unwrap();
        assert!(c.matches(&sample()));
    }

    #[test]
    fn malformed_filters_are_rejected() {
        assert!(Condition::column("a", "bogus.1").is_err());
        assert!(Condition::column("a", "nodot").is_err());
        assert!(Condition::group(true, "a.eq.1").is_err());
        assert!(Condition::group(true, "()").is_err());
        assert!(Condition::column("a", "match.[").is_err());
    }
}
