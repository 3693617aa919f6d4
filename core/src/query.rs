//! Translation of `FilterState` into PostgREST query parameters.
//!
//! # Design
//! `QueryParams` is an ordered mapping with one value per key. Filters are
//! accumulated through `QueryBuilder`, which fixes the precedence rules:
//!
//! - A bare column key holds a single `op.value` condition. A second
//!   condition on the same column spills into the `and=(...)` group as
//!   `column.op.value`.
//! - The `or` key is last-write-wins. Global search is applied after the
//!   location filter, so its group replaces a location OR-group.
//! - `limit`, `offset`, `order` and `select` are always written last.
//!
//! User terms are embedded verbatim: a literal `*` or `%` typed by the user
//! acts as a wildcard, and a comma inside an OR-group splits the group. This
//! matches the behavior of the existing front end and is kept on purpose.

use tracing::{debug, warn};

use crate::address::state_zip_pattern;
use crate::states::{expand_location, normalize_code};
use crate::types::FilterState;

pub const DEFAULT_LIMIT: u32 = 25;
pub const WAGE_COLUMN: &str = "wage_rate_of_pay_from";
pub const SELECT_COLUMNS: &str = "id,job_title,soc_code,soc_title,employer_name,worksite_address,\
wage_rate_of_pay_from,wage_rate_of_pay_to,prevailing_wage,pw_wage_level";

/// Ordered parameter name → value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, keeping its original position if already present.
    /// Returns the replaced value.
    pub fn set(&mut self, key: &str, value: String) -> Option<String> {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.pairs.push((key.to_string(), value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

/// Accumulates filter conditions under the precedence rules above.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    params: QueryParams,
    and_group: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column=op.value`, or spill into the `and` group when the column
    /// already carries a condition.
    pub fn filter(&mut self, column: &str, condition: String) -> &mut Self {
        if self.params.contains_key(column) {
            self.and_group.push(format!("{column}.{condition}"));
        } else {
            self.params.set(column, condition);
        }
        self
    }

    /// Add `column.op.value` to the `and` group directly.
    pub fn and_clause(&mut self, column: &str, condition: String) -> &mut Self {
        self.and_group.push(format!("{column}.{condition}"));
        self
    }

    /// Replace the `or` group with `clauses`.
    pub fn or_group(&mut self, clauses: &[String]) -> &mut Self {
        if let Some(previous) = self.params.set("or", format!("({})", clauses.join(","))) {
            debug!(%previous, "or group replaced");
        }
        self
    }

    /// Raw key/value, last write wins.
    pub fn param(&mut self, key: &str, value: String) -> &mut Self {
        self.params.set(key, value);
        self
    }

    pub fn finish(mut self) -> QueryParams {
        if !self.and_group.is_empty() {
            let group = format!("({})", self.and_group.join(","));
            self.params.set("and", group);
        }
        self.params
    }
}

fn ilike(term: &str) -> String {
    format!("ilike.*{term}*")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Zero counts as unset for limits and wage bounds.
fn non_zero<T: Copy + Default + PartialEq>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v != T::default())
}

/// Build the query for a filing search. Pure and deterministic.
pub fn build_query(filters: &FilterState) -> QueryParams {
    let mut q = QueryBuilder::new();
    apply_filters(&mut q, filters);

    q.param("limit", non_zero(filters.limit).unwrap_or(DEFAULT_LIMIT).to_string())
        .param("offset", filters.offset.unwrap_or(0).to_string())
        .param("order", filters.sort.clone().unwrap_or_default().to_string())
        .param("select", SELECT_COLUMNS.to_string());
    q.finish()
}

/// Apply every column filter of `filters`; pagination is left to the caller.
pub fn apply_filters(q: &mut QueryBuilder, filters: &FilterState) {
    if let Some(employer) = non_empty(&filters.employer_name) {
        q.filter("employer_name", ilike(employer));
    }
    if let Some(title) = non_empty(&filters.job_title) {
        q.filter("job_title", ilike(title));
    }

    if let Some(location) = non_empty(&filters.location) {
        let terms = expand_location(location);
        match terms.as_slice() {
            [single] => {
                q.filter("worksite_address", ilike(single));
            }
            _ => {
                let clauses: Vec<String> = terms
                    .iter()
                    .map(|t| format!("worksite_address.{}", ilike(t)))
                    .collect();
                q.or_group(&clauses);
            }
        }
    }

    if let Some(raw) = non_empty(&filters.state_code) {
        match normalize_code(raw) {
            Some(code) => {
                q.filter("worksite_address", format!("match.{}", state_zip_pattern(code)));
            }
            None => warn!(state_code = raw, "unknown state code ignored"),
        }
    }

    if let Some(level) = filters.wage_level {
        q.filter("pw_wage_level", format!("eq.{level}"));
    }

    match (non_zero(filters.wage_min), non_zero(filters.wage_max)) {
        (Some(min), Some(max)) => {
            q.filter(WAGE_COLUMN, format!("gte.{min}"))
                .and_clause(WAGE_COLUMN, format!("lte.{max}"));
        }
        (Some(min), None) => {
            q.filter(WAGE_COLUMN, format!("gte.{min}"));
        }
        (None, Some(max)) => {
            q.filter(WAGE_COLUMN, format!("lte.{max}"));
        }
        (None, None) => {}
    }

    if let Some(search) = non_empty(&filters.search) {
        let mut clauses = vec![
            format!("employer_name.{}", ilike(search)),
            format!("job_title.{}", ilike(search)),
            format!("worksite_address.{}", ilike(search)),
        ];
        clauses.extend(
            expand_location(search)
                .iter()
                .skip(1)
                .map(|alt| format!("worksite_address.{}", ilike(alt))),
        );
        q.or_group(&clauses);
    }
}

impl FilterState {
    pub fn to_query(&self) -> QueryParams {
        build_query(self)
    }
}
