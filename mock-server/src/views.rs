//! In-memory dataset and the read-only views derived from it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::filter::Row;

pub const FILINGS: &str = "h1b_lca_data";

const SAMPLE: &str = include_str!("../fixtures/sample.json");

// Keep in step with `lca_core::address::extract_state`.
static STATE_BEFORE_ZIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2})\s+\d{5}").expect("valid regex"));

/// Every resource the server answers, keyed by path segment.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    tables: HashMap<String, Vec<Row>>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut tables = HashMap::new();
        tables.insert("h1b_lca_stats".to_string(), vec![stats_row(&rows)]);
        tables.insert("h1b_state_stats".to_string(), state_stats_rows(&rows));
        for (view, column) in [
            ("h1b_distinct_employers", "employer_name"),
            ("h1b_distinct_job_titles", "job_title"),
            ("h1b_distinct_locations", "worksite_address"),
        ] {
            tables.insert(view.to_string(), distinct_rows(&rows, column));
        }
        tables.insert(FILINGS.to_string(), rows);
        Self { tables }
    }

    /// Parse a JSON array of filing objects.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let rows: Vec<Row> = serde_json::from_str(json)?;
        Ok(Self::from_rows(rows))
    }

    /// The bundled fixture.
    pub fn sample() -> Self {
        Self::from_json(SAMPLE).expect("bundled fixture is valid JSON")
    }

    pub fn table(&self, name: &str) -> Option<&[Row]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn filings(&self) -> &[Row] {
        self.table(FILINGS).unwrap_or_default()
    }
}

fn object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

fn text<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn wage(row: &Row) -> Option<f64> {
    row.get("wage_rate_of_pay_from").and_then(Value::as_f64)
}

pub fn extract_state(address: &str) -> Option<&str> {
    STATE_BEFORE_ZIP
        .captures(address)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn stats_row(rows: &[Row]) -> Row {
    let employers: HashSet<&str> = rows.iter().filter_map(|r| text(r, "employer_name")).collect();
    let titles: HashSet<&str> = rows.iter().filter_map(|r| text(r, "job_title")).collect();
    let wages: Vec<f64> = rows.iter().filter_map(wage).collect();

    let (avg, min, max) = if wages.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let sum: f64 = wages.iter().sum();
        let min = wages.iter().copied().fold(f64::INFINITY, f64::min);
        let max = wages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (sum / wages.len() as f64, min, max)
    };

    object(json!({
        "total_records": rows.len(),
        "unique_employers": employers.len(),
        "unique_job_titles": titles.len(),
        "avg_wage_from": avg,
        "min_wage_from": min,
        "max_wage_from": max,
    }))
}

#[derive(Default)]
struct StateAccumulator<'a> {
    filings: u64,
    employers: HashSet<&'a str>,
    wage_sum: f64,
    wage_count: u64,
}

fn state_stats_rows(rows: &[Row]) -> Vec<Row> {
    let mut states: BTreeMap<&str, StateAccumulator> = BTreeMap::new();
    for row in rows {
        let Some(code) = text(row, "worksite_address").and_then(extract_state) else {
            continue;
        };
        let acc = states.entry(code).or_default();
        acc.filings += 1;
        if let Some(employer) = text(row, "employer_name") {
            acc.employers.insert(employer);
        }
        if let Some(w) = wage(row) {
            acc.wage_sum += w;
            acc.wage_count += 1;
        }
    }

    states
        .into_iter()
        .map(|(code, acc)| {
            let avg = if acc.wage_count == 0 {
                0.0
            } else {
                acc.wage_sum / acc.wage_count as f64
            };
            object(json!({
                "state_code": code,
                "filing_count": acc.filings,
                "employer_count": acc.employers.len(),
                "avg_wage": avg,
            }))
        })
        .collect()
}

fn distinct_rows(rows: &[Row], column: &str) -> Vec<Row> {
    let values: BTreeSet<&str> = rows.iter().filter_map(|r| text(r, column)).collect();
    values
        .into_iter()
        .map(|v| {
            let mut row = Row::new();
            row.insert(column.to_string(), Value::from(v));
            row
        })
        .collect()
}
