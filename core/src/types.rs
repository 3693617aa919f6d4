//! Domain DTOs for the LCA disclosure API.
//!
//! # Design
//! Row types mirror the remote views but are defined independently from the
//! mock-server crate; integration tests catch schema drift. Rows are
//! read-only projections, so only `Deserialize` matters for them. Filters
//! also derive `Deserialize` so test vectors can describe them as JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prevailing-wage seniority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WageLevel {
    I,
    II,
    III,
    IV,
}

impl WageLevel {
    pub const ALL: [WageLevel; 4] = [WageLevel::I, WageLevel::II, WageLevel::III, WageLevel::IV];

    pub fn as_str(self) -> &'static str {
        match self {
            WageLevel::I => "I",
            WageLevel::II => "II",
            WageLevel::III => "III",
            WageLevel::IV => "IV",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WageLevel::I => "Level I (Entry)",
            WageLevel::II => "Level II (Qualified)",
            WageLevel::III => "Level III (Experienced)",
            WageLevel::IV => "Level IV (Expert)",
        }
    }
}

impl fmt::Display for WageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown wage level: {0:?}")]
pub struct UnknownWageLevel(pub String);

impl FromStr for WageLevel {
    type Err = UnknownWageLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        WageLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| UnknownWageLevel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Sort column and direction, rendered as `<field>.<asc|desc>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: "wage_rate_of_pay_from".to_string(),
            direction: SortDirection::Desc,
        }
    }
}

impl Sort {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        Self {
            field: field.to_string(),
            direction,
        }
    }

    /// Parse `field.direction` as found in a URL. An unknown or missing
    /// direction means descending; an empty field means the default sort.
    pub fn parse(s: &str) -> Self {
        let (field, direction) = match s.split_once('.') {
            Some((field, "asc")) => (field, SortDirection::Asc),
            Some((field, _)) => (field, SortDirection::Desc),
            None => (s, SortDirection::Desc),
        };
        if field.trim().is_empty() {
            return Self::default();
        }
        Self::new(field.trim(), direction)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.field, self.direction)
    }
}

/// Search filters coming from the UI. Every field is optional and an empty
/// string counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
    /// Free-text worksite location; state names and codes are expanded.
    pub location: Option<String>,
    /// Exact two-letter state filter, anchored before the ZIP code.
    pub state_code: Option<String>,
    pub wage_level: Option<WageLevel>,
    pub wage_min: Option<u64>,
    pub wage_max: Option<u64>,
    /// Global search across employer, job title and worksite address.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
    pub sort: Option<Sort>,
}

/// A filing row as projected by the fixed `select` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub job_title: String,
    pub soc_code: Option<String>,
    pub soc_title: Option<String>,
    pub employer_name: String,
    pub worksite_address: Option<String>,
    pub wage_rate_of_pay_from: Option<f64>,
    pub wage_rate_of_pay_to: Option<f64>,
    pub prevailing_wage: Option<f64>,
    pub pw_wage_level: Option<String>,
}

impl Record {
    pub fn wage_level(&self) -> Option<WageLevel> {
        self.pw_wage_level.as_deref()?.parse().ok()
    }
}

/// Single-row dataset summary from `/h1b_lca_stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcaStats {
    pub total_records: u64,
    pub unique_employers: u64,
    pub unique_job_titles: u64,
    pub avg_wage_from: f64,
    pub min_wage_from: f64,
    pub max_wage_from: f64,
}

/// Per-state aggregate from `/h1b_state_stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateStats {
    pub state_code: String,
    pub filing_count: u64,
    pub employer_count: u64,
    pub avg_wage: f64,
}

/// Client-side employer aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerSummary {
    pub employer_name: String,
    pub count: u64,
    pub avg_wage: u64,
}

/// Columns with a distinct-value view for autocomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestField {
    Employer,
    JobTitle,
    Location,
}

impl SuggestField {
    pub fn resource(self) -> &'static str {
        match self {
            SuggestField::Employer => "h1b_distinct_employers",
            SuggestField::JobTitle => "h1b_distinct_job_titles",
            SuggestField::Location => "h1b_distinct_locations",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SuggestField::Employer => "employer_name",
            SuggestField::JobTitle => "job_title",
            SuggestField::Location => "worksite_address",
        }
    }
}

/// Total row count reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalCount {
    Exact(u64),
    /// The server answered `*`, or the header was missing or malformed.
    Unknown,
}

impl TotalCount {
    pub fn exact(self) -> Option<u64> {
        match self {
            TotalCount::Exact(n) => Some(n),
            TotalCount::Unknown => None,
        }
    }
}

/// One page of rows plus the total from `Content-Range`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: TotalCount,
}
