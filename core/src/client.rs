//! Stateless HTTP request builder and response parser for the LCA API.
//!
//! # Design
//! `LcaClient` holds only a `base_url` and carries no mutable state between
//! calls. Each read operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{build_query, QueryBuilder, WAGE_COLUMN};
use crate::types::{
    EmployerSummary, FilterState, LcaStats, Page, Record, Sort, SortDirection, StateStats,
    SuggestField, TotalCount,
};

pub const FILINGS: &str = "h1b_lca_data";
pub const STATS: &str = "h1b_lca_stats";
pub const STATE_STATS: &str = "h1b_state_stats";
pub const DEFAULT_SUGGESTION_LIMIT: u32 = 20;
/// Rows fetched for client-side employer aggregation.
pub const TOP_EMPLOYER_SAMPLE: u32 = 5000;

const OK_STATUSES: &[u16] = &[200, 206];

/// Synchronous, stateless client for the LCA API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct LcaClient {
    base_url: String,
}

impl LcaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    fn get(&self, resource: &str) -> HttpRequest {
        HttpRequest::get(format!("{}/{resource}", self.base_url))
    }

    /// Filing search with an exact total count.
    pub fn build_search(&self, filters: &FilterState) -> HttpRequest {
        let mut req = self.get(FILINGS);
        req.query = build_query(filters).into_pairs();
        req.headers.push(("prefer".to_string(), "count=exact".to_string()));
        req
    }

    pub fn parse_search(&self, response: HttpResponse) -> Result<Page<Record>, ApiError> {
        check_status(&response, OK_STATUSES)?;
        let total = response
            .header("content-range")
            .map(parse_content_range)
            .unwrap_or(TotalCount::Unknown);
        let records = parse_body(&response)?;
        Ok(Page { records, total })
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.get(STATS)
    }

    /// Global stats are a single-row view; an empty array is `NotFound`.
    pub fn parse_stats(&self, response: HttpResponse) -> Result<LcaStats, ApiError> {
        check_status(&response, OK_STATUSES)?;
        let rows: Vec<LcaStats> = parse_body(&response)?;
        rows.into_iter().next().ok_or(ApiError::NotFound)
    }

    pub fn build_state_stats(&self) -> HttpRequest {
        let mut req = self.get(STATE_STATS);
        req.query.push(("order".to_string(), "filing_count.desc".to_string()));
        req
    }

    pub fn parse_state_stats(&self, response: HttpResponse) -> Result<Vec<StateStats>, ApiError> {
        check_status(&response, OK_STATUSES)?;
        parse_body(&response)
    }

    /// Highest-paid positions in one state, for the map drill-down.
    pub fn build_state_employers(&self, state_code: &str, limit: u32) -> HttpRequest {
        let filters = FilterState {
            state_code: Some(state_code.to_string()),
            limit: Some(limit),
            ..FilterState::default()
        };
        let mut req = self.get(FILINGS);
        req.query = build_query(&filters).into_pairs();
        req
    }

    pub fn parse_records(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        check_status(&response, OK_STATUSES)?;
        parse_body(&response)
    }

    /// Autocomplete lookup against a distinct-value view.
    pub fn build_suggestions(&self, field: SuggestField, search: &str, limit: u32) -> HttpRequest {
        let column = field.column();
        let mut q = QueryBuilder::new();
        q.param("select", column.to_string());
        if !search.is_empty() {
            q.filter(column, format!("ilike.*{search}*"));
        }
        q.param("order", Sort::new(column, SortDirection::Asc).to_string())
            .param("limit", limit.to_string());

        let mut req = self.get(field.resource());
        req.query = q.finish().into_pairs();
        req
    }

    /// Distinct non-empty values in server order, at most `limit`.
    pub fn parse_suggestions(
        &self,
        field: SuggestField,
        response: HttpResponse,
        limit: u32,
    ) -> Result<Vec<String>, ApiError> {
        check_status(&response, OK_STATUSES)?;
        let rows: Vec<HashMap<String, Option<String>>> = parse_body(&response)?;

        let mut values: Vec<String> = Vec::new();
        for row in rows {
            let Some(Some(value)) = row.get(field.column()) else {
                continue;
            };
            if !value.is_empty() && !values.contains(value) {
                values.push(value.clone());
            }
        }
        values.truncate(limit as usize);
        Ok(values)
    }

    /// Sample of employer/wage pairs for `parse_top_employers`.
    pub fn build_top_employers_sample(&self) -> HttpRequest {
        let mut req = self.get(FILINGS);
        req.query = vec![
            ("select".to_string(), format!("employer_name,{WAGE_COLUMN}")),
            ("order".to_string(), "employer_name.asc".to_string()),
            ("limit".to_string(), TOP_EMPLOYER_SAMPLE.to_string()),
        ];
        req
    }

    /// Aggregate the sample into filing counts and rounded average wages,
    /// most filings first. Ties keep the order employers were first seen.
    pub fn parse_top_employers(
        &self,
        response: HttpResponse,
        limit: usize,
    ) -> Result<Vec<EmployerSummary>, ApiError> {
        #[derive(Deserialize)]
        struct EmployerWage {
            employer_name: Option<String>,
            wage_rate_of_pay_from: Option<f64>,
        }

        check_status(&response, OK_STATUSES)?;
        let rows: Vec<EmployerWage> = parse_body(&response)?;

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut totals: Vec<(String, u64, f64)> = Vec::new();
        for row in rows {
            let Some(name) = row.employer_name.filter(|n| !n.is_empty()) else {
                continue;
            };
            let wage = row.wage_rate_of_pay_from.unwrap_or(0.0);
            match index.get(&name) {
                Some(&i) => {
                    totals[i].1 += 1;
                    totals[i].2 += wage;
                }
                None => {
                    index.insert(name.clone(), totals.len());
                    totals.push((name, 1, wage));
                }
            }
        }

        let mut summaries: Vec<EmployerSummary> = totals
            .into_iter()
            .map(|(employer_name, count, total)| EmployerSummary {
                employer_name,
                count,
                avg_wage: (total / count as f64).round() as u64,
            })
            .collect();
        summaries.sort_by(|a, b| b.count.cmp(&a.count));
        summaries.truncate(limit);
        Ok(summaries)
    }
}

/// Read the total from a `Content-Range` value such as `0-24/453221`.
///
/// `*` as the total, or anything that is not `<start>-<end>/<total>` or
/// `*/<total>`, yields `TotalCount::Unknown`.
pub fn parse_content_range(value: &str) -> TotalCount {
    let Some((range, total)) = value.trim().split_once('/') else {
        debug!(value, "malformed content-range");
        return TotalCount::Unknown;
    };
    let range_ok = range == "*"
        || range
            .split_once('-')
            .is_some_and(|(start, end)| is_digits(start) && is_digits(end));
    if !range_ok || !is_digits(total) {
        if total != "*" {
            debug!(value, "malformed content-range");
        }
        return TotalCount::Unknown;
    }
    total.parse().map(TotalCount::Exact).unwrap_or(TotalCount::Unknown)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn client() -> LcaClient {
        LcaClient::new("http://localhost:3000")
    }

    #[test]
    fn from_config_uses_base_url_without_trailing_slash() {
        let config = ClientConfig {
            base_url: "https://lca.example.org/rest/".to_string(),
        };
        let req = LcaClient::from_config(&config).build_stats();
        assert_eq!(req.path, "https://lca.example.org/rest/h1b_lca_stats");
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn with_range(body: &str, range: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: vec![("Content-Range".to_string(), range.to_string())],
            body: body.to_string(),
        }
    }

    const ONE_RECORD: &str = r#"[{"id":1,"job_title":"Software Engineer","soc_code":"15-1252",
        "soc_title":"Software Developers","employer_name":"Acme Corp",
        "worksite_address":"1 Elm St Hartford Hartford CT 06103",
        "wage_rate_of_pay_from":120000,"wage_rate_of_pay_to":null,
        "prevailing_wage":98000,"pw_wage_level":"II"}]"#;

    #[test]
    fn build_search_produces_counted_get() {
        let req = client().build_search(&FilterState::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/h1b_lca_data");
        assert!(req.headers.contains(&("accept".to_string(), "application/json".to_string())));
        assert!(req.headers.contains(&("prefer".to_string(), "count=exact".to_string())));
        assert_eq!(req.query_param("limit"), Some("25"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = LcaClient::new("http://localhost:3000/");
        assert_eq!(client.build_stats().path, "http://localhost:3000/h1b_lca_stats");
    }

    #[test]
    fn parse_search_reads_total_from_header() {
        let page = client()
            .parse_search(with_range(ONE_RECORD, "0-24/453221"))
            .unwrap();
        assert_eq!(page.total, TotalCount::Exact(453221));
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].employer_name, "Acme Corp");
    }

    #[test]
    fn parse_search_star_total_is_unknown() {
        let page = client().parse_search(with_range(ONE_RECORD, "0-24/*")).unwrap();
        assert_eq!(page.total, TotalCount::Unknown);
    }

    #[test]
    fn parse_search_without_header_is_unknown() {
        let page = client().parse_search(ok("[]")).unwrap();
        assert_eq!(page.total, TotalCount::Unknown);
        assert!(page.records.is_empty());
    }

    #[test]
    fn partial_content_is_success() {
        let mut response = with_range(ONE_RECORD, "0-0/2");
        response.status = 206;
        let page = client().parse_search(response).unwrap();
        assert_eq!(page.total, TotalCount::Exact(2));
    }

    #[test]
    fn parse_search_server_error() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "boom".to_string(),
        };
        let err = client().parse_search(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_search_bad_json() {
        let err = client().parse_search(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn content_range_forms() {
        assert_eq!(parse_content_range("0-24/453221"), TotalCount::Exact(453221));
        assert_eq!(parse_content_range("*/0"), TotalCount::Exact(0));
        assert_eq!(parse_content_range("0-24/*"), TotalCount::Unknown);
        assert_eq!(parse_content_range(""), TotalCount::Unknown);
        assert_eq!(parse_content_range("garbage"), TotalCount::Unknown);
        assert_eq!(parse_content_range("0-24/abc"), TotalCount::Unknown);
        assert_eq!(parse_content_range("a-b/10"), TotalCount::Unknown);
    }

    #[test]
    fn parse_stats_takes_first_row() {
        let stats = client()
            .parse_stats(ok(r#"[{"total_records":3,"unique_employers":2,"unique_job_titles":3,
                "avg_wage_from":100000.5,"min_wage_from":80000,"max_wage_from":130000}]"#))
            .unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.max_wage_from, 130000.0);
    }

    #[test]
    fn parse_stats_empty_is_not_found() {
        let err = client().parse_stats(ok("[]")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn state_stats_are_ordered_by_filings() {
        let req = client().build_state_stats();
        assert_eq!(req.path, "http://localhost:3000/h1b_state_stats");
        assert_eq!(req.query_param("order"), Some("filing_count.desc"));

        let stats = client()
            .parse_state_stats(ok(
                r#"[{"state_code":"CA","filing_count":10,"employer_count":4,"avg_wage":140000}]"#,
            ))
            .unwrap();
        assert_eq!(stats[0].state_code, "CA");
    }

    #[test]
    fn state_employers_filter_on_code() {
        let req = client().build_state_employers("ny", 20);
        assert_eq!(req.query_param("worksite_address"), Some(r"match.^NY\s\s*[0-9]{5}|[^A-Za-z]NY\s\s*[0-9]{5}"));
        assert_eq!(req.query_param("limit"), Some("20"));
        assert_eq!(req.query_param("order"), Some("wage_rate_of_pay_from.desc"));
        assert!(!req.headers.iter().any(|(k, _)| k == "prefer"));
    }

    #[test]
    fn suggestions_query_distinct_view() {
        let req = client().build_suggestions(SuggestField::Employer, "goo", 10);
        assert_eq!(req.path, "http://localhost:3000/h1b_distinct_employers");
        assert_eq!(
            req.query,
            vec![
                ("select".to_string(), "employer_name".to_string()),
                ("employer_name".to_string(), "ilike.*goo*".to_string()),
                ("order".to_string(), "employer_name.asc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn suggestions_without_search_have_no_filter() {
        let req = client().build_suggestions(SuggestField::JobTitle, "", DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(req.query_param("job_title"), None);
        assert_eq!(req.query_param("limit"), Some("20"));
    }

    #[test]
    fn suggestions_are_deduplicated() {
        let body = r#"[{"job_title":"Analyst"},{"job_title":"Analyst"},{"job_title":null},
            {"job_title":""},{"job_title":"Engineer"},{"job_title":"Manager"}]"#;
        let values = client()
            .parse_suggestions(SuggestField::JobTitle, ok(body), 2)
            .unwrap();
        assert_eq!(values, vec!["Analyst", "Engineer"]);
    }

    #[test]
    fn top_employers_sample_request() {
        let req = client().build_top_employers_sample();
        assert_eq!(req.query_param("select"), Some("employer_name,wage_rate_of_pay_from"));
        assert_eq!(req.query_param("limit"), Some("5000"));
    }

    #[test]
    fn top_employers_aggregate_and_rank() {
        let body = r#"[
            {"employer_name":"Beta","wage_rate_of_pay_from":100000},
            {"employer_name":"Alpha","wage_rate_of_pay_from":90000},
            {"employer_name":"Alpha","wage_rate_of_pay_from":null},
            {"employer_name":"Gamma","wage_rate_of_pay_from":70000},
            {"employer_name":"Alpha","wage_rate_of_pay_from":100001},
            {"employer_name":null,"wage_rate_of_pay_from":5}
        ]"#;
        let top = client().parse_top_employers(ok(body), 2).unwrap();
        assert_eq!(
            top,
            vec![
                EmployerSummary {
                    employer_name: "Alpha".to_string(),
                    count: 3,
                    avg_wage: 63334,
                },
                EmployerSummary {
                    employer_name: "Beta".to_string(),
                    count: 1,
                    avg_wage: 100000,
                },
            ]
        );
    }

    #[test]
    fn not_found_status() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        let err = client().parse_records(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
