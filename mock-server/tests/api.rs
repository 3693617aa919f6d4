use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn counted(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("prefer", "count=exact")
        .body(String::new())
        .unwrap()
}

fn content_range(response: &axum::response::Response) -> String {
    response.headers()[header::CONTENT_RANGE].to_str().unwrap().to_string()
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect()
}

// --- filings ---

#[tokio::test]
async fn list_filings_without_count() {
    let resp = app().oneshot(get("/h1b_lca_data?limit=3")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_range(&resp), "0-2/*");
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn exact_count_reports_total() {
    let resp = app()
        .oneshot(counted("/h1b_lca_data?limit=2&offset=2&order=id.asc"))
        .await
        .unwrap();

    assert_eq!(content_range(&resp), "2-3/8");
    assert_eq!(ids(&body_json(resp).await), vec![3, 4]);
}

#[tokio::test]
async fn empty_page_uses_star_range() {
    let resp = app()
        .oneshot(counted("/h1b_lca_data?employer_name=ilike.*nobody*"))
        .await
        .unwrap();

    assert_eq!(content_range(&resp), "*/0");
    assert!(body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ilike_and_wage_range() {
    let resp = app()
        .oneshot(counted(
            "/h1b_lca_data?job_title=ilike.*engineer*&wage_rate_of_pay_from=gte.100000\
             &and=(wage_rate_of_pay_from.lte.170000)&order=id.asc",
        ))
        .await
        .unwrap();

    assert_eq!(content_range(&resp), "0-1/2");
    assert_eq!(ids(&body_json(resp).await), vec![1, 4]);
}

#[tokio::test]
async fn or_group_matches_any_column() {
    let resp = app()
        .oneshot(get(
            "/h1b_lca_data?or=(employer_name.ilike.*CT*,worksite_address.ilike.*CT*)&order=id.asc",
        ))
        .await
        .unwrap();

    // Connecticut Software Group and the CTO Plaza address match as substrings.
    assert_eq!(ids(&body_json(resp).await), vec![1, 2, 4]);
}

#[tokio::test]
async fn match_filter_anchors_state_before_zip() {
    let resp = app()
        .oneshot(get(
            "/h1b_lca_data?worksite_address=match.%5B%5EA-Za-z%5DCT%5Cs%5Cs*%5B0-9%5D%7B5%7D&order=id.asc",
        ))
        .await
        .unwrap();

    assert_eq!(ids(&body_json(resp).await), vec![1, 2]);
}

#[tokio::test]
async fn select_projects_columns() {
    let resp = app()
        .oneshot(get("/h1b_lca_data?select=id,employer_name&id=eq.5"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body, serde_json::json!([{"id": 5, "employer_name": "Lone Star Manufacturing"}]));
}

#[tokio::test]
async fn wage_desc_puts_null_wages_first() {
    let resp = app()
        .oneshot(get("/h1b_lca_data?order=wage_rate_of_pay_from.desc&limit=2"))
        .await
        .unwrap();

    assert_eq!(ids(&body_json(resp).await), vec![8, 7]);
}

// --- views ---

#[tokio::test]
async fn stats_view_has_one_row() {
    let resp = app().oneshot(get("/h1b_lca_stats")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["total_records"], 8);
}

#[tokio::test]
async fn state_stats_ordered_by_filings() {
    let resp = app()
        .oneshot(get("/h1b_state_stats?order=filing_count.desc"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["state_code"].as_str())
        .collect();
    assert_eq!(codes, vec!["CA", "CT", "NY", "TX", "WV"]);
}

#[tokio::test]
async fn distinct_view_supports_autocomplete() {
    let resp = app()
        .oneshot(get(
            "/h1b_distinct_employers?select=employer_name&employer_name=ilike.*a*&order=employer_name.asc&limit=2",
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(
        body,
        serde_json::json!([
            {"employer_name": "Acme Analytics LLC"},
            {"employer_name": "Bay Compute Inc"}
        ])
    );
}

// --- errors ---

#[tokio::test]
async fn unknown_resource_returns_404() {
    let resp = app().oneshot(get("/h1b_visa_data")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "PGRST205");
}

#[tokio::test]
async fn malformed_filter_returns_400() {
    let resp = app()
        .oneshot(get("/h1b_lca_data?employer_name=bogus.x"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "PGRST100");
}

#[tokio::test]
async fn malformed_group_returns_400() {
    let resp = app()
        .oneshot(get("/h1b_lca_data?or=employer_name.eq.x"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
