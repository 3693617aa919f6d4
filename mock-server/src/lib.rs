//! A small PostgREST stand-in serving the LCA views from memory.
//!
//! Every resource is answered by one handler: parse the query string into a
//! `ReadRequest`, run it over the resource's rows, and report the page range
//! in `Content-Range`. The total is exact only when the request carries
//! `Prefer: count=exact`, as with PostgREST.

pub mod config;
pub mod error;
pub mod filter;
pub mod read;
pub mod views;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tracing::debug;

pub use error::MockError;
pub use read::ReadRequest;
pub use views::Dataset;

pub type Db = Arc<Dataset>;

pub fn app() -> Router {
    app_with(Dataset::sample())
}

pub fn app_with(dataset: Dataset) -> Router {
    Router::new()
        .route("/{resource}", get(read_resource))
        .with_state(Arc::new(dataset))
}

/// Serve the bundled sample.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Dataset::sample()).await
}

pub async fn serve(listener: TcpListener, dataset: Dataset) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(dataset)).await
}

fn wants_exact_count(headers: &HeaderMap) -> bool {
    headers
        .get_all("prefer")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|p| p.trim() == "count=exact")
}

async fn read_resource(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, MockError> {
    let rows = db
        .table(&resource)
        .ok_or_else(|| MockError::UnknownResource(resource.clone()))?;
    let request = ReadRequest::parse(&params)?;
    let result = request.execute(rows);
    let range = result.content_range(wants_exact_count(&headers));
    debug!(%resource, params = params.len(), %range, "read");

    Ok(([(header::CONTENT_RANGE, range)], Json(result.rows)).into_response())
}
