use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures reported to clients with PostgREST-style error bodies.
#[derive(Error, Debug)]
pub enum MockError {
    #[error("relation \"{0}\" does not exist")]
    UnknownResource(String),

    #[error("failed to parse filter: {0}")]
    MalformedFilter(String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            MockError::UnknownResource(_) => (StatusCode::NOT_FOUND, "PGRST205"),
            MockError::MalformedFilter(_) => (StatusCode::BAD_REQUEST, "PGRST100"),
        };

        (status, Json(json!({ "code": code, "message": self.to_string() }))).into_response()
    }
}
