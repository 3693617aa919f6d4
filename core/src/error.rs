//! Error types for the LCA API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "nothing
//! there" from "the server returned an unexpected status." All other non-2xx
//! responses land in `HttpError` with the raw status code and body. There is
//! no retry at this layer.
//!
//! A missing or malformed `Content-Range` header is not an error; it degrades
//! to `TotalCount::Unknown`.

use thiserror::Error;

/// Errors returned by `LcaClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404, or a single-row resource came back empty.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-success status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}
