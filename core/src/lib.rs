//! Synchronous query client core for the H1B LCA disclosure API.
//!
//! # Overview
//! Turns search filters into PostgREST query parameters, builds
//! `HttpRequest` values and parses `HttpResponse` values without touching
//! the network (host-does-IO pattern). The caller executes the actual HTTP
//! round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `LcaClient` is stateless; it holds only `base_url`.
//! - Each read is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `query` owns the filter → parameter rules, `states` the state
//!   name ⇄ code expansion they rely on.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod states;
pub mod types;

pub use client::{parse_content_range, LcaClient};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{build_query, QueryParams};
pub use states::{detect_state, expand_location, state_suggestion, MatchRule, StateMatch};
pub use types::{
    EmployerSummary, FilterState, LcaStats, Page, Record, Sort, SortDirection, StateStats,
    SuggestField, TotalCount, WageLevel,
};
