//! Contract required from the remote trace query service.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::query::types::{
    Adjuster, DependencyGraph, QueryRequest, TraceCombo, TraceId, TraceIdsResponse, TraceSummary,
};

/// Errors raised while talking to the query service.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Connection, timeout or protocol failure.
    #[error("query service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("query service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("malformed query service response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid query service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failure reported by the service itself.
    #[error("{0}")]
    Remote(String),
}

/// Result type for query service operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Operations the web front end needs from trace storage.
///
/// Every call is a suspension point; implementations must be shareable across
/// concurrent requests.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Trace IDs matching `query`, plus the earliest timestamp scanned.
    async fn get_trace_ids(&self, query: &QueryRequest) -> QueryResult<TraceIdsResponse>;

    async fn get_trace_summaries_by_ids(
        &self,
        ids: &[TraceId],
        adjusters: &[Adjuster],
    ) -> QueryResult<Vec<TraceSummary>>;

    async fn get_trace_combos_by_ids(
        &self,
        ids: &[TraceId],
        adjusters: &[Adjuster],
    ) -> QueryResult<Vec<TraceCombo>>;

    async fn get_service_names(&self) -> QueryResult<HashSet<String>>;

    async fn get_span_names(&self, service_name: &str) -> QueryResult<HashSet<String>>;

    async fn get_top_annotations(&self, service_name: &str) -> QueryResult<Vec<String>>;

    async fn get_top_key_value_annotations(&self, service_name: &str) -> QueryResult<Vec<String>>;

    /// Dependency graph; an absent bound lets the service pick its default window.
    async fn get_dependencies(
        &self,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> QueryResult<DependencyGraph>;

    /// Current TTL of one trace, in seconds.
    async fn get_trace_time_to_live(&self, trace_id: TraceId) -> QueryResult<u32>;

    async fn set_trace_time_to_live(&self, trace_id: TraceId, ttl_seconds: u32) -> QueryResult<()>;

    /// Default TTL for stored data, in seconds.
    async fn get_data_time_to_live(&self) -> QueryResult<u32>;
}
