//! Types exchanged with the remote trace query service.
//!
//! Wire JSON uses camelCase field names. Trace IDs travel as plain integers
//! and are shown to users as 16-digit hex.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier shared by every span of one trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(pub u64);

impl From<u64> for TraceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Error returned when a path segment is not a hex trace ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trace id '{0}'")]
pub struct ParseTraceIdError(pub String);

impl FromStr for TraceId {
    type Err = ParseTraceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 16 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseTraceIdError(s.to_string()));
        }
        u64::from_str_radix(s, 16)
            .map(TraceId)
            .map_err(|_| ParseTraceIdError(s.to_string()))
    }
}

/// Result ordering requested from the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Order {
    #[default]
    DurationDesc,
}

/// Key/value predicate on a binary annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueAnnotation {
    pub key: String,
    pub value: String,
}

/// A trace search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub service_name: String,
    pub span_name: Option<String>,
    /// Plain annotations that must exist on a matching trace.
    pub annotations: Vec<String>,
    pub binary_annotations: Vec<KeyValueAnnotation>,
    /// Upper bound of the search window, microseconds since the epoch.
    pub end_ts: i64,
    pub limit: u32,
    pub order: Order,
}

impl QueryRequest {
    /// Create an unfiltered query for a service.
    pub fn new(service_name: impl Into<String>, end_ts: i64, limit: u32) -> Self {
        Self {
            service_name: service_name.into(),
            span_name: None,
            annotations: Vec::new(),
            binary_annotations: Vec::new(),
            end_ts,
            limit,
            order: Order::DurationDesc,
        }
    }

    /// True when the query carries at least one annotation predicate.
    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty() || !self.binary_annotations.is_empty()
    }

    /// Same query over a window ending at `end_ts`.
    pub fn with_end_ts(&self, end_ts: i64) -> Self {
        Self {
            end_ts,
            ..self.clone()
        }
    }
}

/// Answer to a trace ID lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceIdsResponse {
    pub trace_ids: Vec<TraceId>,
    /// Earliest timestamp the lookup scanned, microseconds.
    pub end_ts: i64,
}

/// Post-processing applied by the query service to fetched traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Adjuster {
    /// Correct clock skew between services.
    TimeSkew,
}

/// Aggregate view of one trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    pub trace_id: TraceId,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub duration_micros: i64,
    /// Span count per service name.
    #[serde(default)]
    pub service_counts: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub timestamp: i64,
    pub value: String,
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryAnnotation {
    pub key: String,
    pub value: String,
    pub service_name: Option<String>,
}

/// A single timed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub trace_id: TraceId,
    pub id: u64,
    pub parent_id: Option<u64>,
    pub name: String,
    pub service_name: Option<String>,
    pub timestamp: Option<i64>,
    pub duration: Option<i64>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub binary_annotations: Vec<BinaryAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub spans: Vec<Span>,
}

/// A trace bundled with its summary and span depths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceCombo {
    pub trace: Trace,
    pub summary: Option<TraceSummary>,
    /// Depth of each span in the call tree, keyed by span ID.
    pub span_depths: Option<BTreeMap<u64, u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyLink {
    pub parent: String,
    pub child: String,
    pub call_count: u64,
}

/// Service call graph over a time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    pub start_time: i64,
    pub end_time: i64,
    pub links: Vec<DependencyLink>,
}
