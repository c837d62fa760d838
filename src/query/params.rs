//! Extraction of trace searches from request parameters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::http::request::WebRequest;
use crate::query::types::{Adjuster, KeyValueAnnotation, QueryRequest};

pub const END_DATE_FORMAT: &str = "%m-%d-%Y";
pub const END_TIME_FORMAT: &str = "%H:%M:%S";

/// Builds `QueryRequest`s from the index and query endpoint parameters.
#[derive(Debug, Clone, Copy)]
pub struct QueryExtractor {
    default_limit: u32,
}

impl QueryExtractor {
    pub fn new(default_limit: u32) -> Self {
        Self { default_limit }
    }

    /// Build a query, or `None` when no service name was given.
    pub fn extract(&self, req: &WebRequest, now: DateTime<Utc>) -> Option<QueryRequest> {
        let service_name = req.param("serviceName").filter(|s| !s.is_empty())?;

        let span_name = req
            .param("spanName")
            .filter(|s| !s.is_empty() && *s != "all")
            .map(String::from);

        let (annotations, binary_annotations) = req
            .param("annotationQuery")
            .map(parse_annotation_query)
            .unwrap_or_default();

        Some(QueryRequest {
            service_name: service_name.to_string(),
            span_name,
            annotations,
            binary_annotations,
            end_ts: end_timestamp(req.param("endDate"), req.param("endTime"), now),
            limit: self.limit(req),
            order: Default::default(),
        })
    }

    /// Result limit, falling back to the default when absent or malformed.
    pub fn limit(&self, req: &WebRequest) -> u32 {
        req.param("limit")
            .and_then(|l| l.parse().ok())
            .filter(|l| *l > 0)
            .unwrap_or(self.default_limit)
    }
}

/// Adjusters requested by `adjust_clock_skew`; clock skew correction is on by default.
pub fn adjusters(req: &WebRequest) -> Vec<Adjuster> {
    match req.param("adjust_clock_skew") {
        Some("false") => Vec::new(),
        _ => vec![Adjuster::TimeSkew],
    }
}

/// Split `a and b=c and d` into plain and key/value annotations.
pub fn parse_annotation_query(query: &str) -> (Vec<String>, Vec<KeyValueAnnotation>) {
    let mut plain = Vec::new();
    let mut key_values = Vec::new();

    for token in query.split(" and ").map(str::trim).filter(|t| !t.is_empty()) {
        match token.split_once('=') {
            Some((key, value)) => key_values.push(KeyValueAnnotation {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            }),
            None => plain.push(token.to_string()),
        }
    }

    (plain, key_values)
}

/// End of the search window in microseconds. Dates are read as UTC.
pub fn end_timestamp(date: Option<&str>, time: Option<&str>, now: DateTime<Utc>) -> i64 {
    let parsed = date
        .and_then(|d| NaiveDate::parse_from_str(d, END_DATE_FORMAT).ok())
        .map(|d| {
            let t = time
                .and_then(|t| NaiveTime::parse_from_str(t, END_TIME_FORMAT).ok())
                .unwrap_or_else(end_of_day);
            NaiveDateTime::new(d, t).and_utc()
        });

    parsed.unwrap_or(now).timestamp_micros()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}
