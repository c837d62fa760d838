//! Presentation shapes for query results.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::query::types::{Span, TraceCombo, TraceSummary};

/// One row of a trace search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub trace_id: String,
    pub start_timestamp: i64,
    pub duration_micros: i64,
    pub service_counts: BTreeMap<String, u32>,
    /// Duration relative to the slowest trace in the result, 0-100.
    pub width: u32,
}

/// A formatted trace search result, slowest trace first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub traces: Vec<SummaryRow>,
    pub max_duration: i64,
    pub min_start_timestamp: i64,
    pub max_start_timestamp: i64,
}

impl QueryResults {
    /// The constant answer for a query that matched nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }
}

impl From<Vec<TraceSummary>> for QueryResults {
    fn from(summaries: Vec<TraceSummary>) -> Self {
        if summaries.is_empty() {
            return Self::empty();
        }

        let max_duration = summaries.iter().map(|s| s.duration_micros).max().unwrap_or(0);
        let min_start_timestamp = summaries.iter().map(|s| s.start_timestamp).min().unwrap_or(0);
        let max_start_timestamp = summaries.iter().map(|s| s.start_timestamp).max().unwrap_or(0);

        let mut traces: Vec<SummaryRow> = summaries
            .into_iter()
            .map(|s| SummaryRow {
                trace_id: s.trace_id.to_string(),
                start_timestamp: s.start_timestamp,
                duration_micros: s.duration_micros,
                service_counts: s.service_counts,
                width: relative_width(s.duration_micros, max_duration),
            })
            .collect();
        traces.sort_by(|a, b| b.duration_micros.cmp(&a.duration_micros));

        Self {
            traces,
            max_duration,
            min_start_timestamp,
            max_start_timestamp,
        }
    }
}

fn relative_width(duration: i64, max_duration: i64) -> u32 {
    if max_duration <= 0 || duration <= 0 {
        return 0;
    }
    let percent = i128::from(duration) * 100 / i128::from(max_duration);
    percent.clamp(0, 100) as u32
}

/// Single-trace view served by the trace API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceDetail {
    pub trace_id: String,
    pub start_timestamp: i64,
    pub duration_micros: i64,
    pub services: Vec<String>,
    pub span_depths: BTreeMap<u64, u32>,
    pub spans: Vec<Span>,
}

impl From<TraceCombo> for TraceDetail {
    fn from(combo: TraceCombo) -> Self {
        let spans = combo.trace.spans;
        let (start_timestamp, duration_micros) = match &combo.summary {
            Some(summary) => (summary.start_timestamp, summary.duration_micros),
            None => span_bounds(&spans),
        };
        let trace_id = combo
            .summary
            .as_ref()
            .map(|s| s.trace_id)
            .or_else(|| spans.first().map(|s| s.trace_id))
            .map(|id| id.to_string())
            .unwrap_or_default();
        let services: BTreeSet<String> =
            spans.iter().filter_map(|s| s.service_name.clone()).collect();

        Self {
            trace_id,
            start_timestamp,
            duration_micros,
            services: services.into_iter().collect(),
            span_depths: combo.span_depths.unwrap_or_default(),
            spans,
        }
    }
}

/// Start and duration covered by the timed spans.
fn span_bounds(spans: &[Span]) -> (i64, i64) {
    let start = spans.iter().filter_map(|s| s.timestamp).min();
    let end = spans
        .iter()
        .filter_map(|s| Some(s.timestamp? + s.duration.unwrap_or(0)))
        .max();
    match (start, end) {
        (Some(start), Some(end)) => (start, end - start),
        _ => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::{Trace, TraceId};

    fn summary(id: u64, start: i64, duration: i64) -> TraceSummary {
        TraceSummary {
            trace_id: TraceId(id),
            start_timestamp: start,
            end_timestamp: start + duration,
            duration_micros: duration,
            service_counts: BTreeMap::from([("web".to_string(), 2)]),
        }
    }

    #[test]
    fn test_widths_and_order() {
        let results = QueryResults::from(vec![
            summary(1, 300, 50),
            summary(2, 100, 200),
            summary(3, 200, 133),
        ]);

        assert_eq!(results.max_duration, 200);
        assert_eq!(results.min_start_timestamp, 100);
        assert_eq!(results.max_start_timestamp, 300);

        let widths: Vec<_> = results.traces.iter().map(|r| (r.trace_id.as_str(), r.width)).collect();
        assert_eq!(
            widths,
            vec![("0000000000000002", 100), ("0000000000000003", 66), ("0000000000000001", 25)]
        );
    }

    #[test]
    fn test_zero_durations() {
        let results = QueryResults::from(vec![summary(1, 0, 0)]);
        assert_eq!(results.traces[0].width, 0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(QueryResults::from(Vec::new()), QueryResults::empty());
    }

    #[test]
    fn test_detail_from_spans() {
        let span = |id, ts, dur, svc: &str| Span {
            trace_id: TraceId(9),
            id,
            parent_id: None,
            name: "get".into(),
            service_name: Some(svc.into()),
            timestamp: Some(ts),
            duration: Some(dur),
            annotations: Vec::new(),
            binary_annotations: Vec::new(),
        };
        let combo = TraceCombo {
            trace: Trace {
                spans: vec![span(1, 100, 50, "web"), span(2, 120, 80, "db")],
            },
            summary: None,
            span_depths: None,
        };

        let detail = TraceDetail::from(combo);
        assert_eq!(detail.trace_id, "0000000000000009");
        assert_eq!(detail.start_timestamp, 100);
        assert_eq!(detail.duration_micros, 100);
        assert_eq!(detail.services, vec!["db", "web"]);
    }
}
