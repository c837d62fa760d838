//! Trace query resolution.
//!
//! # Algorithm
//! ```text
//! get_trace_ids(query)
//!     → ids found:  get_trace_summaries_by_ids(ids, adjusters) → format
//!     → no ids, annotation predicates present, budget left:
//!           retry with end_ts = response.end_ts, budget - 1
//!     → otherwise: empty result
//! ```
//!
//! An annotation match can be sparse relative to the bounded ID scan the
//! service performs, so an empty answer for a filtered query only means the
//! scanned window held no match. Stepping `end_ts` back to the earliest
//! timestamp scanned walks the window backwards in time.

use std::sync::Arc;

use crate::observability::metrics;
use crate::query::service::{QueryResult, QueryService};
use crate::query::summary::{QueryResults, TraceDetail};
use crate::query::types::{Adjuster, QueryRequest, TraceCombo, TraceId, TraceSummary};

/// Resolves web queries against the remote query service.
pub struct QueryResolver {
    service: Arc<dyn QueryService>,
    max_retries: u32,
}

impl QueryResolver {
    /// Create a resolver that retries empty annotation queries up to `max_retries` times.
    pub fn new(service: Arc<dyn QueryService>, max_retries: u32) -> Self {
        Self {
            service,
            max_retries,
        }
    }

    /// The underlying query service.
    pub fn service(&self) -> &dyn QueryService {
        self.service.as_ref()
    }

    /// Find the traces matching `query`.
    pub async fn trace_summaries(
        &self,
        query: QueryRequest,
        adjusters: &[Adjuster],
    ) -> QueryResult<Vec<TraceSummary>> {
        let mut query = query;
        let mut retries_left = self.max_retries;

        loop {
            let response = self.service.get_trace_ids(&query).await?;

            if !response.trace_ids.is_empty() {
                tracing::debug!(
                    service = %query.service_name,
                    traces = response.trace_ids.len(),
                    attempts = self.max_retries - retries_left + 1,
                    "Trace ids resolved"
                );
                return self
                    .service
                    .get_trace_summaries_by_ids(&response.trace_ids, adjusters)
                    .await;
            }

            if !query.has_annotations() || retries_left == 0 {
                tracing::debug!(
                    service = %query.service_name,
                    retries_left,
                    "No trace ids matched"
                );
                return Ok(Vec::new());
            }

            retries_left -= 1;
            metrics::record_trace_id_retry();
            tracing::debug!(
                service = %query.service_name,
                end_ts = response.end_ts,
                retries_left,
                "Retrying annotation query over an earlier window"
            );
            query = query.with_end_ts(response.end_ts);
        }
    }

    /// Find the traces matching `query`, formatted for presentation.
    pub async fn query(
        &self,
        query: QueryRequest,
        adjusters: &[Adjuster],
    ) -> QueryResult<QueryResults> {
        let summaries = self.trace_summaries(query, adjusters).await?;
        Ok(QueryResults::from(summaries))
    }

    /// Fetch one trace with its summary and span depths.
    pub async fn trace_combo(
        &self,
        trace_id: TraceId,
        adjusters: &[Adjuster],
    ) -> QueryResult<Option<TraceCombo>> {
        let combos = self
            .service
            .get_trace_combos_by_ids(&[trace_id], adjusters)
            .await?;
        Ok(combos.into_iter().next())
    }

    /// Fetch one trace in its presentation shape.
    pub async fn trace_detail(
        &self,
        trace_id: TraceId,
        adjusters: &[Adjuster],
    ) -> QueryResult<Option<TraceDetail>> {
        Ok(self.trace_combo(trace_id, adjusters).await?.map(TraceDetail::from))
    }

    /// All service names, sorted.
    pub async fn service_names(&self) -> QueryResult<Vec<String>> {
        Ok(sorted(self.service.get_service_names().await?))
    }

    /// Span names recorded for a service, sorted.
    pub async fn span_names(&self, service_name: &str) -> QueryResult<Vec<String>> {
        Ok(sorted(self.service.get_span_names(service_name).await?))
    }

    /// Current TTL of a trace, in seconds.
    pub async fn pin_ttl(&self, trace_id: TraceId) -> QueryResult<u32> {
        self.service.get_trace_time_to_live(trace_id).await
    }

    /// Pin or unpin a trace.
    ///
    /// Pinning sets the trace TTL to `pin_ttl_secs`; unpinning restores the
    /// service's default data TTL. Returns the resulting pin state.
    pub async fn toggle_pin(
        &self,
        trace_id: TraceId,
        pinned: bool,
        pin_ttl_secs: u32,
    ) -> QueryResult<bool> {
        let ttl = if pinned {
            pin_ttl_secs
        } else {
            self.service.get_data_time_to_live().await?
        };

        self.service.set_trace_time_to_live(trace_id, ttl).await?;
        tracing::info!(trace_id = %trace_id, pinned, ttl_secs = ttl, "Trace pin updated");
        Ok(pinned)
    }
}

fn sorted(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();
    names.dedup();
    names
}
