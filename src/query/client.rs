//! JSON-over-HTTP client for the remote query service.
//!
//! # Endpoints
//! ```text
//! POST trace-ids            QueryRequest            → TraceIdsResponse
//! POST trace-summaries      {traceIds, adjusters}   → [TraceSummary]
//! POST trace-combos         {traceIds, adjusters}   → [TraceCombo]
//! GET  services                                     → [string]
//! GET  spans?serviceName=                           → [string]
//! GET  top-annotations?serviceName=                 → [string]
//! GET  top-kv-annotations?serviceName=              → [string]
//! GET  dependencies?startTime=&endTime=             → DependencyGraph
//! GET  ttl/{id}                                     → seconds
//! PUT  ttl/{id}             {ttlSeconds}
//! GET  data-ttl                                     → seconds
//! ```

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::QueryServiceConfig;
use crate::query::service::{QueryError, QueryResult, QueryService};
use crate::query::types::{
    Adjuster, DependencyGraph, QueryRequest, TraceCombo, TraceId, TraceIdsResponse, TraceSummary,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdsRequest<'a> {
    trace_ids: &'a [TraceId],
    adjusters: &'a [Adjuster],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TtlRequest {
    ttl_seconds: u32,
}

/// Query service client backed by `reqwest`.
#[derive(Clone)]
pub struct HttpQueryClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpQueryClient {
    /// Create a client for the configured base URL.
    pub fn new(config: &QueryServiceConfig) -> QueryResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(http, &config.base_url)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> QueryResult<Self> {
        let mut base = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> QueryResult<Url> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> QueryResult<T> {
        let response = self.http.get(self.endpoint(path)?).query(query).send().await?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> QueryResult<T> {
        let response = self.http.post(self.endpoint(path)?).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> QueryResult<T> {
    let body = checked_body(response).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn checked_body(response: reqwest::Response) -> QueryResult<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(QueryError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body.to_vec())
}

#[async_trait]
impl QueryService for HttpQueryClient {
    async fn get_trace_ids(&self, query: &QueryRequest) -> QueryResult<TraceIdsResponse> {
        self.post_json("trace-ids", query).await
    }

    async fn get_trace_summaries_by_ids(
        &self,
        ids: &[TraceId],
        adjusters: &[Adjuster],
    ) -> QueryResult<Vec<TraceSummary>> {
        let body = IdsRequest { trace_ids: ids, adjusters };
        self.post_json("trace-summaries", &body).await
    }

    async fn get_trace_combos_by_ids(
        &self,
        ids: &[TraceId],
        adjusters: &[Adjuster],
    ) -> QueryResult<Vec<TraceCombo>> {
        let body = IdsRequest { trace_ids: ids, adjusters };
        self.post_json("trace-combos", &body).await
    }

    async fn get_service_names(&self) -> QueryResult<HashSet<String>> {
        self.get_json("services", &[]).await
    }

    async fn get_span_names(&self, service_name: &str) -> QueryResult<HashSet<String>> {
        self.get_json("spans", &[("serviceName", service_name.to_string())]).await
    }

    async fn get_top_annotations(&self, service_name: &str) -> QueryResult<Vec<String>> {
        self.get_json("top-annotations", &[("serviceName", service_name.to_string())])
            .await
    }

    async fn get_top_key_value_annotations(&self, service_name: &str) -> QueryResult<Vec<String>> {
        self.get_json("top-kv-annotations", &[("serviceName", service_name.to_string())])
            .await
    }

    async fn get_dependencies(
        &self,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> QueryResult<DependencyGraph> {
        let mut query = Vec::new();
        if let Some(start) = start_time {
            query.push(("startTime", start.to_string()));
        }
        if let Some(end) = end_time {
            query.push(("endTime", end.to_string()));
        }
        self.get_json("dependencies", &query).await
    }

    async fn get_trace_time_to_live(&self, trace_id: TraceId) -> QueryResult<u32> {
        self.get_json(&format!("ttl/{trace_id}"), &[]).await
    }

    async fn set_trace_time_to_live(&self, trace_id: TraceId, ttl_seconds: u32) -> QueryResult<()> {
        let response = self
            .http
            .put(self.endpoint(&format!("ttl/{trace_id}"))?)
            .json(&TtlRequest { ttl_seconds })
            .send()
            .await?;
        checked_body(response).await?;
        Ok(())
    }

    async fn get_data_time_to_live(&self) -> QueryResult<u32> {
        self.get_json("data-ttl", &[]).await
    }
}
