//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use trace_web::config::WebConfig;
use trace_web::query::service::{QueryError, QueryResult, QueryService};
use trace_web::query::types::{
    Adjuster, DependencyGraph, QueryRequest, Span, Trace, TraceCombo, TraceId, TraceIdsResponse,
    TraceSummary,
};
use trace_web::render::Templates;
use trace_web::HttpServer;

/// In-memory query service recording every call it receives.
#[derive(Default)]
pub struct FakeQueryService {
    pub services: Vec<String>,
    pub span_names: Vec<String>,
    pub summaries: Vec<TraceSummary>,
    pub combos: Vec<TraceCombo>,
    pub data_ttl: u32,
    /// Every call fails with this message when set.
    pub failure: Option<String>,
    ttls: Mutex<HashMap<TraceId, u32>>,
    calls: Mutex<Vec<String>>,
}

impl FakeQueryService {
    pub fn new() -> Self {
        Self {
            services: vec!["web".into(), "db".into(), "api".into()],
            span_names: vec!["get".into(), "cache-miss".into(), "get".into()],
            summaries: vec![summary(0x3e8, 1_000, 400), summary(0x7d0, 2_000, 800)],
            combos: vec![combo(0x3e8)],
            data_ttl: 604_800,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> QueryResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(QueryError::Remote(message.clone())),
            None => Ok(()),
        }
    }
}

pub fn summary(id: u64, start: i64, duration: i64) -> TraceSummary {
    TraceSummary {
        trace_id: TraceId(id),
        start_timestamp: start,
        end_timestamp: start + duration,
        duration_micros: duration,
        service_counts: BTreeMap::from([("web".to_string(), 2)]),
    }
}

pub fn combo(id: u64) -> TraceCombo {
    TraceCombo {
        trace: Trace {
            spans: vec![Span {
                trace_id: TraceId(id),
                id: 1,
                parent_id: None,
                name: "get".into(),
                service_name: Some("web".into()),
                timestamp: Some(1_000),
                duration: Some(400),
                annotations: Vec::new(),
                binary_annotations: Vec::new(),
            }],
        },
        summary: Some(summary(id, 1_000, 400)),
        span_depths: Some(BTreeMap::from([(1, 1)])),
    }
}

#[async_trait]
impl QueryService for FakeQueryService {
    async fn get_trace_ids(&self, query: &QueryRequest) -> QueryResult<TraceIdsResponse> {
        self.record(format!("get_trace_ids {}", query.service_name))?;
        let trace_ids = self
            .summaries
            .iter()
            .filter(|s| s.service_counts.contains_key(&query.service_name))
            .map(|s| s.trace_id)
            .collect();
        Ok(TraceIdsResponse {
            trace_ids,
            end_ts: query.end_ts - 1_000,
        })
    }

    async fn get_trace_summaries_by_ids(
        &self,
        ids: &[TraceId],
        _adjusters: &[Adjuster],
    ) -> QueryResult<Vec<TraceSummary>> {
        self.record(format!("get_trace_summaries_by_ids {}", ids.len()))?;
        Ok(self
            .summaries
            .iter()
            .filter(|s| ids.contains(&s.trace_id))
            .cloned()
            .collect())
    }

    async fn get_trace_combos_by_ids(
        &self,
        ids: &[TraceId],
        _adjusters: &[Adjuster],
    ) -> QueryResult<Vec<TraceCombo>> {
        self.record(format!("get_trace_combos_by_ids {}", ids.len()))?;
        Ok(self
            .combos
            .iter()
            .filter(|c| c.summary.as_ref().is_some_and(|s| ids.contains(&s.trace_id)))
            .cloned()
            .collect())
    }

    async fn get_service_names(&self) -> QueryResult<HashSet<String>> {
        self.record("get_service_names".to_string())?;
        Ok(self.services.iter().cloned().collect())
    }

    async fn get_span_names(&self, service_name: &str) -> QueryResult<HashSet<String>> {
        self.record(format!("get_span_names {service_name}"))?;
        Ok(self.span_names.iter().cloned().collect())
    }

    async fn get_top_annotations(&self, service_name: &str) -> QueryResult<Vec<String>> {
        self.record(format!("get_top_annotations {service_name}"))?;
        Ok(vec!["error".into()])
    }

    async fn get_top_key_value_annotations(&self, service_name: &str) -> QueryResult<Vec<String>> {
        self.record(format!("get_top_key_value_annotations {service_name}"))?;
        Ok(vec!["http.uri".into()])
    }

    async fn get_dependencies(
        &self,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> QueryResult<DependencyGraph> {
        self.record(format!("get_dependencies {start_time:?} {end_time:?}"))?;
        Ok(DependencyGraph {
            start_time: start_time.unwrap_or(0),
            end_time: end_time.unwrap_or(0),
            links: Vec::new(),
        })
    }

    async fn get_trace_time_to_live(&self, trace_id: TraceId) -> QueryResult<u32> {
        self.record(format!("get_trace_time_to_live {}", trace_id.0))?;
        let ttls = self.ttls.lock().unwrap();
        Ok(ttls.get(&trace_id).copied().unwrap_or(self.data_ttl))
    }

    async fn set_trace_time_to_live(&self, trace_id: TraceId, ttl_seconds: u32) -> QueryResult<()> {
        self.record(format!("set_trace_time_to_live {} {}", trace_id.0, ttl_seconds))?;
        self.ttls.lock().unwrap().insert(trace_id, ttl_seconds);
        Ok(())
    }

    async fn get_data_time_to_live(&self) -> QueryResult<u32> {
        self.record("get_data_time_to_live".to_string())?;
        Ok(self.data_ttl)
    }
}

/// A server over a fake query service, with assets in a temporary root.
pub struct TestApp {
    pub router: Router,
    pub service: Arc<FakeQueryService>,
    pub assets: TempDir,
}

/// Config pointing assets at `root`.
pub fn test_config(root: &Path) -> WebConfig {
    let mut config = WebConfig::default();
    config.assets.packaged_root = root.display().to_string();
    config.assets.dev_root = root.display().to_string();
    config.ui.pin_ttl_days = 60;
    config.observability.metrics_enabled = false;
    config
}

/// The templates shipped with the crate.
pub fn shipped_templates() -> Templates {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
    Templates::load_dir(&dir).unwrap()
}

pub fn app(service: FakeQueryService) -> TestApp {
    app_with(service, |_| {})
}

pub fn app_with(service: FakeQueryService, configure: impl FnOnce(&mut WebConfig)) -> TestApp {
    let assets = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(assets.path().join("public/css")).unwrap();
    std::fs::write(assets.path().join("public/css/app.css"), "body { margin: 0 }").unwrap();
    std::fs::write(assets.path().join("secret.txt"), "secret").unwrap();

    let mut config = test_config(assets.path());
    configure(&mut config);

    let service = Arc::new(service);
    let server = HttpServer::new(config, service.clone(), shipped_templates());
    TestApp {
        router: server.router(),
        service,
        assets,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

pub async fn send(router: &Router, method: Method, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri).await
}
