//! JSON API endpoints.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::handlers::{trace_id_at, WebContext, SERVICE_NAME};
use crate::http::error::WebError;
use crate::http::request::WebRequest;
use crate::pipeline::HandlerResult;
use crate::query::params::adjusters;
use crate::render::Renderer;

/// Trace search. Without a service name the answer is an empty list and
/// the query service is not called.
pub async fn query(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let Some(query) = ctx.extractor.extract(&req, Utc::now()) else {
        return Ok(Renderer::Json(Value::Array(Vec::new())));
    };

    let results = ctx.resolver.query(query, &adjusters(&req)).await?;
    Ok(Renderer::json(&results.traces)?)
}

pub async fn services(ctx: Arc<WebContext>, _req: WebRequest) -> HandlerResult {
    Ok(Renderer::json(&ctx.resolver.service_names().await?)?)
}

pub async fn spans(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let names = ctx.resolver.span_names(service_name(&req)).await?;
    Ok(Renderer::json(&names)?)
}

pub async fn top_annotations(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let annotations = ctx
        .resolver
        .service()
        .get_top_annotations(service_name(&req))
        .await?;
    Ok(Renderer::json(&annotations)?)
}

pub async fn top_kv_annotations(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let annotations = ctx
        .resolver
        .service()
        .get_top_key_value_annotations(service_name(&req))
        .await?;
    Ok(Renderer::json(&annotations)?)
}

/// Dependency graph, optionally bounded by `/:start/:end` in microseconds.
pub async fn dependencies(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let (start, end) = {
        let segments = req.segments();
        (time_segment(&segments, 3)?, time_segment(&segments, 4)?)
    };

    let graph = ctx.resolver.service().get_dependencies(start, end).await?;
    Ok(Renderer::json(&graph)?)
}

pub async fn trace(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let trace_id = trace_id_at(&req, 3)?;
    let detail = ctx
        .resolver
        .trace_detail(trace_id, &adjusters(&req))
        .await?
        .ok_or(WebError::NotFound)?;
    Ok(Renderer::json(&detail)?)
}

pub async fn trace_combo(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let trace_id = trace_id_at(&req, 3)?;
    let combo = ctx
        .resolver
        .trace_combo(trace_id, &adjusters(&req))
        .await?
        .ok_or(WebError::NotFound)?;
    Ok(Renderer::json(&combo)?)
}

/// Present on every request reaching the service-scoped endpoints.
fn service_name(req: &WebRequest) -> &str {
    req.param(SERVICE_NAME).unwrap_or_default()
}

fn time_segment(segments: &[&str], index: usize) -> Result<Option<i64>, WebError> {
    match segments.get(index) {
        None => Ok(None),
        Some(segment) => segment
            .parse()
            .map(Some)
            .map_err(|_| WebError::bad_request(format!("'{segment}' is not a timestamp"))),
    }
}
