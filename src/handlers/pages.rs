//! Browser pages.
//!
//! Each page returns a template renderer; the layout stage embeds it.

use std::sync::Arc;

use chrono::Utc;

use crate::handlers::{trace_id_at, WebContext, SERVICE_NAME};
use crate::http::error::WebError;
use crate::http::request::WebRequest;
use crate::pipeline::HandlerResult;
use crate::query::params::{adjusters, END_DATE_FORMAT, END_TIME_FORMAT};
use crate::render::{DataBag, Renderer};

/// Search form, plus results when a service name was given.
pub async fn index(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let now = Utc::now();

    let mut data = DataBag::new();
    data.insert("pageTitle", "Index")?;
    data.insert(SERVICE_NAME, &req.param(SERVICE_NAME))?;
    data.insert("spanName", &req.param("spanName"))?;
    data.insert("annotationQuery", &req.param("annotationQuery"))?;
    data.insert(
        "endDate",
        req.param("endDate")
            .map(String::from)
            .unwrap_or_else(|| now.format(END_DATE_FORMAT).to_string())
            .as_str(),
    )?;
    data.insert(
        "endTime",
        req.param("endTime")
            .map(String::from)
            .unwrap_or_else(|| now.format(END_TIME_FORMAT).to_string())
            .as_str(),
    )?;
    data.insert("limit", &ctx.extractor.limit(&req))?;

    if let Some(query) = ctx.extractor.extract(&req, now) {
        let results = ctx.resolver.query(query, &adjusters(&req)).await?;
        data.insert("count", &results.len())?;
        data.insert("queryResults", &results)?;
    }

    Ok(Renderer::template("index", data))
}

pub async fn static_page(_ctx: Arc<WebContext>, _req: WebRequest) -> HandlerResult {
    let mut data = DataBag::new();
    data.insert("pageTitle", "Static")?;
    Ok(Renderer::template("static", data))
}

pub async fn aggregates(_ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let mut data = DataBag::new();
    data.insert("pageTitle", "Aggregates")?;
    data.insert(SERVICE_NAME, &req.param(SERVICE_NAME))?;
    data.insert(
        "endDate",
        req.param("endDate")
            .map(String::from)
            .unwrap_or_else(|| Utc::now().format(END_DATE_FORMAT).to_string())
            .as_str(),
    )?;
    Ok(Renderer::template("aggregates", data))
}

/// A single trace; unknown or malformed IDs are NotFound.
pub async fn trace(ctx: Arc<WebContext>, req: WebRequest) -> HandlerResult {
    let trace_id = trace_id_at(&req, 2)?;
    let detail = ctx
        .resolver
        .trace_detail(trace_id, &adjusters(&req))
        .await?
        .ok_or(WebError::NotFound)?;

    let mut data = DataBag::new();
    data.insert("pageTitle", "Trace")?;
    data.insert("traceId", &detail.trace_id)?;
    data.insert("trace", &detail)?;
    Ok(Renderer::template("trace", data))
}
