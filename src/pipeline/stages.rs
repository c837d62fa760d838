//! Concrete pipeline stages.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::http::error::WebError;
use crate::http::request::WebRequest;
use crate::http::response::WebResponse;
use crate::observability::metrics;
use crate::pipeline::{Filter, Handler, HandlerResult};
use crate::render::{DataBag, Renderer, Templates, TEXT_PLAIN};
use crate::routing::matcher::PathTemplate;

/// Name of the template browser pages are embedded in.
pub const LAYOUT_TEMPLATE: &str = "layout";

/// Records status and latency of every response.
#[derive(Debug, Default)]
pub struct StatsFilter;

impl Filter<WebResponse, WebResponse> for StatsFilter {
    fn apply<'a>(
        &'a self,
        req: WebRequest,
        next: &'a dyn Handler<WebResponse>,
    ) -> BoxFuture<'a, WebResponse> {
        Box::pin(async move {
            let start = Instant::now();
            let method = req.method().clone();
            let path = req.path().to_string();

            let response = next.handle(req).await;

            metrics::record_request(response.status.as_u16(), start);
            tracing::debug!(
                method = %method,
                path = %path,
                status = response.status.as_u16(),
                bytes = response.body.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request completed"
            );
            response
        })
    }
}

/// Turns a renderer into a response with a known content length.
pub struct RenderFilter {
    templates: Arc<Templates>,
}

impl RenderFilter {
    pub fn new(templates: Arc<Templates>) -> Self {
        Self { templates }
    }
}

impl Filter<Renderer, WebResponse> for RenderFilter {
    fn apply<'a>(
        &'a self,
        req: WebRequest,
        next: &'a dyn Handler<Renderer>,
    ) -> BoxFuture<'a, WebResponse> {
        Box::pin(async move {
            let renderer = next.handle(req).await;

            let mut response = match renderer.render(&self.templates) {
                Ok(rendered) => WebResponse::from(rendered),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to render response");
                    WebResponse::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        TEXT_PLAIN,
                        format!("{}\n\n{}", e, e.diagnostic_trace()),
                    )
                }
            };
            response.finalize_length();
            response
        })
    }
}

/// The single point where failures become responses.
///
/// Client errors keep their status and message. Everything else, panics
/// included, becomes a 500 carrying the message and a diagnostic trace.
#[derive(Debug, Default)]
pub struct ExceptionFilter;

impl Filter<HandlerResult, Renderer> for ExceptionFilter {
    fn apply<'a>(
        &'a self,
        req: WebRequest,
        next: &'a dyn Handler<HandlerResult>,
    ) -> BoxFuture<'a, Renderer> {
        Box::pin(async move {
            let path = req.path().to_string();
            let outcome = AssertUnwindSafe(async move { next.handle(req).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(renderer)) => renderer,
                Ok(Err(err)) => {
                    if err.is_client_error() {
                        tracing::debug!(path = %path, error = %err, "Request rejected");
                    } else {
                        tracing::error!(path = %path, error = ?err, "Request failed");
                    }
                    Renderer::from_error(&err)
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(path = %path, panic = %message, "Handler panicked");
                    Renderer::internal_error(&message, &format!("panicked while handling {path}"))
                }
            }
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Rejects paths with fewer segments than a route template names.
#[derive(Debug, Clone)]
pub struct PathGuard {
    required: Option<usize>,
}

impl PathGuard {
    pub fn new(template: &str) -> Self {
        let template = PathTemplate::new(template);
        let required = template
            .has_variables()
            .then(|| template.segment_count());
        Self { required }
    }
}

impl Filter<HandlerResult, HandlerResult> for PathGuard {
    fn apply<'a>(
        &'a self,
        req: WebRequest,
        next: &'a dyn Handler<HandlerResult>,
    ) -> BoxFuture<'a, HandlerResult> {
        match self.required {
            Some(required) if req.segments().len() < required => {
                Box::pin(async { Err(WebError::NotFound) })
            }
            _ => next.handle(req),
        }
    }
}

/// Embeds templated page bodies into the layout template.
///
/// Only successful template renderers are wrapped; errors, JSON and static
/// payloads pass through untouched.
pub struct LayoutFilter {
    templates: Arc<Templates>,
    root_url: Option<String>,
}

impl LayoutFilter {
    pub fn new(templates: Arc<Templates>, root_url: Option<String>) -> Self {
        Self {
            templates,
            root_url,
        }
    }

    fn wrap(&self, name: &str, data: &DataBag) -> HandlerResult {
        let body = self.templates.render(name, data)?;

        let mut layout = DataBag::new();
        layout.insert("body", &body)?;
        if let Some(root_url) = &self.root_url {
            layout.insert("rootUrl", root_url)?;
        }
        Ok(Renderer::template(LAYOUT_TEMPLATE, layout))
    }
}

impl Filter<HandlerResult, HandlerResult> for LayoutFilter {
    fn apply<'a>(
        &'a self,
        req: WebRequest,
        next: &'a dyn Handler<HandlerResult>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            match next.handle(req).await? {
                Renderer::Template { name, data } => self.wrap(&name, &data),
                other => Ok(other),
            }
        })
    }
}

/// Answers 401 when a request parameter is absent.
#[derive(Debug, Clone)]
pub struct RequireParam {
    name: &'static str,
}

impl RequireParam {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Filter<HandlerResult, HandlerResult> for RequireParam {
    fn apply<'a>(
        &'a self,
        req: WebRequest,
        next: &'a dyn Handler<HandlerResult>,
    ) -> BoxFuture<'a, HandlerResult> {
        if req.param(self.name).is_some() {
            next.handle(req)
        } else {
            let message = format!("{} required", self.name);
            Box::pin(async move { Ok(Renderer::error(StatusCode::UNAUTHORIZED, message)) })
        }
    }
}
