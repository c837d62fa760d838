//! Terminal handlers and route registration.
//!
//! # Route Wiring
//! ```text
//! browser page:  LayoutFilter → PathGuard → page handler
//! API endpoint:  PathGuard → [RequireParam("serviceName")] → API handler
//! static asset:  PathGuard → ResourceCache lookup
//! ```

pub mod api;
pub mod assets;
pub mod pages;
pub mod pin;

use std::future::Future;
use std::sync::Arc;

use crate::config::{UiConfig, WebConfig};
use crate::http::error::WebError;
use crate::http::request::WebRequest;
use crate::pipeline::{
    handler_fn, FilterExt, Handler, HandlerResult, LayoutFilter, PathGuard, RequireParam,
};
use crate::query::{QueryExtractor, QueryResolver, QueryService, TraceId};
use crate::render::Templates;
use crate::resources::ResourceCache;
use crate::routing::RouteTable;

/// Query parameter naming the service a request is about.
pub const SERVICE_NAME: &str = "serviceName";

/// Process-wide state shared by every handler.
pub struct WebContext {
    pub resolver: QueryResolver,
    pub assets: ResourceCache,
    pub templates: Arc<Templates>,
    pub extractor: QueryExtractor,
    pub ui: UiConfig,
}

impl WebContext {
    pub fn new(config: &WebConfig, service: Arc<dyn QueryService>, templates: Templates) -> Self {
        Self {
            resolver: QueryResolver::new(service, config.query_service.max_trace_id_retries),
            assets: ResourceCache::from_config(&config.assets),
            templates: Arc::new(templates),
            extractor: QueryExtractor::new(config.ui.default_limit),
            ui: config.ui.clone(),
        }
    }
}

/// Every browser and API route.
pub fn routes(ctx: &Arc<WebContext>) -> RouteTable {
    Routes::new(ctx)
        .page("/", pages::index)
        .page("/static", pages::static_page)
        .page("/aggregates", pages::aggregates)
        .page("/traces/:id", pages::trace)
        .api("/api/query", api::query)
        .api("/api/services", api::services)
        .service_api("/api/spans", api::spans)
        .service_api("/api/top_annotations", api::top_annotations)
        .service_api("/api/top_kv_annotations", api::top_kv_annotations)
        .api("/api/dependencies", api::dependencies)
        .api("/api/dependencies/:start", api::dependencies)
        .api("/api/trace/:id", api::trace)
        .api("/api/trace-combo/:id", api::trace_combo)
        .api("/api/pin/:id", pin::is_pinned)
        .api("/api/pin/:id/:state", pin::toggle)
        .api("/public/:asset", assets::asset)
        .build()
}

/// Parse the trace ID at `index` in the request path; anything else is NotFound.
pub(crate) fn trace_id_at(req: &WebRequest, index: usize) -> Result<TraceId, WebError> {
    req.segments()
        .get(index)
        .and_then(|segment| segment.parse().ok())
        .ok_or(WebError::NotFound)
}

/// Bind a handler function to the shared context.
fn endpoint<F, Fut>(ctx: &Arc<WebContext>, f: F) -> impl Handler<HandlerResult>
where
    F: Fn(Arc<WebContext>, WebRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let ctx = ctx.clone();
    handler_fn(move |req: WebRequest| f(ctx.clone(), req))
}

struct Routes<'a> {
    ctx: &'a Arc<WebContext>,
    table: RouteTable,
}

impl<'a> Routes<'a> {
    fn new(ctx: &'a Arc<WebContext>) -> Self {
        Self {
            ctx,
            table: RouteTable::new(),
        }
    }

    fn page<F, Fut>(mut self, template: &str, f: F) -> Self
    where
        F: Fn(Arc<WebContext>, WebRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let layout = LayoutFilter::new(self.ctx.templates.clone(), self.ctx.ui.root_url.clone());
        let handler = layout
            .and_then(PathGuard::new(template))
            .chain(endpoint(self.ctx, f));
        self.table = self.table.route(template, handler);
        self
    }

    fn api<F, Fut>(mut self, template: &str, f: F) -> Self
    where
        F: Fn(Arc<WebContext>, WebRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler = PathGuard::new(template).chain(endpoint(self.ctx, f));
        self.table = self.table.route(template, handler);
        self
    }

    /// An API endpoint that answers 401 without a service name.
    fn service_api<F, Fut>(mut self, template: &str, f: F) -> Self
    where
        F: Fn(Arc<WebContext>, WebRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler = PathGuard::new(template)
            .and_then(RequireParam::new(SERVICE_NAME))
            .chain(endpoint(self.ctx, f));
        self.table = self.table.route(template, handler);
        self
    }

    fn build(self) -> RouteTable {
        tracing::debug!(routes = self.table.len(), "Routes registered");
        self.table
    }
}
