//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the route for a request path
//! - Dispatch to the route's composed handler, or answer NotFound
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest literal prefix wins
//! - Among routes sharing a prefix, the one whose segment count equals the
//!   request's wins, then the largest one not exceeding it, then the smallest
//! - Explicit NotFound rather than silent default

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::error::WebError;
use crate::http::request::WebRequest;
use crate::pipeline::{Handler, HandlerResult};
use crate::routing::matcher::PathTemplate;

type RouteHandler = Arc<dyn Handler<HandlerResult>>;

/// A compiled route.
pub struct Route {
    pub template: PathTemplate,
    handler: RouteHandler,
}

/// Immutable route table; also the dispatching handler.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a template.
    pub fn route<H>(mut self, template: &str, handler: H) -> Self
    where
        H: Handler<HandlerResult> + 'static,
    {
        self.routes.push(Route {
            template: PathTemplate::new(template),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the route for a path.
    pub fn lookup(&self, path: &str) -> Option<&Route> {
        let segments = crate::routing::matcher::path_segments(path);
        let candidates: Vec<&Route> = self
            .routes
            .iter()
            .filter(|r| r.template.matches(&segments))
            .collect();

        let longest = candidates.iter().map(|r| r.template.literal_len()).max()?;
        let candidates: Vec<&Route> = candidates
            .into_iter()
            .filter(|r| r.template.literal_len() == longest)
            .collect();

        let actual = segments.len();
        candidates
            .iter()
            .filter(|r| r.template.segment_count() <= actual)
            .max_by_key(|r| r.template.segment_count())
            .or_else(|| {
                candidates
                    .iter()
                    .min_by_key(|r| r.template.segment_count())
            })
            .copied()
    }
}

impl Handler<HandlerResult> for RouteTable {
    fn handle(&self, req: WebRequest) -> BoxFuture<'_, HandlerResult> {
        match self.lookup(req.path()) {
            Some(route) => {
                tracing::trace!(
                    path = %req.path(),
                    route = %route.template.as_str(),
                    "Route matched"
                );
                route.handler.handle(req)
            }
            None => {
                tracing::debug!(path = %req.path(), "No route matched");
                Box::pin(async { Err(WebError::NotFound) })
            }
        }
    }
}
