//! Request pipeline.
//!
//! # Data Flow
//! ```text
//! WebRequest
//!     → StatsFilter       (WebResponse → WebResponse)
//!     → RenderFilter      (Renderer → WebResponse)
//!     → ExceptionFilter   (HandlerResult → Renderer)
//!     → RouteTable        (dispatch by path)
//!         → [LayoutFilter] → PathGuard → [RequireParam] → terminal handler
//! ```
//!
//! # Design Decisions
//! - A filter receives the request and the rest of the chain; it may call it
//!   any number of times, change its output type, or not call it at all
//! - Composition is plain nesting, so it is associative: `a.and_then(b).and_then(c)`
//!   behaves exactly like `a.and_then(b.and_then(c))`
//! - Futures are boxed at each stage boundary to keep the traits object-safe

pub mod stages;

use std::future::Future;
use std::marker::PhantomData;

use futures_util::future::BoxFuture;

use crate::http::error::WebError;
use crate::http::request::WebRequest;
use crate::render::Renderer;

pub use stages::{ExceptionFilter, LayoutFilter, PathGuard, RenderFilter, RequireParam, StatsFilter};

/// What terminal handlers and inner stages produce.
pub type HandlerResult = Result<Renderer, WebError>;

/// The remainder of a pipeline.
pub trait Handler<Out>: Send + Sync {
    fn handle(&self, req: WebRequest) -> BoxFuture<'_, Out>;
}

/// A stage wrapping the rest of the pipeline.
pub trait Filter<In, Out>: Send + Sync {
    fn apply<'a>(&'a self, req: WebRequest, next: &'a dyn Handler<In>) -> BoxFuture<'a, Out>;
}

impl<Out, T> Handler<Out> for std::sync::Arc<T>
where
    T: Handler<Out> + ?Sized,
{
    fn handle(&self, req: WebRequest) -> BoxFuture<'_, Out> {
        (**self).handle(req)
    }
}

/// A filter bound to the handler it wraps.
pub struct Chain<F, H, In> {
    filter: F,
    handler: H,
    _in: PhantomData<fn() -> In>,
}

impl<F, H, In, Out> Handler<Out> for Chain<F, H, In>
where
    F: Filter<In, Out>,
    H: Handler<In>,
{
    fn handle(&self, req: WebRequest) -> BoxFuture<'_, Out> {
        self.filter.apply(req, &self.handler)
    }
}

/// Two filters fused into one, `outer` running first.
pub struct Composed<F, G, Mid> {
    outer: F,
    inner: G,
    _mid: PhantomData<fn() -> Mid>,
}

impl<F, G, In, Mid, Out> Filter<In, Out> for Composed<F, G, Mid>
where
    F: Filter<Mid, Out>,
    G: Filter<In, Mid>,
    In: 'static,
    Mid: 'static,
    Out: 'static,
{
    fn apply<'a>(&'a self, req: WebRequest, next: &'a dyn Handler<In>) -> BoxFuture<'a, Out> {
        Box::pin(async move {
            let inner = Bound {
                filter: &self.inner,
                next,
            };
            self.outer.apply(req, &inner).await
        })
    }
}

/// An inner filter together with the handler it forwards to.
struct Bound<'a, G, In> {
    filter: &'a G,
    next: &'a dyn Handler<In>,
}

impl<G, In, Mid> Handler<Mid> for Bound<'_, G, In>
where
    G: Filter<In, Mid>,
{
    fn handle(&self, req: WebRequest) -> BoxFuture<'_, Mid> {
        self.filter.apply(req, self.next)
    }
}

/// Composition helpers available on every filter.
pub trait FilterExt<In, Out>: Filter<In, Out> + Sized {
    /// Run `inner` between this filter and the rest of the pipeline.
    fn and_then<G, Inner>(self, inner: G) -> Composed<Self, G, In>
    where
        G: Filter<Inner, In>,
    {
        Composed {
            outer: self,
            inner,
            _mid: PhantomData,
        }
    }

    /// Terminate the pipeline with `handler`.
    fn chain<H>(self, handler: H) -> Chain<Self, H, In>
    where
        H: Handler<In>,
    {
        Chain {
            filter: self,
            handler,
            _in: PhantomData,
        }
    }
}

impl<F, In, Out> FilterExt<In, Out> for F where F: Filter<In, Out> {}

/// Handler backed by an async closure.
pub struct HandlerFn<F>(F);

pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn(f)
}

impl<F, Fut, Out> Handler<Out> for HandlerFn<F>
where
    F: Fn(WebRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Out> + Send + 'static,
{
    fn handle(&self, req: WebRequest) -> BoxFuture<'_, Out> {
        Box::pin((self.0)(req))
    }
}
