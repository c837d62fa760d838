//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router and wire up tower middleware
//!   (tracing, request ID, timeout)
//! - Adapt transport requests into the request pipeline
//! - Bind the server to a listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::WebConfig;
use crate::handlers::{self, WebContext};
use crate::http::request::WebRequest;
use crate::lifecycle::ShutdownSignal;
use crate::http::response::WebResponse;
use crate::pipeline::{ExceptionFilter, FilterExt, Handler, RenderFilter, StatsFilter};
use crate::query::QueryService;
use crate::render::Templates;

pub const X_REQUEST_ID: &str = "x-request-id";

type Pipeline = Arc<dyn Handler<WebResponse>>;

/// HTTP server for the trace web front end.
pub struct HttpServer {
    router: Router,
    config: WebConfig,
}

impl HttpServer {
    pub fn new(config: WebConfig, service: Arc<dyn QueryService>, templates: Templates) -> Self {
        let ctx = Arc::new(WebContext::new(&config, service, templates));
        let router = Self::build_router(&config, build_pipeline(&ctx));
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &WebConfig, pipeline: Pipeline) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .fallback(dispatch)
            .with_state(pipeline)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(request_id))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Stats → render → exception isolation → route dispatch.
pub fn build_pipeline(ctx: &Arc<WebContext>) -> Pipeline {
    Arc::new(
        StatsFilter
            .and_then(RenderFilter::new(ctx.templates.clone()))
            .and_then(ExceptionFilter)
            .chain(handlers::routes(ctx)),
    )
}

/// Protocol adaptation: every request goes through the pipeline.
async fn dispatch(State(pipeline): State<Pipeline>, request: Request<Body>) -> Response {
    let (parts, _body) = request.into_parts();
    let req = WebRequest::from_parts(&parts);
    pipeline.handle(req).await.into_response()
}
