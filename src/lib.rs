//! Trace web front end library.
//!
//! Serves trace search pages and a JSON API over a remote trace query
//! service, plus the static assets the pages load.

// Core subsystems
pub mod config;
pub mod http;
pub mod pipeline;
pub mod routing;

// Domain
pub mod handlers;
pub mod query;
pub mod render;
pub mod resources;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::WebConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, ShutdownSignal};
