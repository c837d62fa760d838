//! Trace web front end.
//!
//! ```text
//!     Browser / API client
//!         │
//!         ▼
//!     ┌─────────────────────────────────────────────┐
//!     │ axum + tower (trace, request ID, timeout)   │
//!     │   → stats → render → exception isolation   │
//!     │   → route table → layout / guards → handler │
//!     └──────────────┬───────────────┬──────────────┘
//!                    │               │
//!                    ▼               ▼
//!            query resolver    resource cache
//!                    │               │
//!                    ▼               ▼
//!          trace query service   asset files
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use trace_web::config::{load_config, WebConfig};
use trace_web::observability::{self, metrics};
use trace_web::query::HttpQueryClient;
use trace_web::render::Templates;
use trace_web::{HttpServer, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "trace-web", version, about = "Web front end for a trace query service")]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve assets from the live filesystem without caching.
    #[arg(long)]
    dev: bool,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => WebConfig::default(),
    };
    if args.dev {
        config.assets.cache_enabled = false;
    }
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    observability::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "trace-web starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        query_service = %config.query_service.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        cache_enabled = config.assets.cache_enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = Arc::new(HttpQueryClient::new(&config.query_service)?);
    let templates = Templates::load_dir(Path::new(&config.ui.templates_dir))?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Arc::new(Shutdown::new());
    let _signals = shutdown.trigger_on_signal();
    let server = HttpServer::new(config, service, templates);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
