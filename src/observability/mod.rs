//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the tower layers into every request span
//! - Metrics are cheap (atomic increments behind the global recorder)
//! - Without an installed recorder every metric call is a no-op

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
