//! Trace query subsystem.
//!
//! # Data Flow
//! ```text
//! WebRequest parameters
//!     → params.rs (QueryExtractor → QueryRequest, adjusters)
//!     → resolver.rs (trace id lookup with windowed retry, summaries, pins)
//!     → service.rs (QueryService contract; client.rs speaks it over HTTP)
//!     → summary.rs (QueryResults / TraceDetail presentation shapes)
//! ```
//!
//! # Design Decisions
//! - The remote service owns all durable state; nothing here is shared
//!   between requests
//! - Retry state is request-local and bounded by count only

pub mod client;
pub mod params;
pub mod resolver;
pub mod service;
pub mod summary;
pub mod types;

pub use client::HttpQueryClient;
pub use params::QueryExtractor;
pub use resolver::QueryResolver;
pub use service::{QueryError, QueryResult, QueryService};
pub use summary::{QueryResults, SummaryRow, TraceDetail};
pub use types::{Adjuster, QueryRequest, TraceId, TraceSummary};
