//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup by literal prefix)
//!     → matcher.rs (segment split, template prefix check)
//!     → Return: the route's composed handler, or NotFound
//!
//! Route registration (at startup):
//!     (template, composed handler)[]
//!     → Parse templates
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path (segment prefix matching only)
//! - Deterministic: same path always resolves to the same route

pub mod matcher;
pub mod router;

pub use matcher::{path_segments, PathTemplate};
pub use router::RouteTable;
