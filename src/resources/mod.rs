//! Static asset serving.
//!
//! # Data Flow
//! ```text
//! /public/... request path
//!     → cache.rs (traversal check, prefix check, memoized lookup)
//!     → source.rs (open the backing stream on a miss)
//!     → StaticRenderer (bytes read once, shared via Arc)
//! ```

pub mod cache;
pub mod source;

pub use cache::ResourceCache;
pub use source::{AssetSource, AssetStream, DirectorySource};
