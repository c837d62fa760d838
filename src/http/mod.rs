//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, tower layers: trace, request ID, timeout)
//!     → request.rs (transport request → WebRequest)
//!     → [pipeline: stats, render, exception isolation, routing]
//!     → response.rs (WebResponse → transport response)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::WebError;
pub use request::WebRequest;
pub use response::WebResponse;
pub use server::HttpServer;
