//! Failures raised while producing a response.

use std::error::Error as _;
use std::fmt::Write as _;

use axum::http::StatusCode;
use thiserror::Error;

use crate::query::QueryError;
use crate::render::templates::TemplateError;

/// Errors surfaced by terminal handlers and pipeline stages.
#[derive(Debug, Error)]
pub enum WebError {
    /// Unmatched route, malformed ID or unresolvable asset.
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("resource read failed: {0}")]
    Resource(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Internal(String),
}

impl WebError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status this error answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for caller mistakes that are answered with their own status.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Debug form of the error followed by its `source()` chain.
    pub fn diagnostic_trace(&self) -> String {
        let mut trace = format!("{:?}", self);
        let mut source = self.source();
        while let Some(cause) = source {
            let _ = write!(trace, "\ncaused by: {}", cause);
            source = cause.source();
        }
        trace
    }
}
