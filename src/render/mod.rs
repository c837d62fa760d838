//! Output formats.
//!
//! # Data Flow
//! ```text
//! terminal handler
//!     → Renderer (error | template | json | static bytes)
//!     → [layout stage may re-wrap a template renderer]
//!     → render finalization: Renderer::render → Rendered → WebResponse
//! ```
//!
//! # Design Decisions
//! - Template bodies are generated lazily so an outer stage can embed them
//! - Static payloads are read once and shared through `Arc`

pub mod static_bytes;
pub mod templates;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::http::error::WebError;
use crate::http::response::WebResponse;

pub use static_bytes::StaticRenderer;
pub use templates::{TemplateError, Templates};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// Presentation-ready values handed to a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataBag(BTreeMap<String, Value>);

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<()> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a computed result becomes a response.
#[derive(Debug, Clone)]
pub enum Renderer {
    /// Plain-text status response.
    Error { status: StatusCode, message: String },
    /// Named template over a data bag, rendered on demand.
    Template { name: String, data: DataBag },
    Json(Value),
    Static(Arc<StaticRenderer>),
}

/// Output of a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
}

impl Renderer {
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Error {
            status,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, WebError::NotFound.to_string())
    }

    pub fn template(name: impl Into<String>, data: DataBag) -> Self {
        Self::Template {
            name: name.into(),
            data,
        }
    }

    /// Serialize any value into a JSON renderer.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// 500 response carrying a message and a diagnostic trace.
    pub fn internal_error(message: &str, trace: &str) -> Self {
        Self::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}\n\n{}", message, trace),
        )
    }

    /// Error renderer for a failure. Client errors carry only their message.
    pub fn from_error(err: &WebError) -> Self {
        if err.is_client_error() {
            Self::error(err.status(), err.to_string())
        } else {
            Self::internal_error(&err.to_string(), &err.diagnostic_trace())
        }
    }

    /// Status the renderer will answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Error { status, .. } => *status,
            _ => StatusCode::OK,
        }
    }

    /// Produce status, content type and body.
    pub fn render(&self, templates: &Templates) -> Result<Rendered, WebError> {
        let (content_type, body) = match self {
            Self::Error { message, .. } => (TEXT_PLAIN.to_string(), Bytes::from(message.clone())),
            Self::Template { name, data } => {
                (TEXT_HTML.to_string(), Bytes::from(templates.render(name, data)?))
            }
            Self::Json(value) => (APPLICATION_JSON.to_string(), Bytes::from(serde_json::to_vec(value)?)),
            Self::Static(renderer) => {
                (renderer.content_type().to_string(), renderer.payload().clone())
            }
        };

        Ok(Rendered {
            status: self.status(),
            content_type,
            body,
        })
    }
}

impl From<Rendered> for WebResponse {
    fn from(rendered: Rendered) -> Self {
        WebResponse::new(rendered.status, &rendered.content_type, rendered.body)
    }
}
