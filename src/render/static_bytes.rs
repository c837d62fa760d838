//! Pre-read static content.

use axum::body::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Immutable bytes plus their content type.
///
/// The backing stream is consumed exactly once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRenderer {
    payload: Bytes,
    content_type: String,
}

impl StaticRenderer {
    pub fn new(payload: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            content_type: content_type.into(),
        }
    }

    /// Drain `reader` into memory.
    pub async fn from_reader<R>(mut reader: R, content_type: impl Into<String>) -> std::io::Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut payload = Vec::new();
        reader.read_to_end(&mut payload).await?;
        Ok(Self::new(payload, content_type))
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_reader() {
        let renderer = StaticRenderer::from_reader(&b"body { margin: 0 }"[..], "text/css")
            .await
            .unwrap();
        assert_eq!(&renderer.payload()[..], b"body { margin: 0 }");
        assert_eq!(renderer.content_type(), "text/css");
    }
}
