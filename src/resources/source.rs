//! Where asset bytes come from.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncRead;

pub type AssetStream = Box<dyn AsyncRead + Send + Unpin>;

/// Opens asset streams by logical path.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Open `path` (always `/`-rooted). `Ok(None)` when nothing exists there.
    async fn open(&self, path: &str) -> io::Result<Option<AssetStream>>;
}

/// Serves assets from a filesystem root.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetSource for DirectorySource {
    async fn open(&self, path: &str) -> io::Result<Option<AssetStream>> {
        let full = self.root.join(path.trim_start_matches('/'));
        match tokio::fs::File::open(&full).await {
            Ok(file) => {
                if file.metadata().await?.is_dir() {
                    return Ok(None);
                }
                Ok(Some(Box::new(file)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("public/css")).unwrap();
        std::fs::write(dir.path().join("public/css/app.css"), "body {}").unwrap();

        let source = DirectorySource::new(dir.path());

        let mut stream = source.open("/public/css/app.css").await.unwrap().unwrap();
        let mut body = String::new();
        stream.read_to_string(&mut body).await.unwrap();
        assert_eq!(body, "body {}");

        assert!(source.open("/public/css/missing.css").await.unwrap().is_none());
        assert!(source.open("/public/css").await.unwrap().is_none());
    }
}
