//! Memoizing static asset cache.
//!
//! # Responsibilities
//! - Reject traversal attempts and paths outside the permitted directories
//! - Resolve each asset at most once when caching is enabled
//! - Re-resolve on every lookup when caching is disabled (edit-reload)
//!
//! # Design Decisions
//! - Reads are lock-free: the map is an immutable snapshot behind `ArcSwap`
//! - Misses serialize on one async mutex and re-check before resolving,
//!   so concurrent first requests for a path cost a single read
//! - Entries are never evicted; the asset set is fixed for the process

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;

use crate::config::AssetConfig;
use crate::observability::metrics;
use crate::render::StaticRenderer;
use crate::resources::source::{AssetSource, DirectorySource};

/// Content type for unmapped extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

pub struct ResourceCache {
    source: Arc<dyn AssetSource>,
    resource_dirs: Vec<String>,
    content_types: HashMap<String, String>,
    cache_enabled: bool,
    entries: ArcSwap<HashMap<String, Arc<StaticRenderer>>>,
    fill_lock: Mutex<()>,
}

impl ResourceCache {
    pub fn new(
        source: Arc<dyn AssetSource>,
        resource_dirs: Vec<String>,
        content_types: HashMap<String, String>,
        cache_enabled: bool,
    ) -> Self {
        // "/public/css/" and "/public/css" name the same directory
        let resource_dirs = resource_dirs
            .into_iter()
            .map(|dir| dir.trim_end_matches('/').to_string())
            .collect();
        Self {
            source,
            resource_dirs,
            content_types,
            cache_enabled,
            entries: ArcSwap::from_pointee(HashMap::new()),
            fill_lock: Mutex::new(()),
        }
    }

    /// Build from config: packaged root when caching, live root otherwise.
    pub fn from_config(config: &AssetConfig) -> Self {
        let root = if config.cache_enabled {
            &config.packaged_root
        } else {
            &config.dev_root
        };
        tracing::info!(
            root = %root,
            cache_enabled = config.cache_enabled,
            "Serving static assets"
        );

        Self::new(
            Arc::new(DirectorySource::new(root)),
            config.resource_dirs.clone(),
            config.content_types.clone(),
            config.cache_enabled,
        )
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the renderer for `path`. `Ok(None)` means not found.
    pub async fn get(&self, path: &str) -> io::Result<Option<Arc<StaticRenderer>>> {
        if path.contains("..") {
            tracing::warn!(path = %path, "Rejected traversal attempt");
            metrics::record_resource_load("rejected");
            return Ok(None);
        }
        if !self.is_permitted(path) {
            metrics::record_resource_load("rejected");
            return Ok(None);
        }

        if !self.cache_enabled {
            return self.resolve(path).await;
        }

        if let Some(hit) = self.entries.load().get(path) {
            metrics::record_resource_load("hit");
            return Ok(Some(hit.clone()));
        }

        let _guard = self.fill_lock.lock().await;
        if let Some(hit) = self.entries.load().get(path) {
            metrics::record_resource_load("hit");
            return Ok(Some(hit.clone()));
        }

        let Some(renderer) = self.resolve(path).await? else {
            return Ok(None);
        };

        let mut next = HashMap::clone(&self.entries.load());
        next.insert(path.to_string(), renderer.clone());
        self.entries.store(Arc::new(next));

        tracing::debug!(path = %path, bytes = renderer.payload().len(), "Asset cached");
        Ok(Some(renderer))
    }

    fn is_permitted(&self, path: &str) -> bool {
        self.resource_dirs.iter().any(|dir| {
            path.strip_prefix(dir.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    async fn resolve(&self, path: &str) -> io::Result<Option<Arc<StaticRenderer>>> {
        let Some(stream) = self.source.open(path).await? else {
            metrics::record_resource_load("missing");
            return Ok(None);
        };
        let renderer = StaticRenderer::from_reader(stream, self.content_type(path)).await?;
        metrics::record_resource_load("loaded");
        Ok(Some(Arc::new(renderer)))
    }

    /// Content type by file extension.
    pub fn content_type(&self, path: &str) -> &str {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.content_types.get(ext))
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::source::AssetStream;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory source counting every open.
    #[derive(Default)]
    struct CountingSource {
        files: HashMap<String, &'static [u8]>,
        opens: AtomicUsize,
        delay: Option<Duration>,
    }

    impl CountingSource {
        fn with_file(mut self, path: &str, body: &'static [u8]) -> Self {
            self.files.insert(path.to_string(), body);
            self
        }

        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssetSource for CountingSource {
        async fn open(&self, path: &str) -> io::Result<Option<AssetStream>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self
                .files
                .get(path)
                .map(|body| Box::new(*body) as AssetStream))
        }
    }

    fn cache(source: Arc<CountingSource>, cache_enabled: bool) -> ResourceCache {
        ResourceCache::new(
            source,
            vec!["/public/css".to_string(), "/public/js".to_string()],
            AssetConfig::default().content_types,
            cache_enabled,
        )
    }

    fn source() -> CountingSource {
        CountingSource::default()
            .with_file("/public/css/app.css", b"body {}")
            .with_file("/public/js/app.js", b"init();")
            .with_file("/public/css/NOTES", b"notes")
            .with_file("/secret.txt", b"secret")
    }

    #[tokio::test]
    async fn test_traversal_rejected_without_io() {
        let source = Arc::new(source());
        let cache = cache(source.clone(), true);

        assert!(cache.get("/public/css/../../secret.txt").await.unwrap().is_none());
        assert!(cache.get("/public/..").await.unwrap().is_none());
        assert_eq!(source.opens(), 0);
    }

    #[tokio::test]
    async fn test_prefix_required() {
        let source = Arc::new(source());
        let cache = cache(source.clone(), true);

        assert!(cache.get("/secret.txt").await.unwrap().is_none());
        assert!(cache.get("/public/cssx/app.css").await.unwrap().is_none());
        assert_eq!(source.opens(), 0);
    }

    #[tokio::test]
    async fn test_prefix_with_trailing_slash() {
        let source = Arc::new(source());
        let cache = ResourceCache::new(
            source.clone(),
            vec!["/public/css/".to_string()],
            AssetConfig::default().content_types,
            true,
        );

        let found = cache.get("/public/css/app.css").await.unwrap().unwrap();
        assert_eq!(&found.payload()[..], b"body {}");
        assert!(cache.get("/public/cssx/app.css").await.unwrap().is_none());
        assert!(cache.get("/public/js/app.js").await.unwrap().is_none());
        assert_eq!(source.opens(), 1);
    }

    #[tokio::test]
    async fn test_cached_asset_read_once() {
        let source = Arc::new(source());
        let cache = cache(source.clone(), true);

        let first = cache.get("/public/css/app.css").await.unwrap().unwrap();
        let second = cache.get("/public/css/app.css").await.unwrap().unwrap();

        assert_eq!(source.opens(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.content_type(), "text/css");
        assert_eq!(&first.payload()[..], b"body {}");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_asset_not_cached() {
        let source = Arc::new(source());
        let cache = cache(source.clone(), true);

        assert!(cache.get("/public/css/missing.css").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_access_single_read() {
        let source = Arc::new(CountingSource {
            delay: Some(Duration::from_millis(20)),
            ..source()
        });
        let cache = Arc::new(cache(source.clone(), true));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get("/public/js/app.js").await })
            })
            .collect();

        let mut renderers = Vec::new();
        for task in tasks {
            renderers.push(task.await.unwrap().unwrap().unwrap());
        }

        assert_eq!(source.opens(), 1);
        assert!(renderers.iter().all(|r| Arc::ptr_eq(r, &renderers[0])));
        assert!(renderers.iter().all(|r| &r.payload()[..] == b"init();"));
    }

    #[tokio::test]
    async fn test_dev_mode_rereads() {
        let source = Arc::new(source());
        let cache = cache(source.clone(), false);

        cache.get("/public/css/app.css").await.unwrap().unwrap();
        cache.get("/public/css/app.css").await.unwrap().unwrap();

        assert_eq!(source.opens(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_default_content_type() {
        let source = Arc::new(source());
        let cache = cache(source, true);

        let renderer = cache.get("/public/css/NOTES").await.unwrap().unwrap();
        assert_eq!(renderer.content_type(), DEFAULT_CONTENT_TYPE);
        assert_eq!(cache.content_type("/public/img/logo.png"), "image/png");
    }
}
