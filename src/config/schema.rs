//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the web front end.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the trace web front end.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WebConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Remote trace query service settings.
    pub query_service: QueryServiceConfig,

    /// Browser-facing UI settings.
    pub ui: UiConfig,

    /// Static asset serving.
    pub assets: AssetConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Remote query service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryServiceConfig {
    /// Base URL of the query service (e.g., "http://127.0.0.1:9411/").
    pub base_url: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// How many times an empty annotation query is retried over an earlier window.
    pub max_trace_id_retries: u32,
}

impl Default for QueryServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9411/".to_string(),
            timeout_secs: 10,
            max_trace_id_retries: 10,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// Public root URL, injected into the layout template as `rootUrl`.
    pub root_url: Option<String>,

    /// Result limit used when a query does not name one.
    pub default_limit: u32,

    /// TTL applied to pinned traces, in days.
    pub pin_ttl_days: u64,

    /// Directory holding `<name>.mustache` templates.
    pub templates_dir: String,
}

impl UiConfig {
    /// Pin TTL in seconds.
    pub fn pin_ttl_secs(&self) -> u64 {
        self.pin_ttl_days.saturating_mul(24 * 60 * 60)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            root_url: None,
            default_limit: 100,
            pin_ttl_days: 30,
            templates_dir: "templates".to_string(),
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Memoize resolved assets for the life of the process.
    /// Disable for edit-reload development.
    pub cache_enabled: bool,

    /// Root of the packaged assets, used when caching is enabled.
    pub packaged_root: String,

    /// Live filesystem root, used when caching is disabled.
    pub dev_root: String,

    /// Request path prefixes that may be served.
    pub resource_dirs: Vec<String>,

    /// File extension (without dot) to content type.
    pub content_types: HashMap<String, String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        let content_types = [
            ("css", "text/css"),
            ("html", "text/html"),
            ("js", "application/javascript"),
            ("json", "application/json"),
            ("mustache", "text/html"),
            ("png", "image/png"),
            ("gif", "image/gif"),
            ("jpg", "image/jpeg"),
            ("svg", "image/svg+xml"),
            ("ico", "image/x-icon"),
            ("woff", "font/woff"),
        ]
        .into_iter()
        .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
        .collect();

        Self {
            cache_enabled: true,
            packaged_root: ".".to_string(),
            dev_root: ".".to_string(),
            resource_dirs: ["/public/css", "/public/img", "/public/js", "/public/templates"]
                .into_iter()
                .map(String::from)
                .collect(),
            content_types,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
