//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, TTLs representable)
//! - Reject unusable addresses, asset prefixes and content types
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WebConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::WebConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &WebConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    match Url::parse(&config.query_service.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "query_service.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "query_service.base_url",
            format!("invalid URL: {}", e),
        )),
    }

    if config.query_service.timeout_secs == 0 {
        errors.push(ValidationError::new("query_service.timeout_secs", "must be greater than 0"));
    }

    if config.ui.default_limit == 0 {
        errors.push(ValidationError::new("ui.default_limit", "must be greater than 0"));
    }

    let pin_ttl = config.ui.pin_ttl_secs();
    if pin_ttl == 0 {
        errors.push(ValidationError::new("ui.pin_ttl_days", "must be greater than 0"));
    } else if u32::try_from(pin_ttl).is_err() {
        errors.push(ValidationError::new(
            "ui.pin_ttl_days",
            format!("{} days does not fit in a TTL", config.ui.pin_ttl_days),
        ));
    }

    for dir in &config.assets.resource_dirs {
        if !dir.starts_with('/') || dir.contains("..") {
            errors.push(ValidationError::new(
                "assets.resource_dirs",
                format!("'{}' must be an absolute request path without '..'", dir),
            ));
        }
    }

    for (extension, content_type) in &config.assets.content_types {
        if content_type.is_empty() || HeaderValue::from_str(content_type).is_err() {
            errors.push(ValidationError::new(
                "assets.content_types",
                format!("'{}' for .{} is not a valid header value", content_type, extension),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
