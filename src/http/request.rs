//! Internal request model.
//!
//! # Responsibilities
//! - Decouple pipeline stages from the transport representation
//! - Decode query-string parameters once per request
//! - Expose path segments for route-shape checks
//!
//! # Design Decisions
//! - Bodies are not carried: every route reads only the path and query string
//! - Parameter lookup returns the first value for a repeated name

use axum::http::{request::Parts, HeaderMap, Method};

use crate::routing::matcher::path_segments;

/// A request as seen by pipeline stages.
#[derive(Debug, Clone)]
pub struct WebRequest {
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    headers: HeaderMap,
}

impl WebRequest {
    /// Build a request from a method and a `path?query` string.
    pub fn new(method: Method, path_and_query: &str, headers: HeaderMap) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };

        let params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self {
            method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            params,
            headers,
        }
    }

    /// A bare GET request.
    pub fn get(path_and_query: &str) -> Self {
        Self::new(Method::GET, path_and_query, HeaderMap::new())
    }

    /// Translate the transport-level request head.
    pub fn from_parts(parts: &Parts) -> Self {
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Self::new(parts.method.clone(), path_and_query, parts.headers.clone())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Path split on `/` with trailing empty segments dropped.
    pub fn segments(&self) -> Vec<&str> {
        path_segments(&self.path)
    }
}
