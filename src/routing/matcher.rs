//! Route template matching.
//!
//! # Responsibilities
//! - Split request paths into segments
//! - Parse route templates such as `/api/trace/:id`
//! - Match a path against a template's literal prefix
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Templates without variables match exactly; templates with variables
//!   match any path under their literal prefix (muxer semantics)
//! - Segment counts are checked separately by the path-shape guard
//! - No regex to guarantee O(n) matching

/// Split a path on `/`, dropping trailing empty segments.
///
/// `/api/pin/1/true` yields `["", "api", "pin", "1", "true"]` and `/` yields nothing.
pub fn path_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    /// Segments before the first variable.
    literal: Vec<String>,
    /// Total segment count, variables included.
    segment_count: usize,
}

impl PathTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = path_segments(&raw);
        let literal = segments
            .iter()
            .take_while(|s| !s.starts_with(':'))
            .map(|s| s.to_string())
            .collect();
        let segment_count = segments.len();
        Self {
            raw,
            literal,
            segment_count,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the template has `:name` segments.
    pub fn has_variables(&self) -> bool {
        self.literal.len() < self.segment_count
    }

    /// Segments a request path needs to satisfy this template.
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Number of literal segments, used to rank overlapping templates.
    pub fn literal_len(&self) -> usize {
        self.literal.len()
    }

    /// Check the literal prefix of `segments`.
    pub fn matches(&self, segments: &[&str]) -> bool {
        let prefix_ok = segments.len() >= self.literal.len()
            && self
                .literal
                .iter()
                .zip(segments)
                .all(|(expected, actual)| expected == actual);

        prefix_ok && (self.has_variables() || segments.len() == self.literal.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("/"), Vec::<&str>::new());
        assert_eq!(path_segments("/api/trace/"), vec!["", "api", "trace"]);
        assert_eq!(path_segments("/api//x"), vec!["", "api", "", "x"]);
    }

    #[test]
    fn test_exact_template() {
        let template = PathTemplate::new("/api/services");
        assert!(!template.has_variables());
        assert!(template.matches(&path_segments("/api/services")));
        assert!(template.matches(&path_segments("/api/services/")));
        assert!(!template.matches(&path_segments("/api/services/x")));
        assert!(!template.matches(&path_segments("/api/spans")));
    }

    #[test]
    fn test_variable_template() {
        let template = PathTemplate::new("/api/trace/:id");
        assert!(template.has_variables());
        assert_eq!(template.segment_count(), 4);
        assert_eq!(template.literal_len(), 3);
        assert!(template.matches(&path_segments("/api/trace/00000000000003e8")));
        // Shorter paths still match the prefix; the shape guard rejects them.
        assert!(template.matches(&path_segments("/api/trace")));
        assert!(!template.matches(&path_segments("/api/traces/1")));
    }

    #[test]
    fn test_root_template() {
        let template = PathTemplate::new("/");
        assert!(template.matches(&path_segments("/")));
        assert!(!template.matches(&path_segments("/missing")));
    }
}
