//! Named page templates.
//!
//! Placeholders are `{{key}}` (HTML-escaped) and `{{{key}}}` (inserted raw).
//! String values are inserted verbatim, null and missing keys render empty,
//! any other value is inserted as JSON text so pages can hand it to scripts.
//! That JSON has `<`, `>` and `&` written as `\u003c`, `\u003e` and `\u0026`,
//! so embedded data cannot close a `<script>` element.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::render::DataBag;

const TEMPLATE_EXTENSION: &str = "mustache";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template '{0}' not found")]
    Missing(String),

    #[error("unterminated placeholder in template '{0}'")]
    Unterminated(String),

    #[error("failed to load templates from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A set of templates addressed by name.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    sources: HashMap<String, String>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(name.into(), source.into());
    }

    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Load every `<name>.mustache` file in `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, TemplateError> {
        let load_err = |source| TemplateError::Load {
            path: dir.display().to_string(),
            source,
        };

        let mut templates = Self::new();
        for entry in fs::read_dir(dir).map_err(load_err)? {
            let path = entry.map_err(load_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = fs::read_to_string(&path).map_err(load_err)?;
            templates.insert(name, source);
        }

        tracing::info!(
            dir = %dir.display(),
            count = templates.sources.len(),
            "Templates loaded"
        );
        Ok(templates)
    }

    /// Render a template against a data bag.
    pub fn render(&self, name: &str, data: &DataBag) -> Result<String, TemplateError> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| TemplateError::Missing(name.to_string()))?;

        let mut out = String::with_capacity(source.len());
        let mut rest = source.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let tag = &rest[start..];

            let (raw, open, close) = if tag.starts_with("{{{") {
                (true, 3, "}}}")
            } else {
                (false, 2, "}}")
            };
            let end = tag[open..]
                .find(close)
                .ok_or_else(|| TemplateError::Unterminated(name.to_string()))?;
            let key = tag[open..open + end].trim();

            match data.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) if raw => out.push_str(s),
                Some(Value::String(s)) => push_escaped(&mut out, s),
                Some(other) if raw => push_script_safe(&mut out, &other.to_string()),
                Some(other) => push_escaped(&mut out, &other.to_string()),
            }

            rest = &tag[open + end + close.len()..];
        }
        out.push_str(rest);

        Ok(out)
    }
}

/// JSON text with markup characters as unicode escapes. Valid JSON either way,
/// since they can only occur inside string literals.
fn push_script_safe(out: &mut String, json: &str) {
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            c => out.push(c),
        }
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
