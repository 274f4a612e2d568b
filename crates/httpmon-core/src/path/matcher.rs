//! Two-stage ordered path resolution.
//!
//! Stage 1 is a fixed table of sidecar framework paths, matched exactly.
//! Stage 2 is the configured template table, first match wins. After that,
//! legacy mode passes the raw path through; otherwise the path is unmatched
//! and callers drop the path dimension.

use serde::Deserialize;

use crate::error::Result;

use super::template::{trim_trailing_slash, PathTemplate};

/// Built-in framework paths, always reported verbatim.
pub const STATIC_PATHS: [&str; 5] = [
    "/v1.0/healthz",
    "/v1.0/healthz/outbound",
    "/v1.0/metadata",
    "/v1.0/shutdown",
    "/metrics",
];

/// Trailing slash handling before template matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingSlash {
    /// `/orders/` is matched as `/orders`.
    #[default]
    Ignore,
    /// `/orders/` only matches templates written with the same shape.
    Strict,
}

/// Outcome of [`PathMatcher::resolve`], in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Static(&'a str),
    Template(&'a str),
    LegacyPassthrough(&'a str),
    Unmatched,
}

impl<'a> Resolution<'a> {
    /// Label to record; empty for [`Resolution::Unmatched`].
    pub fn label(&self) -> &'a str {
        match *self {
            Resolution::Static(l) | Resolution::Template(l) | Resolution::LegacyPassthrough(l) => l,
            Resolution::Unmatched => "",
        }
    }

    pub fn matched(&self) -> bool {
        !matches!(self, Resolution::Unmatched)
    }
}

/// Ordered template table. Built once, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    templates: Vec<PathTemplate>,
    legacy: bool,
    trailing_slash: TrailingSlash,
}

impl PathMatcher {
    /// Compile `patterns` in order. Duplicates (after trailing-slash trimming)
    /// are dropped with a warning; the first occurrence keeps its position.
    pub fn new(patterns: &[String], legacy: bool, trailing_slash: TrailingSlash) -> Result<Self> {
        let mut templates: Vec<PathTemplate> = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let tpl = PathTemplate::parse(raw)?;
            if templates.iter().any(|t| t.label() == tpl.label()) {
                tracing::warn!(template = %raw, "duplicate path template ignored");
                continue;
            }
            templates.push(tpl);
        }

        Ok(Self {
            templates,
            legacy,
            trailing_slash,
        })
    }

    /// Whether any templates are configured (independent of legacy mode).
    pub fn enabled(&self) -> bool {
        !self.templates.is_empty()
    }

    pub fn legacy(&self) -> bool {
        self.legacy
    }

    /// Template labels in table order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(PathTemplate::label)
    }

    pub fn resolve<'a>(&'a self, raw: &'a str) -> Resolution<'a> {
        let path = strip_query(raw);
        let path = if path.is_empty() { "/" } else { path };

        if let Some(s) = STATIC_PATHS.iter().find(|s| **s == path) {
            return Resolution::Static(*s);
        }

        let candidate = match self.trailing_slash {
            TrailingSlash::Ignore => trim_trailing_slash(path),
            TrailingSlash::Strict => path,
        };
        if let Some(tpl) = self.templates.iter().find(|t| t.matches(candidate)) {
            return Resolution::Template(tpl.label());
        }

        if self.legacy {
            Resolution::LegacyPassthrough(path)
        } else {
            Resolution::Unmatched
        }
    }
}

/// Drop any `?query` or `#fragment` suffix.
pub fn strip_query(raw: &str) -> &str {
    match raw.find(['?', '#']) {
        Some(i) => &raw[..i],
        None => raw,
    }
}
