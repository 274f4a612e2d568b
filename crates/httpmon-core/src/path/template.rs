//! Path template compilation and matching.
//!
//! Supported segment forms:
//! - `literal` — exact match
//! - `*` or `{name}` — exactly one non-empty segment
//! - `**` or `{name...}` — the remainder (zero or more segments), last position only

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    One,
    Rest,
}

/// A compiled path template. Its label is the template as configured, minus
/// any trailing slash.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    label: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.starts_with('/') {
            return Err(MonitorError::InvalidTemplate(format!(
                "{raw} (must start with '/')"
            )));
        }
        let label = trim_trailing_slash(raw).to_string();

        let body = &label[1..];
        let mut segments = Vec::new();
        if !body.is_empty() {
            let parts: Vec<&str> = body.split('/').collect();
            let last = parts.len() - 1;
            for (i, part) in parts.iter().enumerate() {
                let seg = parse_segment(raw, part)?;
                if seg == Segment::Rest && i != last {
                    return Err(MonitorError::InvalidTemplate(format!(
                        "{raw} (remainder wildcard must be the last segment)"
                    )));
                }
                segments.push(seg);
            }
        }

        Ok(Self { label, segments })
    }

    /// Canonical label reported when this template matches.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Match an already-normalized path (leading `/`, no query string).
    pub fn matches(&self, path: &str) -> bool {
        let body = path.strip_prefix('/').unwrap_or(path);
        let observed: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/').collect()
        };

        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Rest => return true,
                Segment::One => match observed.get(i) {
                    Some(s) if !s.is_empty() => {}
                    _ => return false,
                },
                Segment::Literal(lit) => match observed.get(i) {
                    Some(s) if *s == lit.as_str() => {}
                    _ => return false,
                },
            }
        }

        observed.len() == self.segments.len()
    }
}

fn parse_segment(raw: &str, part: &str) -> Result<Segment> {
    match part {
        "*" => return Ok(Segment::One),
        "**" => return Ok(Segment::Rest),
        _ => {}
    }

    if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        let (name, rest) = match inner.strip_suffix("...") {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if name.is_empty() || name.contains(['{', '}']) {
            return Err(MonitorError::InvalidTemplate(format!(
                "{raw} (bad wildcard segment {part})"
            )));
        }
        return Ok(if rest { Segment::Rest } else { Segment::One });
    }

    if part.contains(['{', '}']) {
        return Err(MonitorError::InvalidTemplate(format!(
            "{raw} (unbalanced braces in {part})"
        )));
    }
    Ok(Segment::Literal(part.to_string()))
}

/// Trim one trailing slash, keeping the root path intact.
pub(crate) fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn t(raw: &str) -> PathTemplate {
        PathTemplate::parse(raw).unwrap()
    }

    #[test]
    fn literal_template() {
        let tpl = t("/orders");
        assert!(tpl.matches("/orders"));
        assert!(!tpl.matches("/orders/1"));
        assert!(!tpl.matches("/order"));
        assert!(!tpl.matches("/"));
    }

    #[test]
    fn single_segment_wildcards() {
        for raw in ["/items/*", "/items/{id}"] {
            let tpl = t(raw);
            assert_eq!(tpl.label(), raw);
            assert!(tpl.matches("/items/42"));
            assert!(tpl.matches("/items/abc-def"));
            assert!(!tpl.matches("/items"));
            assert!(!tpl.matches("/items/"));
            assert!(!tpl.matches("/items/42/parts"));
        }
    }

    #[test]
    fn remainder_wildcards() {
        for raw in ["/files/**", "/files/{rest...}"] {
            let tpl = t(raw);
            assert!(tpl.matches("/files"));
            assert!(tpl.matches("/files/a"));
            assert!(tpl.matches("/files/a/b/c"));
            assert!(!tpl.matches("/file/a"));
        }
    }

    #[test]
    fn interior_wildcard() {
        let tpl = t("/users/{id}/orders");
        assert!(tpl.matches("/users/7/orders"));
        assert!(!tpl.matches("/users/7/carts"));
        assert!(!tpl.matches("/users//orders"));
    }

    #[test]
    fn root_template() {
        let tpl = t("/");
        assert_eq!(tpl.label(), "/");
        assert!(tpl.matches("/"));
        assert!(!tpl.matches("/x"));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_label() {
        assert_eq!(t("/orders/").label(), "/orders");
    }

    #[test]
    fn rejects_malformed_templates() {
        for raw in ["orders", "/a/{id", "/a/id}", "/a/{}", "/a/**/b", "/a/{x...}/b", "/a/b{c}"] {
            let err = PathTemplate::parse(raw).expect_err(raw);
            assert_eq!(err.code().as_str(), "BAD_CONFIG");
        }
    }
}
