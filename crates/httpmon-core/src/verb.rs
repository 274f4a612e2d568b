//! HTTP method normalization.
//!
//! Only the closed set of standard verbs is passed through as a label; any
//! other method string collapses to [`UNKNOWN_METHOD`] so that malformed or
//! hostile methods cannot create new series.

/// Label used for methods outside [`VALID_HTTP_VERBS`].
pub const UNKNOWN_METHOD: &str = "UNKNOWN";

/// Recognized HTTP verbs (case-sensitive, as sent on the wire).
pub const VALID_HTTP_VERBS: [&str; 9] = [
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "CONNECT", "TRACE",
];

/// Reduce `method` to a bounded label.
///
/// Returns `""` when `exclude_verbs` is set; the empty label means "no method
/// dimension" and is dropped by [`crate::tags::TagSet`].
pub fn normalize_method(method: &str, exclude_verbs: bool) -> &str {
    if exclude_verbs {
        return "";
    }
    if VALID_HTTP_VERBS.contains(&method) {
        method
    } else {
        UNKNOWN_METHOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_verbs_pass_through() {
        for verb in VALID_HTTP_VERBS {
            assert_eq!(normalize_method(verb, false), verb);
        }
    }

    #[test]
    fn unknown_verbs_collapse() {
        for m in ["get", "PROPFIND", "", "GET ", "BREW", "G\u{0}T"] {
            assert_eq!(normalize_method(m, false), UNKNOWN_METHOD, "method {m:?}");
        }
    }

    #[test]
    fn excluded_verbs_are_empty() {
        for m in ["GET", "POST", "BREW", ""] {
            assert_eq!(normalize_method(m, true), "");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        for m in ["GET", "BREW"] {
            let once = normalize_method(m, false);
            assert_eq!(normalize_method(once, false), once);
        }
    }
}
