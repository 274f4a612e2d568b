//! Path normalization: templates, the ordered matcher, and API label collapsing.

pub mod api;
pub mod matcher;
pub mod template;

pub use api::collapse_api_path;
pub use matcher::{strip_query, PathMatcher, Resolution, TrailingSlash, STATIC_PATHS};
pub use template::PathTemplate;
