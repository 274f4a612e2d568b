//! Tag keys and per-observation tag sets.

/// Dimensions a measurement can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKey {
    AppId,
    Method,
    Path,
    Status,
}

impl TagKey {
    pub fn as_str(self) -> &'static str {
        match self {
            TagKey::AppId => "app_id",
            TagKey::Method => "method",
            TagKey::Path => "path",
            TagKey::Status => "status",
        }
    }
}

/// Key set for byte-size measures. Never dimensioned by request shape.
pub const APP_TAGS: &[TagKey] = &[TagKey::AppId];
/// Key set for server request count/latency.
pub const SERVER_TAGS: &[TagKey] = &[TagKey::AppId, TagKey::Method, TagKey::Path, TagKey::Status];
/// Key set for client completion count/latency.
pub const CLIENT_TAGS: &[TagKey] = &[TagKey::AppId, TagKey::Method, TagKey::Path, TagKey::Status];
/// Key set for health probes.
pub const HEALTH_TAGS: &[TagKey] = &[TagKey::AppId, TagKey::Status];

/// Ordered tag values for a single recording call.
///
/// Empty values are not stored: an empty label means "no such dimension"
/// (e.g. verbs excluded or path unmatched).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<(TagKey, String)>,
}

impl TagSet {
    pub fn new() -> Self {
        Self { tags: Vec::with_capacity(4) }
    }

    /// Append `key=value`, skipping empty values.
    pub fn with(mut self, key: TagKey, value: &str) -> Self {
        if !value.is_empty() {
            self.tags.push((key, value.to_string()));
        }
        self
    }

    pub fn get(&self, key: TagKey) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = TagKey> + '_ {
        self.tags.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagKey, &str)> {
        self.tags.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
