//! HTTP request metrics: server, client and health-probe recording.
//!
//! [`HttpMetrics`] is built once by the composition root and cloned into every
//! call site. A value that was never initialized ([`HttpMetrics::disabled`])
//! turns every recording call into a no-op, so callers never branch on it.
//!
//! Tag shape depends on mode:
//! - full (legacy, or templates configured): method/path/status, sidecar API
//!   paths collapsed before matching; legacy additionally records
//!   `http/server/response_count`.
//! - compact: method/path/status with whatever labels resolved (usually only
//!   static paths survive).
//!
//! Byte-size measures always carry `app_id` only. Health probes carry
//! `app_id` + `status`.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::Result;
use crate::measure::{self, Aggregation, MeasureDescriptor, View};
use crate::path::{collapse_api_path, PathMatcher, TrailingSlash};
use crate::sink::MetricsSink;
use crate::tags::{TagKey, TagSet, APP_TAGS, CLIENT_TAGS, HEALTH_TAGS, SERVER_TAGS};
use crate::verb::normalize_method;

/// HTTP monitoring options, supplied once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitoringConfig {
    /// Ordered path templates; first match wins.
    #[serde(default)]
    pub path_matching: Vec<String>,

    /// Legacy mode: unmatched paths are recorded verbatim (unbounded).
    #[serde(default, rename = "increased_cardinality")]
    pub legacy: bool,

    /// Drop the method dimension entirely.
    #[serde(default)]
    pub exclude_verbs: bool,

    #[serde(default)]
    pub trailing_slash: TrailingSlash,
}

impl MonitoringConfig {
    pub fn new(path_matching: Vec<String>, legacy: bool, exclude_verbs: bool) -> Self {
        Self {
            path_matching,
            legacy,
            exclude_verbs,
            trailing_slash: TrailingSlash::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimensioning {
    Full { response_count: bool },
    Compact,
}

struct Inner {
    app_id: String,
    exclude_verbs: bool,
    dimensioning: Dimensioning,
    matcher: PathMatcher,
    sink: Arc<dyn MetricsSink>,
}

/// Recorder handle. Cheap to clone.
#[derive(Clone, Default)]
pub struct HttpMetrics {
    inner: Option<Arc<Inner>>,
}

impl HttpMetrics {
    /// A recorder that was never initialized: every call is a no-op.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Register all HTTP views with `sink` and return an enabled recorder.
    pub fn init(
        sink: Arc<dyn MetricsSink>,
        app_id: impl Into<String>,
        config: &MonitoringConfig,
        latency: Aggregation,
    ) -> Result<Self> {
        let app_id = app_id.into();
        let matcher = PathMatcher::new(&config.path_matching, config.legacy, config.trailing_slash)?;

        let dimensioning = if config.legacy || matcher.enabled() {
            Dimensioning::Full {
                response_count: config.legacy,
            }
        } else {
            Dimensioning::Compact
        };

        sink.register(&Self::views(config.legacy, latency))?;

        tracing::info!(
            app_id = %app_id,
            templates = config.path_matching.len(),
            legacy = config.legacy,
            exclude_verbs = config.exclude_verbs,
            "http metrics initialized"
        );

        Ok(Self {
            inner: Some(Arc::new(Inner {
                app_id,
                exclude_verbs: config.exclude_verbs,
                dimensioning,
                matcher,
                sink,
            })),
        })
    }

    /// Views registered by [`HttpMetrics::init`].
    pub fn views(legacy: bool, latency: Aggregation) -> Vec<View> {
        let size = Aggregation::default_size();
        let mut views = vec![
            View::new(measure::SERVER_REQUEST_BYTES, APP_TAGS, size.clone()),
            View::new(measure::SERVER_RESPONSE_BYTES, APP_TAGS, size.clone()),
            View::new(measure::SERVER_LATENCY, SERVER_TAGS, latency.clone()),
            View::new(measure::SERVER_REQUEST_COUNT, SERVER_TAGS, Aggregation::Count),
            View::new(measure::CLIENT_SENT_BYTES, APP_TAGS, size.clone()),
            View::new(measure::CLIENT_RECEIVED_BYTES, APP_TAGS, size),
            View::new(measure::CLIENT_ROUNDTRIP_LATENCY, CLIENT_TAGS, latency.clone()),
            View::new(measure::CLIENT_COMPLETED_COUNT, CLIENT_TAGS, Aggregation::Count),
            View::new(measure::HEALTH_PROBE_ROUNDTRIP_LATENCY, HEALTH_TAGS, latency),
            View::new(measure::HEALTH_PROBE_COMPLETED_COUNT, HEALTH_TAGS, Aggregation::Count),
        ];
        if legacy {
            views.push(View::new(measure::SERVER_RESPONSE_COUNT, SERVER_TAGS, Aggregation::Count));
        }
        views
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Whether paths are worth computing for this recorder (legacy or templates).
    pub fn dimensions_paths(&self) -> bool {
        matches!(
            self.inner.as_deref().map(|i| i.dimensioning),
            Some(Dimensioning::Full { .. })
        )
    }

    /// Path label the middleware should hand to
    /// [`HttpMetrics::server_request_completed`]; empty when paths are not
    /// dimensioned, which skips matching entirely.
    pub fn precompute_path(&self, raw: &str) -> String {
        if self.dimensions_paths() {
            collapse_api_path(raw).into_owned()
        } else {
            String::new()
        }
    }

    pub fn server_request_completed(
        &self,
        method: &str,
        path: &str,
        status: &str,
        req_bytes: u64,
        resp_bytes: u64,
        elapsed_ms: f64,
    ) {
        let Some(inner) = self.inner.as_deref() else {
            return;
        };

        let method = normalize_method(method, inner.exclude_verbs);
        let path = inner.path_label(path);
        let tags = inner.dimensioned_tags(method, &path, status);

        inner.push(&measure::SERVER_REQUEST_COUNT, &tags, 1.0);
        inner.push(&measure::SERVER_LATENCY, &tags, elapsed_ms);
        if inner.dimensioning == (Dimensioning::Full { response_count: true }) {
            inner.push(&measure::SERVER_RESPONSE_COUNT, &tags, 1.0);
        }

        let app = inner.app_tags();
        inner.push(&measure::SERVER_REQUEST_BYTES, &app, req_bytes as f64);
        inner.push(&measure::SERVER_RESPONSE_BYTES, &app, resp_bytes as f64);
    }

    /// Outbound request leaving for the app. Only the body size is recorded,
    /// under `app_id`.
    pub fn client_request_started(&self, method: &str, path: &str, bytes: u64) {
        let Some(inner) = self.inner.as_deref() else {
            return;
        };
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(
                method = normalize_method(method, inner.exclude_verbs),
                path = %inner.path_label(path),
                bytes,
                "client request started"
            );
        }
        inner.push(&measure::CLIENT_SENT_BYTES, &inner.app_tags(), bytes as f64);
    }

    pub fn client_request_completed(
        &self,
        method: &str,
        path: &str,
        status: &str,
        bytes: u64,
        elapsed_ms: f64,
    ) {
        let Some(inner) = self.inner.as_deref() else {
            return;
        };

        let method = normalize_method(method, inner.exclude_verbs);
        let path = inner.path_label(path);
        let tags = inner.dimensioned_tags(method, &path, status);

        inner.push(&measure::CLIENT_COMPLETED_COUNT, &tags, 1.0);
        inner.push(&measure::CLIENT_ROUNDTRIP_LATENCY, &tags, elapsed_ms);
        inner.push(&measure::CLIENT_RECEIVED_BYTES, &inner.app_tags(), bytes as f64);
    }

    /// No measure is attached to probe start; it is traced only.
    pub fn health_probe_started(&self) {
        let Some(inner) = self.inner.as_deref() else {
            return;
        };
        tracing::trace!(app_id = %inner.app_id, "health probe started");
    }

    pub fn health_probe_completed(&self, status: &str, elapsed_ms: f64) {
        let Some(inner) = self.inner.as_deref() else {
            return;
        };

        let tags = TagSet::new()
            .with(TagKey::AppId, &inner.app_id)
            .with(TagKey::Status, status);
        inner.push(&measure::HEALTH_PROBE_COMPLETED_COUNT, &tags, 1.0);
        inner.push(&measure::HEALTH_PROBE_ROUNDTRIP_LATENCY, &tags, elapsed_ms);
    }
}

impl Inner {
    fn path_label(&self, raw: &str) -> String {
        match self.dimensioning {
            Dimensioning::Full { .. } => {
                let collapsed = collapse_api_path(raw);
                self.matcher.resolve(&collapsed).label().to_string()
            }
            Dimensioning::Compact => self.matcher.resolve(raw).label().to_string(),
        }
    }

    fn dimensioned_tags(&self, method: &str, path: &str, status: &str) -> TagSet {
        TagSet::new()
            .with(TagKey::AppId, &self.app_id)
            .with(TagKey::Method, method)
            .with(TagKey::Path, path)
            .with(TagKey::Status, status)
    }

    fn app_tags(&self) -> TagSet {
        TagSet::new().with(TagKey::AppId, &self.app_id)
    }

    /// Best-effort push; a failed measurement never affects the others.
    fn push(&self, measure: &MeasureDescriptor, tags: &TagSet, value: f64) {
        if let Err(e) = self.sink.record(measure.name(), tags, value) {
            tracing::debug!(measure = measure.name(), error = %e, "measurement dropped");
        }
    }
}
