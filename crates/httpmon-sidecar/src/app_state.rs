//! Shared application state (composition root).
//!
//! The recorder is built here exactly once and handed out by clone; nothing
//! else in the sidecar constructs or mutates it.

use std::sync::Arc;

use httpmon_core::error::Result;
use httpmon_core::HttpMetrics;

use crate::app_channel::{AppChannel, HttpAppChannel};
use crate::config::SidecarConfig;
use crate::obs::InMemorySink;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: HttpMetrics,
    channel: Arc<dyn AppChannel>,
}

struct AppStateInner {
    cfg: SidecarConfig,
    sink: Arc<InMemorySink>,
}

impl AppState {
    /// Build application state with the `reqwest` app channel.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: SidecarConfig) -> Result<Self> {
        let channel = Arc::new(HttpAppChannel::new(&cfg.app)?);
        Self::with_channel(cfg, channel)
    }

    pub fn with_channel(cfg: SidecarConfig, channel: Arc<dyn AppChannel>) -> Result<Self> {
        let sink = Arc::new(InMemorySink::new());

        let metrics = if cfg.metrics.enabled {
            HttpMetrics::init(
                sink.clone(),
                cfg.app_id.clone(),
                &cfg.metrics.http,
                cfg.metrics.latency_aggregation()?,
            )?
        } else {
            tracing::info!(app_id = %cfg.app_id, "http metrics disabled");
            HttpMetrics::disabled()
        };

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, sink }),
            metrics,
            channel,
        })
    }

    pub fn cfg(&self) -> &SidecarConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &HttpMetrics {
        &self.metrics
    }

    pub fn sink(&self) -> &InMemorySink {
        &self.inner.sink
    }

    pub fn channel(&self) -> Arc<dyn AppChannel> {
        Arc::clone(&self.channel)
    }
}
