use serde::Deserialize;

use httpmon_core::error::{MonitorError, Result};
use httpmon_core::measure::Aggregation;
use httpmon_core::path::PathTemplate;
use httpmon_core::MonitoringConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidecarConfig {
    pub version: u32,

    pub app_id: String,

    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub app: AppSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl SidecarConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MonitorError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        if self.app_id.trim().is_empty() {
            return Err(MonitorError::BadConfig("app_id must not be empty".into()));
        }
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(MonitorError::BadConfig(format!(
                "listen must be a valid socket address: {}",
                self.listen
            )));
        }

        self.app.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:3500".into()
}

/// Where the application lives and how it is probed.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    #[serde(default = "default_health_probe_interval_ms")]
    pub health_probe_interval_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_path: default_health_path(),
            health_probe_interval_ms: default_health_probe_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(MonitorError::BadConfig(
                "app.base_url must start with http:// or https://".into(),
            ));
        }
        if !self.health_path.starts_with('/') {
            return Err(MonitorError::BadConfig("app.health_path must start with '/'".into()));
        }
        if !(1000..=300000).contains(&self.health_probe_interval_ms) {
            return Err(MonitorError::BadConfig(
                "app.health_probe_interval_ms must be between 1000 and 300000".into(),
            ));
        }
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(MonitorError::BadConfig(
                "app.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".into()
}
fn default_health_path() -> String {
    "/healthz".into()
}
fn default_health_probe_interval_ms() -> u64 {
    5000
}
fn default_timeout_ms() -> u64 {
    3000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// When false the recorder is never initialized and every call is a no-op.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub latency_buckets_ms: Option<Vec<f64>>,

    #[serde(default)]
    pub http: MonitoringConfig,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            latency_buckets_ms: None,
            http: MonitoringConfig::default(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        for raw in &self.http.path_matching {
            PathTemplate::parse(raw)?;
        }
        self.latency_aggregation()?;
        Ok(())
    }

    /// Configured latency buckets, or the default distribution.
    pub fn latency_aggregation(&self) -> Result<Aggregation> {
        match &self.latency_buckets_ms {
            Some(bounds) => Aggregation::distribution(bounds.clone()),
            None => Ok(Aggregation::default_latency()),
        }
    }
}

fn default_enabled() -> bool {
    true
}
