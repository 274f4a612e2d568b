//! Sidecar config loader (strict parsing).

pub mod schema;

use std::fs;

use httpmon_core::error::{MonitorError, Result};

pub use schema::{AppSection, MetricsSection, SidecarConfig};

pub fn load_from_file(path: &str) -> Result<SidecarConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MonitorError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<SidecarConfig> {
    let cfg: SidecarConfig = serde_yaml::from_str(s)
        .map_err(|e| MonitorError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
