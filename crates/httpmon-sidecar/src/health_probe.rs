//! Periodic application health probing.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use httpmon_core::HttpMetrics;

use crate::app_channel::AppChannel;
use crate::app_state::AppState;

/// Probe once, recording start and completion. Returns the app status code,
/// or `None` if the app could not be reached (recorded without a status).
pub async fn probe_once(metrics: &HttpMetrics, channel: &dyn AppChannel) -> Option<u16> {
    metrics.health_probe_started();
    let start = Instant::now();
    let result = channel.probe().await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(status) => {
            metrics.health_probe_completed(&status.to_string(), elapsed_ms);
            Some(status)
        }
        Err(e) => {
            tracing::warn!(error = %e, "app health probe failed");
            metrics.health_probe_completed("", elapsed_ms);
            None
        }
    }
}

/// Spawn the background prober on the configured interval.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    let every = Duration::from_millis(state.cfg().app.health_probe_interval_ms);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let channel = state.channel();
        loop {
            tick.tick().await;
            probe_once(state.metrics(), channel.as_ref()).await;
        }
    })
}
