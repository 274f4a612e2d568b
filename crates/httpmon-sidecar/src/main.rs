//! httpmon sidecar
//!
//! - Serves sidecar endpoints behind the HTTP metrics middleware
//! - Forwards `/v1.0/invoke/*` to the application (client metrics)
//! - Probes application health on an interval (health-probe metrics)
//! - Exposes everything at `/metrics`

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use httpmon_core::error::{MonitorError, Result};
use httpmon_sidecar::{app_state, config, health_probe, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.code().as_str(), "httpmon-sidecar failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "httpmon.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .listen
        .parse()
        .map_err(|e| MonitorError::BadConfig(format!("listen: {e}")))?;

    let state = app_state::AppState::new(cfg)?;
    let _prober = health_probe::spawn(state.clone());
    let app = router::build_router(state);

    tracing::info!(%listen, "httpmon-sidecar starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MonitorError::Internal(format!("bind failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| MonitorError::Internal(format!("server failed: {e}")))
}
