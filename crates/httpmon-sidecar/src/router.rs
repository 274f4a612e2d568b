//! Axum router wiring.
//!
//! Every route, including `/metrics` itself, runs behind the metrics
//! middleware.

use axum::{middleware, routing::any, routing::get, Router};

use crate::{app_state::AppState, handlers, middleware::track_http_metrics};

pub fn build_router(state: AppState) -> Router {
    let metrics = state.metrics().clone();
    Router::new()
        .route("/v1.0/healthz", get(handlers::healthz))
        .route("/v1.0/metadata", get(handlers::metadata))
        .route("/metrics", get(handlers::metrics))
        .route("/v1.0/invoke/*path", any(handlers::invoke))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(metrics, track_http_metrics))
        .with_state(state)
}
