//! Sidecar HTTP endpoints.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use httpmon_core::MonitorError;

use crate::app_channel::{strip_hop_by_hop, AppRequest};
use crate::app_state::AppState;

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub app_id: String,
    pub metrics_enabled: bool,
    pub path_matching: Vec<String>,
    pub increased_cardinality: bool,
    pub exclude_verbs: bool,
}

pub async fn metadata(State(state): State<AppState>) -> Json<Metadata> {
    let cfg = state.cfg();
    Json(Metadata {
        app_id: cfg.app_id.clone(),
        metrics_enabled: state.metrics().is_enabled(),
        path_matching: cfg.metrics.http.path_matching.clone(),
        increased_cardinality: cfg.metrics.http.legacy,
        exclude_verbs: cfg.metrics.http.exclude_verbs,
    })
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.sink().render(),
    )
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

/// Forward `/v1.0/invoke/{path}` to the application, recording client metrics.
///
/// The query string and end-to-end headers travel both ways; metrics see the
/// query-free path. A failed call records completion without a status
/// dimension and answers 502.
pub async fn invoke(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let metrics = state.metrics();
    let path = format!("/{}", path.trim_start_matches('/'));

    metrics.client_request_started(method.as_str(), &path, body.len() as u64);
    let req = AppRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    };
    let start = Instant::now();
    let result = state.channel().invoke(req).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(resp) => {
            metrics.client_request_completed(
                method.as_str(),
                &path,
                &resp.status.to_string(),
                resp.body.len() as u64,
                elapsed_ms,
            );
            let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut app_headers = resp.headers;
            strip_hop_by_hop(&mut app_headers);
            let mut out = (status, resp.body).into_response();
            out.headers_mut().extend(app_headers);
            out
        }
        Err(e) => {
            metrics.client_request_completed(method.as_str(), &path, "", 0, elapsed_ms);
            tracing::warn!(%method, path = %path, error = %e, "app invocation failed");
            error_response(StatusCode::BAD_GATEWAY, &e)
        }
    }
}

fn error_response(status: StatusCode, err: &MonitorError) -> Response {
    (
        status,
        Json(ErrorBody {
            code: err.code().as_str(),
            message: err.to_string(),
        }),
    )
        .into_response()
}
