//! HTTP server metrics middleware.
//!
//! Records one server-request-completed observation per request. The
//! response passes through untouched; the path label is only computed when
//! the recorder dimensions paths.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, HeaderMap},
    middleware::Next,
    response::Response,
};
use http_body::Body as _;

use httpmon_core::HttpMetrics;

/// Use with `axum::middleware::from_fn_with_state(metrics, track_http_metrics)`.
pub async fn track_http_metrics(
    State(metrics): State<HttpMetrics>,
    request: Request,
    next: Next,
) -> Response {
    if !metrics.is_enabled() {
        return next.run(request).await;
    }

    let req_bytes = content_length(request.headers());
    let method = request.method().as_str().to_owned();
    let path = metrics.precompute_path(request.uri().path());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let status = response.status().as_u16().to_string();
    let resp_bytes = response
        .body()
        .size_hint()
        .exact()
        .unwrap_or_else(|| content_length(response.headers()));

    metrics.server_request_completed(&method, &path, &status, req_bytes, resp_bytes, elapsed_ms);

    response
}

/// `content-length` as bytes; missing, unparsable or negative values count as 0.
fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|n| n.max(0) as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(CONTENT_LENGTH, HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn content_length_parsing() {
        assert_eq!(content_length(&headers("128")), 128);
        assert_eq!(content_length(&headers("-5")), 0);
        assert_eq!(content_length(&headers("abc")), 0);
        assert_eq!(content_length(&HeaderMap::new()), 0);
    }
}
