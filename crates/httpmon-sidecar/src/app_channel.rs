//! Outbound channel to the application.
//!
//! Used by the invoke route (client metrics) and the health prober
//! (health-probe metrics). The trait is the seam tests fake.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

use httpmon_core::error::{MonitorError, Result};

use crate::config::AppSection;

/// Connection-scoped headers that are never forwarded in either direction.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Drop headers that belong to a single hop (and lengths the client recomputes).
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// Request forwarded to the application.
#[derive(Debug, Clone)]
pub struct AppRequest {
    pub method: Method,
    /// Leading-slash path, without the query.
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl AppRequest {
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) if !q.is_empty() => format!("{}?{}", self.path, q),
            _ => self.path.clone(),
        }
    }
}

/// Application response as seen by the sidecar.
#[derive(Debug, Clone)]
pub struct AppResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[async_trait]
pub trait AppChannel: Send + Sync {
    /// Forward a request to the application.
    async fn invoke(&self, req: AppRequest) -> Result<AppResponse>;

    /// Call the application's health endpoint and return the status code.
    async fn probe(&self) -> Result<u16>;
}

/// `reqwest`-backed channel.
pub struct HttpAppChannel {
    client: reqwest::Client,
    base_url: String,
    health_path: String,
}

impl HttpAppChannel {
    pub fn new(cfg: &AppSection) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| MonitorError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            health_path: cfg.health_path.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AppChannel for HttpAppChannel {
    async fn invoke(&self, req: AppRequest) -> Result<AppResponse> {
        let url = self.url(&req.path_and_query());
        let mut headers = req.headers;
        strip_hop_by_hop(&mut headers);
        let resp = self
            .client
            .request(req.method, url)
            .headers(headers)
            .body(req.body)
            .send()
            .await
            .map_err(|e| MonitorError::Upstream(e.to_string()))?;
        let status = resp.status().as_u16();
        let mut headers = resp.headers().clone();
        strip_hop_by_hop(&mut headers);
        let body = resp
            .bytes()
            .await
            .map_err(|e| MonitorError::Upstream(e.to_string()))?;
        Ok(AppResponse {
            status,
            headers,
            body,
        })
    }

    async fn probe(&self) -> Result<u16> {
        let resp = self
            .client
            .get(self.url(&self.health_path))
            .send()
            .await
            .map_err(|e| MonitorError::Upstream(e.to_string()))?;
        Ok(resp.status().as_u16())
    }
}
