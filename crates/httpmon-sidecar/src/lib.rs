//! httpmon sidecar library entry.
//!
//! This crate wires config loading, the in-memory metrics backend, the HTTP
//! metrics middleware, the app channel and the health prober into a sidecar
//! service. It is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_channel;
pub mod app_state;
pub mod config;
pub mod handlers;
pub mod health_probe;
pub mod middleware;
pub mod obs;
pub mod router;
