//! In-process metrics backend.
//!
//! The sidecar records into [`metrics::InMemorySink`] and serves it from the
//! `/metrics` handler in Prometheus text format.

pub mod metrics;

pub use metrics::InMemorySink;
