//! httpmon core: cardinality-bounded HTTP request metrics.
//!
//! This crate reduces observed HTTP methods and paths to a bounded label set
//! and records server, client and health-probe measurements into a pluggable
//! [`sink::MetricsSink`]. It carries no transport or runtime dependencies so
//! it can be driven by any HTTP stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Recording never fails the request being measured: sink errors are logged
//! and dropped.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod http;
pub mod measure;
pub mod path;
pub mod sink;
pub mod tags;
pub mod testing;
pub mod verb;

/// Shared result type.
pub use error::{MonitorError, Result};
pub use http::{HttpMetrics, MonitoringConfig};
