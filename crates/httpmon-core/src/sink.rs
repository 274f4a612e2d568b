//! Metrics backend capability.
//!
//! The recorder only needs two things from a backend: register views once at
//! startup, then accept individual measurements. Implementations must be
//! cheap and non-blocking on `record`; buffering/export is their concern.

use crate::error::Result;
use crate::measure::View;
use crate::tags::TagSet;

pub trait MetricsSink: Send + Sync {
    /// Register views. Must fail if a measure name is already registered.
    fn register(&self, views: &[View]) -> Result<()>;

    /// Record one value for `measure` under `tags`.
    ///
    /// `tags` may omit registered keys (the dimension is then empty) but must
    /// not carry keys outside the registered set.
    fn record(&self, measure: &str, tags: &TagSet, value: f64) -> Result<()>;
}
