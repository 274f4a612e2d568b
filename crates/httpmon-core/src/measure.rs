//! Measure descriptors, aggregations and views.

use crate::error::{MonitorError, Result};
use crate::tags::TagKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Bytes,
    Milliseconds,
    Dimensionless,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Bytes => "By",
            Unit::Milliseconds => "ms",
            Unit::Dimensionless => "1",
        }
    }
}

/// A named measure. Declared once as a constant and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureDescriptor {
    name: &'static str,
    unit: Unit,
    description: &'static str,
}

impl MeasureDescriptor {
    pub const fn new(name: &'static str, unit: Unit, description: &'static str) -> Self {
        Self { name, unit, description }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn unit(&self) -> Unit {
        self.unit
    }
    pub fn description(&self) -> &'static str {
        self.description
    }
}

pub const SERVER_REQUEST_BYTES: MeasureDescriptor = MeasureDescriptor::new(
    "http/server/request_bytes",
    Unit::Bytes,
    "HTTP request body size if set as ContentLength (uncompressed) in server.",
);
pub const SERVER_RESPONSE_BYTES: MeasureDescriptor = MeasureDescriptor::new(
    "http/server/response_bytes",
    Unit::Bytes,
    "HTTP response body size (uncompressed) in server.",
);
pub const SERVER_LATENCY: MeasureDescriptor = MeasureDescriptor::new(
    "http/server/latency",
    Unit::Milliseconds,
    "HTTP request end-to-end latency in server.",
);
pub const SERVER_REQUEST_COUNT: MeasureDescriptor = MeasureDescriptor::new(
    "http/server/request_count",
    Unit::Dimensionless,
    "Count of HTTP requests processed by the server.",
);
pub const SERVER_RESPONSE_COUNT: MeasureDescriptor = MeasureDescriptor::new(
    "http/server/response_count",
    Unit::Dimensionless,
    "The number of HTTP responses.",
);
pub const CLIENT_SENT_BYTES: MeasureDescriptor = MeasureDescriptor::new(
    "http/client/sent_bytes",
    Unit::Bytes,
    "Total bytes sent in request body (not including headers).",
);
pub const CLIENT_RECEIVED_BYTES: MeasureDescriptor = MeasureDescriptor::new(
    "http/client/received_bytes",
    Unit::Bytes,
    "Total bytes received in response bodies (not including headers but including error responses with bodies).",
);
pub const CLIENT_ROUNDTRIP_LATENCY: MeasureDescriptor = MeasureDescriptor::new(
    "http/client/roundtrip_latency",
    Unit::Milliseconds,
    "Time between first byte of request headers sent to last byte of response received, or terminal error.",
);
pub const CLIENT_COMPLETED_COUNT: MeasureDescriptor = MeasureDescriptor::new(
    "http/client/completed_count",
    Unit::Dimensionless,
    "Count of completed requests.",
);
pub const HEALTH_PROBE_COMPLETED_COUNT: MeasureDescriptor = MeasureDescriptor::new(
    "http/healthprobes/completed_count",
    Unit::Dimensionless,
    "Count of completed health probes.",
);
pub const HEALTH_PROBE_ROUNDTRIP_LATENCY: MeasureDescriptor = MeasureDescriptor::new(
    "http/healthprobes/roundtrip_latency",
    Unit::Milliseconds,
    "Time between first byte of health probes headers sent to last byte of response received, or terminal error.",
);

// Byte bucket bounds: 1KiB .. 4GiB
const SIZE_BOUNDS: [f64; 13] = [
    1024.0,
    2048.0,
    4096.0,
    16384.0,
    65536.0,
    262144.0,
    1048576.0,
    4194304.0,
    16777216.0,
    67108864.0,
    268435456.0,
    1073741824.0,
    4294967296.0,
];

// Latency bucket bounds in milliseconds.
const LATENCY_BOUNDS_MS: [f64; 34] = [
    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 13.0, 16.0, 20.0, 25.0, 30.0, 40.0, 50.0, 65.0, 80.0,
    100.0, 130.0, 160.0, 200.0, 250.0, 300.0, 400.0, 500.0, 650.0, 800.0, 1000.0, 2000.0, 5000.0,
    10000.0, 20000.0, 50000.0, 100000.0,
];

/// How a view aggregates recorded values.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Number of recordings; the value is ignored.
    Count,
    /// Histogram with the given upper bucket bounds (an overflow bucket is implicit).
    Distribution(Vec<f64>),
}

impl Aggregation {
    /// Validated histogram: bounds must be finite, positive and strictly increasing.
    pub fn distribution(bounds: Vec<f64>) -> Result<Self> {
        if bounds.is_empty() {
            return Err(MonitorError::BadConfig("distribution needs at least one bound".into()));
        }
        let mut prev = 0.0;
        for &b in &bounds {
            if !b.is_finite() || b <= prev {
                return Err(MonitorError::BadConfig(format!(
                    "distribution bounds must be positive and strictly increasing (got {b} after {prev})"
                )));
            }
            prev = b;
        }
        Ok(Aggregation::Distribution(bounds))
    }

    pub fn default_size() -> Self {
        Aggregation::Distribution(SIZE_BOUNDS.to_vec())
    }

    pub fn default_latency() -> Self {
        Aggregation::Distribution(LATENCY_BOUNDS_MS.to_vec())
    }
}

/// A measure registered with a fixed key set and aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub measure: MeasureDescriptor,
    pub tag_keys: Vec<TagKey>,
    pub aggregation: Aggregation,
}

impl View {
    pub fn new(measure: MeasureDescriptor, tag_keys: &[TagKey], aggregation: Aggregation) -> Self {
        Self {
            measure,
            tag_keys: tag_keys.to_vec(),
            aggregation,
        }
    }

    pub fn name(&self) -> &'static str {
        self.measure.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_validation() {
        assert!(Aggregation::distribution(vec![1.0, 5.0, 10.0]).is_ok());
        assert!(Aggregation::distribution(vec![]).is_err());
        assert!(Aggregation::distribution(vec![0.0, 1.0]).is_err());
        assert!(Aggregation::distribution(vec![5.0, 5.0]).is_err());
        assert!(Aggregation::distribution(vec![1.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        for agg in [Aggregation::default_size(), Aggregation::default_latency()] {
            match agg {
                Aggregation::Distribution(bounds) => {
                    assert!(Aggregation::distribution(bounds).is_ok())
                }
                Aggregation::Count => unreachable!(),
            }
        }
    }
}
