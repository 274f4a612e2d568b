//! In-memory aggregating sink.
//!
//! Implements [`MetricsSink`] on top of `DashMap`-backed series. Each view
//! owns one series family; rows are keyed by tag values in the view's
//! registered key order, with absent tags stored as empty values. Rendering
//! produces the Prometheus text exposition format for `/metrics`.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use httpmon_core::error::{MonitorError, Result};
use httpmon_core::measure::{Aggregation, View};
use httpmon_core::sink::MetricsSink;
use httpmon_core::tags::{TagKey, TagSet};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// `http/server/latency` -> `http_server_latency`
fn metric_name(measure: &str) -> String {
    measure
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn label_str(keys: &[TagKey], values: &[String]) -> String {
    keys.iter()
        .zip(values)
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}=\"{}\"", k.as_str(), escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
struct CounterVec {
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    fn inc(&self, key: Vec<String>) {
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self, key: &[String]) -> u64 {
        self.map
            .get(key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, keys: &[TagKey], out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (key, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(keys, &key), val);
        }
    }
}

struct AtomicHistogram {
    count: AtomicU64,
    // f64 bits
    sum: AtomicU64,
    buckets: Vec<AtomicU64>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0f64.to_bits()),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    fn sum(&self) -> f64 {
        f64::from_bits(self.sum.load(Ordering::Relaxed))
    }
}

struct HistogramVec {
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    fn new(bounds: Vec<f64>) -> Self {
        Self {
            bounds,
            map: DashMap::new(),
        }
    }

    /// Observe a value and increment cumulative buckets.
    fn observe(&self, key: Vec<String>, value: f64) {
        let hist = self
            .map
            .entry(key)
            .or_insert_with(|| AtomicHistogram::new(self.bounds.len()));

        hist.count.fetch_add(1, Ordering::Relaxed);
        let _ = hist
            .sum
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + value).to_bits())
            });

        for (i, &b) in self.bounds.iter().enumerate() {
            if value <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn count(&self, key: &[String]) -> u64 {
        self.map
            .get(key)
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn sum(&self, key: &[String]) -> f64 {
        self.map.get(key).map(|h| h.sum()).unwrap_or(0.0)
    }

    fn render(&self, name: &str, keys: &[TagKey], out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", name);
        let mut rows: Vec<Vec<String>> = self.map.iter().map(|r| r.key().clone()).collect();
        rows.sort();
        for key in rows {
            let Some(hist) = self.map.get(&key) else {
                continue;
            };
            let labels = label_str(keys, &key);
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{},", labels)
            };

            for (i, le) in self.bounds.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, hist.sum());
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

enum Series {
    Count(CounterVec),
    Distribution(HistogramVec),
}

struct Registered {
    view: View,
    series: Series,
}

impl Registered {
    /// Row key in registered key order; foreign keys are rejected.
    fn row_key(&self, tags: &TagSet) -> Result<Vec<String>> {
        if let Some(key) = tags.keys().find(|k| !self.view.tag_keys.contains(k)) {
            return Err(MonitorError::TagMismatch {
                measure: self.view.name().to_string(),
                key: key.as_str(),
            });
        }
        Ok(self
            .view
            .tag_keys
            .iter()
            .map(|k| tags.get(*k).unwrap_or_default().to_string())
            .collect())
    }
}

/// Process-local metrics backend with Prometheus rendering.
#[derive(Default)]
pub struct InMemorySink {
    views: DashMap<&'static str, Registered>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, measure: &str) -> bool {
        self.views.contains_key(measure)
    }

    /// Recorded count for the row matching `tags` (counter value, or number
    /// of observations for a distribution).
    pub fn count(&self, measure: &str, tags: &TagSet) -> u64 {
        let Some(reg) = self.views.get(measure) else {
            return 0;
        };
        let Ok(key) = reg.row_key(tags) else {
            return 0;
        };
        match &reg.series {
            Series::Count(c) => c.get(&key),
            Series::Distribution(h) => h.count(&key),
        }
    }

    /// Sum of observed values for a distribution row.
    pub fn sum(&self, measure: &str, tags: &TagSet) -> f64 {
        let Some(reg) = self.views.get(measure) else {
            return 0.0;
        };
        match (&reg.series, reg.row_key(tags)) {
            (Series::Distribution(h), Ok(key)) => h.sum(&key),
            _ => 0.0,
        }
    }

    /// Render all views in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut names: Vec<&'static str> = self.views.iter().map(|r| *r.key()).collect();
        names.sort_unstable();

        let mut out = String::new();
        for measure in names {
            let Some(reg) = self.views.get(measure) else {
                continue;
            };
            let name = metric_name(measure);
            let _ = writeln!(out, "# HELP {} {}", name, reg.view.measure.description());
            match &reg.series {
                Series::Count(c) => c.render(&name, &reg.view.tag_keys, &mut out),
                Series::Distribution(h) => h.render(&name, &reg.view.tag_keys, &mut out),
            }
        }
        out
    }
}

impl MetricsSink for InMemorySink {
    fn register(&self, views: &[View]) -> Result<()> {
        for (i, v) in views.iter().enumerate() {
            if views[..i].iter().any(|p| p.name() == v.name()) {
                return Err(MonitorError::DuplicateMeasure(v.name().to_string()));
            }
        }
        // Claim each name atomically; a batch that loses a race is undone.
        for (i, v) in views.iter().enumerate() {
            let claimed = match self.views.entry(v.name()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    let series = match &v.aggregation {
                        Aggregation::Count => Series::Count(CounterVec::default()),
                        Aggregation::Distribution(bounds) => {
                            Series::Distribution(HistogramVec::new(bounds.clone()))
                        }
                    };
                    slot.insert(Registered {
                        view: v.clone(),
                        series,
                    });
                    true
                }
            };
            if !claimed {
                for prev in &views[..i] {
                    self.views.remove(prev.name());
                }
                return Err(MonitorError::DuplicateMeasure(v.name().to_string()));
            }
        }
        Ok(())
    }

    fn record(&self, measure: &str, tags: &TagSet, value: f64) -> Result<()> {
        let reg = self
            .views
            .get(measure)
            .ok_or_else(|| MonitorError::UnknownMeasure(measure.to_string()))?;
        let key = reg.row_key(tags)?;
        match &reg.series {
            Series::Count(c) => c.inc(key),
            Series::Distribution(h) => h.observe(key, value),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmon_core::measure::{SERVER_LATENCY, SERVER_REQUEST_BYTES, SERVER_REQUEST_COUNT};
    use httpmon_core::tags::{APP_TAGS, SERVER_TAGS};

    fn sink() -> InMemorySink {
        let s = InMemorySink::new();
        s.register(&[
            View::new(SERVER_REQUEST_COUNT, SERVER_TAGS, Aggregation::Count),
            View::new(SERVER_LATENCY, SERVER_TAGS, Aggregation::Distribution(vec![5.0, 10.0])),
            View::new(SERVER_REQUEST_BYTES, APP_TAGS, Aggregation::Distribution(vec![1024.0])),
        ])
        .unwrap();
        s
    }

    fn tags() -> TagSet {
        TagSet::new()
            .with(TagKey::AppId, "app1")
            .with(TagKey::Method, "GET")
            .with(TagKey::Path, "/orders/*")
            .with(TagKey::Status, "200")
    }

    #[test]
    fn duplicate_registration_rejected() {
        let s = sink();
        let err = s
            .register(&[View::new(SERVER_REQUEST_COUNT, SERVER_TAGS, Aggregation::Count)])
            .unwrap_err();
        assert_eq!(err.code().as_str(), "REGISTRATION");

        let fresh = InMemorySink::new();
        let v = View::new(SERVER_REQUEST_COUNT, SERVER_TAGS, Aggregation::Count);
        assert!(fresh.register(&[v.clone(), v]).is_err());
        assert!(!fresh.is_registered(SERVER_REQUEST_COUNT.name()));
    }

    #[test]
    fn concurrent_registration_has_one_winner() {
        let s = InMemorySink::new();
        let wins = std::sync::atomic::AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let v = View::new(SERVER_REQUEST_COUNT, SERVER_TAGS, Aggregation::Count);
                    if s.register(&[v]).is_ok() {
                        wins.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });
        assert_eq!(wins.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn losing_batch_leaves_no_partial_views() {
        let s = InMemorySink::new();
        s.register(&[View::new(SERVER_LATENCY, SERVER_TAGS, Aggregation::Count)])
            .unwrap();
        let err = s
            .register(&[
                View::new(SERVER_REQUEST_COUNT, SERVER_TAGS, Aggregation::Count),
                View::new(SERVER_LATENCY, SERVER_TAGS, Aggregation::Count),
            ])
            .unwrap_err();
        assert_eq!(err.code().as_str(), "REGISTRATION");
        assert!(!s.is_registered(SERVER_REQUEST_COUNT.name()));
        assert!(s.is_registered(SERVER_LATENCY.name()));
    }

    #[test]
    fn counts_and_distributions_aggregate_per_row() {
        let s = sink();
        s.record(SERVER_REQUEST_COUNT.name(), &tags(), 1.0).unwrap();
        s.record(SERVER_REQUEST_COUNT.name(), &tags(), 1.0).unwrap();
        s.record(SERVER_LATENCY.name(), &tags(), 3.0).unwrap();
        s.record(SERVER_LATENCY.name(), &tags(), 12.5).unwrap();

        assert_eq!(s.count(SERVER_REQUEST_COUNT.name(), &tags()), 2);
        assert_eq!(s.count(SERVER_LATENCY.name(), &tags()), 2);
        assert_eq!(s.sum(SERVER_LATENCY.name(), &tags()), 15.5);
    }

    #[test]
    fn foreign_tag_keys_rejected() {
        let s = sink();
        let err = s
            .record(SERVER_REQUEST_BYTES.name(), &tags(), 10.0)
            .unwrap_err();
        assert_eq!(err.code().as_str(), "TAG_MISMATCH");
    }

    #[test]
    fn unknown_measure_rejected() {
        let s = sink();
        assert!(s.record("http/nope", &tags(), 1.0).is_err());
    }

    #[test]
    fn missing_keys_aggregate_as_empty() {
        let s = sink();
        let partial = TagSet::new().with(TagKey::AppId, "app1").with(TagKey::Status, "200");
        s.record(SERVER_REQUEST_COUNT.name(), &partial, 1.0).unwrap();
        assert_eq!(s.count(SERVER_REQUEST_COUNT.name(), &partial), 1);
        assert!(s
            .render()
            .contains("http_server_request_count{app_id=\"app1\",status=\"200\"} 1"));
    }

    #[test]
    fn renders_prometheus_text() {
        let s = sink();
        s.record(SERVER_LATENCY.name(), &tags(), 7.0).unwrap();
        let out = s.render();
        assert!(out.contains("# TYPE http_server_latency histogram"));
        assert!(out.contains(
            "http_server_latency_bucket{app_id=\"app1\",method=\"GET\",path=\"/orders/*\",status=\"200\",le=\"5\"} 0"
        ));
        assert!(out.contains(
            "http_server_latency_bucket{app_id=\"app1\",method=\"GET\",path=\"/orders/*\",status=\"200\",le=\"10\"} 1"
        ));
        assert!(out.contains(
            "http_server_latency_count{app_id=\"app1\",method=\"GET\",path=\"/orders/*\",status=\"200\"} 1"
        ));
        assert!(out.contains("# TYPE http_server_request_count counter"));
    }

    #[test]
    fn escapes_label_values() {
        assert_eq!(escape_label("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }
}
