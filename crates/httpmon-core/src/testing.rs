//! In-process capturing sink for tests.
//!
//! Keeps every accepted measurement in order and enforces the registration
//! contract (known measure, registered tag keys only) so tests catch tag-set
//! drift. Individual measures can be made to fail to exercise best-effort
//! recording.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{MonitorError, Result};
use crate::measure::View;
use crate::sink::MetricsSink;
use crate::tags::TagSet;

/// One accepted measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub measure: String,
    pub tags: TagSet,
    pub value: f64,
}

#[derive(Debug, Default)]
pub struct CapturingSink {
    views: Mutex<Vec<View>>,
    records: Mutex<Vec<Recorded>>,
    failing: Mutex<HashSet<String>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `record` for `measure` fail.
    pub fn fail_measure(&self, measure: &str) {
        if let Ok(mut f) = self.failing.lock() {
            f.insert(measure.to_string());
        }
    }

    pub fn views(&self) -> Vec<View> {
        self.views.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn view_names(&self) -> Vec<&'static str> {
        self.views().iter().map(View::name).collect()
    }

    pub fn records(&self) -> Vec<Recorded> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Accepted measurements for one measure, in recording order.
    pub fn records_for(&self, measure: &str) -> Vec<Recorded> {
        self.records()
            .into_iter()
            .filter(|r| r.measure == measure)
            .collect()
    }
}

impl MetricsSink for CapturingSink {
    fn register(&self, views: &[View]) -> Result<()> {
        let mut registered = self
            .views
            .lock()
            .map_err(|_| MonitorError::Internal("sink lock poisoned".into()))?;
        for v in views {
            if registered.iter().any(|r| r.name() == v.name()) {
                return Err(MonitorError::DuplicateMeasure(v.name().to_string()));
            }
            registered.push(v.clone());
        }
        Ok(())
    }

    fn record(&self, measure: &str, tags: &TagSet, value: f64) -> Result<()> {
        let failing = self
            .failing
            .lock()
            .map(|f| f.contains(measure))
            .unwrap_or(false);
        if failing {
            return Err(MonitorError::Internal(format!("injected failure for {measure}")));
        }

        {
            let views = self
                .views
                .lock()
                .map_err(|_| MonitorError::Internal("sink lock poisoned".into()))?;
            let view = views
                .iter()
                .find(|v| v.name() == measure)
                .ok_or_else(|| MonitorError::UnknownMeasure(measure.to_string()))?;
            if let Some(key) = tags.keys().find(|k| !view.tag_keys.contains(k)) {
                return Err(MonitorError::TagMismatch {
                    measure: measure.to_string(),
                    key: key.as_str(),
                });
            }
        }

        self.records
            .lock()
            .map_err(|_| MonitorError::Internal("sink lock poisoned".into()))?
            .push(Recorded {
                measure: measure.to_string(),
                tags: tags.clone(),
                value,
            });
        Ok(())
    }
}
