// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Storage backends for metrics.

use cadence_core::telemetry::{Metric, MetricId, MetricType, MetricValue, MetricsError, MetricsResult};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;
use std::time::Instant;

/// Trait defining the interface for metrics storage backends.
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Store or overwrite a metric.
    fn put_metric(&self, metric: Metric) -> MetricsResult<()>;

    /// Retrieve a metric by ID.
    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric>;

    /// Check if a metric exists.
    fn contains_metric(&self, id: &MetricId) -> bool;

    /// Get all metrics.
    fn list_all_metrics(&self) -> Vec<Metric>;

    /// Get the number of metrics stored.
    fn metric_count(&self) -> usize;

    /// Increment a counter by the given amount, returning the new value.
    fn increment_counter(&self, id: &MetricId, delta: u64) -> MetricsResult<u64> {
        let mut metric = self.get_metric(id)?;

        match metric.value {
            MetricValue::Counter(ref mut value) => {
                *value = value.saturating_add(delta);
                let result = *value;
                metric.last_updated = Instant::now();
                self.put_metric(metric)?;
                Ok(result)
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            }),
        }
    }

    /// Set a gauge value.
    fn set_gauge(&self, id: &MetricId, value: f64) -> MetricsResult<()> {
        let mut metric = self.get_metric(id)?;

        match metric.value {
            MetricValue::Gauge(ref mut gauge_value) => {
                *gauge_value = value;
                metric.last_updated = Instant::now();
                self.put_metric(metric)
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: metric.value.metric_type(),
            }),
        }
    }
}

/// Thread-safe in-memory backend.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    metrics: RwLock<HashMap<MetricId, Metric>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every metric in `namespace`.
    pub fn get_metrics_by_namespace(&self, namespace: &str) -> Vec<Metric> {
        self.metrics
            .read()
            .map(|m| {
                m.values()
                    .filter(|metric| metric.id.namespace == namespace)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl MetricsBackend for InMemoryBackend {
    fn put_metric(&self, metric: Metric) -> MetricsResult<()> {
        let mut metrics = self
            .metrics
            .write()
            .map_err(|e| MetricsError::StorageError(e.to_string()))?;
        metrics.insert(metric.id.clone(), metric);
        Ok(())
    }

    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        let metrics = self
            .metrics
            .read()
            .map_err(|e| MetricsError::StorageError(e.to_string()))?;
        metrics
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
    }

    fn contains_metric(&self, id: &MetricId) -> bool {
        self.metrics
            .read()
            .map(|m| m.contains_key(id))
            .unwrap_or(false)
    }

    fn list_all_metrics(&self) -> Vec<Metric> {
        self.metrics
            .read()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    fn metric_count(&self) -> usize {
        self.metrics.read().map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("scheduler", "frames");
        backend
            .put_metric(Metric::new_counter(id.clone(), "frames"))
            .unwrap();

        assert!(backend.contains_metric(&id));
        assert_eq!(backend.metric_count(), 1);
        assert_eq!(backend.get_metric(&id).unwrap().value, MetricValue::Counter(0));
    }

    #[test]
    fn test_missing_metric() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("nope", "nothing");
        assert_eq!(
            backend.get_metric(&id).unwrap_err(),
            MetricsError::MetricNotFound(id)
        );
    }

    #[test]
    fn test_type_mismatch() {
        let backend = InMemoryBackend::new();
        let id = MetricId::new("scheduler", "frame_time");
        backend
            .put_metric(Metric::new_gauge(id.clone(), "clock", "s"))
            .unwrap();

        let err = backend.increment_counter(&id, 1).unwrap_err();
        assert_eq!(
            err,
            MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: MetricType::Gauge,
            }
        );
    }

    #[test]
    fn test_namespace_filter() {
        let backend = InMemoryBackend::new();
        backend
            .put_metric(Metric::new_counter(MetricId::new("a", "x"), ""))
            .unwrap();
        backend
            .put_metric(Metric::new_counter(MetricId::new("a", "y"), ""))
            .unwrap();
        backend
            .put_metric(Metric::new_counter(MetricId::new("b", "x"), ""))
            .unwrap();

        assert_eq!(backend.get_metrics_by_namespace("a").len(), 2);
        assert_eq!(backend.get_metrics_by_namespace("b").len(), 1);
    }
}
