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

//! Registry for managing metrics.

use super::backend::{InMemoryBackend, MetricsBackend};
use cadence_core::telemetry::{Metric, MetricId, MetricType, MetricsError, MetricsResult};
use std::sync::Arc;

/// Central registry for scheduler metrics.
///
/// Registration is idempotent: registering an existing id of the same type
/// hands back a new handle to the stored metric instead of resetting it.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    backend: Arc<dyn MetricsBackend>,
}

impl MetricsRegistry {
    /// Create a new metrics registry with the default in-memory backend
    pub fn new() -> Self {
        Self {
            backend: Arc::new(InMemoryBackend::new()),
        }
    }

    /// Create a new metrics registry with a custom backend
    pub fn with_backend(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }

    /// Register a counter metric
    pub fn register_counter(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> MetricsResult<CounterHandle> {
        let id = MetricId::new(namespace, name);
        self.ensure(Metric::new_counter(id.clone(), description))?;
        Ok(CounterHandle::new(id, self.backend.clone()))
    }

    /// Register a gauge metric
    pub fn register_gauge(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> MetricsResult<GaugeHandle> {
        let id = MetricId::new(namespace, name);
        self.ensure(Metric::new_gauge(id.clone(), description, unit))?;
        Ok(GaugeHandle::new(id, self.backend.clone()))
    }

    fn ensure(&self, metric: Metric) -> MetricsResult<()> {
        match self.backend.get_metric(&metric.id) {
            Ok(existing) if existing.metric_type() == metric.metric_type() => Ok(()),
            Ok(existing) => Err(MetricsError::TypeMismatch {
                expected: metric.metric_type(),
                found: existing.metric_type(),
            }),
            Err(MetricsError::MetricNotFound(_)) => self.backend.put_metric(metric),
            Err(e) => Err(e),
        }
    }

    /// Get a metric by ID
    pub fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        self.backend.get_metric(id)
    }

    /// Check if a metric exists
    pub fn contains_metric(&self, id: &MetricId) -> bool {
        self.backend.contains_metric(id)
    }

    /// Get all metrics in a namespace, sorted by name
    pub fn get_namespace_metrics(&self, namespace: &str) -> Vec<Metric> {
        let mut metrics: Vec<Metric> = self
            .backend
            .list_all_metrics()
            .into_iter()
            .filter(|m| m.id.namespace == namespace)
            .collect();
        metrics.sort_by(|a, b| a.id.name.cmp(&b.id.name));
        metrics
    }

    /// Get all counters
    pub fn get_all_counters(&self) -> Vec<Metric> {
        self.backend
            .list_all_metrics()
            .into_iter()
            .filter(|m| m.metric_type() == MetricType::Counter)
            .collect()
    }

    /// Get the total number of metrics
    pub fn metric_count(&self) -> usize {
        self.backend.metric_count()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for efficient counter operations
#[derive(Debug, Clone)]
pub struct CounterHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl CounterHandle {
    fn new(id: MetricId, backend: Arc<dyn MetricsBackend>) -> Self {
        Self { id, backend }
    }

    /// Increment the counter by 1
    pub fn increment(&self) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, 1)
    }

    /// Increment the counter by a specific amount
    pub fn increment_by(&self, amount: u64) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, amount)
    }

    /// Get the current counter value
    pub fn get(&self) -> MetricsResult<u64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_counter()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            })
    }

    /// Get the metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for efficient gauge operations
#[derive(Debug, Clone)]
pub struct GaugeHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl GaugeHandle {
    fn new(id: MetricId, backend: Arc<dyn MetricsBackend>) -> Self {
        Self { id, backend }
    }

    /// Set the gauge to a specific value
    pub fn set(&self, value: f64) -> MetricsResult<()> {
        self.backend.set_gauge(&self.id, value)
    }

    /// Get the current gauge value
    pub fn get(&self) -> MetricsResult<f64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_gauge()
            .ok_or_else(|| MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: metric.value.metric_type(),
            })
    }

    /// Get the metric ID
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}
