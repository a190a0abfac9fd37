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

//! Abstract definitions for scheduler metrics.

use std::fmt::{Debug, Display};
use std::time::Instant;
use thiserror::Error;

/// A unique, structured identifier for a metric.
///
/// A `MetricId` is composed of a namespace, a name, and a set of key-value labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    /// The broad category of the metric (e.g., "scheduler", "scenes").
    pub namespace: String,
    /// The specific name of the metric (e.g., "ticks_run").
    pub name: String,
    /// Optional, sorted key-value pairs for dimensional filtering.
    pub labels: Vec<(String, String)>,
}

impl MetricId {
    /// Creates a new `MetricId` with a namespace and a name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            labels: Vec::new(),
        }
    }

    /// Adds a dimensional label, keeping labels sorted by key.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self.labels.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.labels.is_empty() {
            write!(f, "{}:{}", self.namespace, self.name)
        } else {
            let labels = self
                .labels
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "{}:{}[{}]", self.namespace, self.name, labels)
        }
    }
}

/// The fundamental type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// A value that only ever increases (e.g., total ticks run).
    Counter,
    /// A value that can go up or down (e.g., active scene count).
    Gauge,
}

/// A metric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// A 64-bit unsigned integer for counters.
    Counter(u64),
    /// A 64-bit float for gauges.
    Gauge(f64),
}

impl MetricValue {
    /// Returns the [`MetricType`] corresponding to this value.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Counter(_) => MetricType::Counter,
            MetricValue::Gauge(_) => MetricType::Gauge,
        }
    }

    /// Returns the value as an `f64`.
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Counter(v) => *v as f64,
            MetricValue::Gauge(v) => *v,
        }
    }

    /// Returns the value as a `u64` if it is a `Counter`.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is a `Gauge`.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }
}

/// A metric entry: its value plus descriptive metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric's unique identifier.
    pub id: MetricId,
    /// A human-readable description of what the metric measures.
    pub description: String,
    /// The unit of measurement (e.g., "ms", "ticks").
    pub unit: String,
    /// The current value.
    pub value: MetricValue,
    /// When the value last changed.
    pub last_updated: Instant,
}

impl Metric {
    /// Creates a counter starting at zero.
    pub fn new_counter(id: MetricId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            unit: "count".into(),
            value: MetricValue::Counter(0),
            last_updated: Instant::now(),
        }
    }

    /// Creates a gauge starting at zero.
    pub fn new_gauge(id: MetricId, description: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            unit: unit.into(),
            value: MetricValue::Gauge(0.0),
            last_updated: Instant::now(),
        }
    }

    /// Returns the metric's type.
    pub fn metric_type(&self) -> MetricType {
        self.value.metric_type()
    }
}

/// A specialized `Result` type for metric-related operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// An error that can occur within the metrics system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// The requested metric was not found in the registry.
    #[error("Metric not found: {0}")]
    MetricNotFound(MetricId),
    /// An operation was attempted on a metric of the wrong type.
    #[error("Type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        /// The expected metric type for the operation.
        expected: MetricType,
        /// The actual metric type that was found.
        found: MetricType,
    },
    /// The backend storage could not be accessed.
    #[error("Storage error: {0}")]
    StorageError(String),
}
