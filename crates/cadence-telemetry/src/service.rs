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

//! Service that ingests scheduler events and owns the metrics registry.

use crate::metrics::MetricsRegistry;
use cadence_core::telemetry::SchedulerEvent;
use crossbeam_channel::{Receiver, Sender};
use std::time::{Duration, Instant};

/// Namespace under which ingested events are counted.
pub const EVENTS_NAMESPACE: &str = "events";

/// Collects [`SchedulerEvent`]s into counters and periodically reports.
#[derive(Debug)]
pub struct TelemetryService {
    metrics: MetricsRegistry,
    events: Receiver<SchedulerEvent>,
    last_update: Instant,
    update_interval: Duration,
}

impl TelemetryService {
    /// Creates the service and the sender the scheduler should emit into.
    ///
    /// At most `buffer_size` events are buffered between two [`tick`](Self::tick)s;
    /// the scheduler drops further events rather than block.
    pub fn new(update_interval: Duration, buffer_size: usize) -> (Self, Sender<SchedulerEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(buffer_size);
        let service = Self {
            metrics: MetricsRegistry::new(),
            events: rx,
            last_update: Instant::now(),
            update_interval,
        };
        (service, tx)
    }

    /// Drains pending events. Returns `true` once per `update_interval`,
    /// signalling that a summary is due.
    pub fn tick(&mut self) -> bool {
        while let Ok(event) = self.events.try_recv() {
            self.ingest(&event);
        }

        if self.last_update.elapsed() >= self.update_interval {
            self.last_update = Instant::now();
            true
        } else {
            false
        }
    }

    fn ingest(&self, event: &SchedulerEvent) {
        let amount = match event {
            SchedulerEvent::TicksDropped { count, skipped_time } => {
                log::debug!("Telemetry: {count} ticks dropped ({skipped_time:.4}s skipped)");
                u64::from(*count)
            }
            SchedulerEvent::SceneRejected { name, reason } => {
                log::debug!("Telemetry: scene '{name}' rejected: {reason}");
                1
            }
            other => {
                log::trace!("Telemetry: {other:?}");
                1
            }
        };

        match self
            .metrics
            .register_counter(EVENTS_NAMESPACE, event.label(), "Scheduler events")
        {
            Ok(counter) => {
                if let Err(e) = counter.increment_by(amount) {
                    log::warn!("Telemetry: failed to count {}: {e}", event.label());
                }
            }
            Err(e) => log::warn!("Telemetry: failed to register {}: {e}", event.label()),
        }
    }

    /// Logs every metric in the registry, grouped by namespace.
    pub fn log_summary(&self) {
        log::info!("--- Telemetry Summary ---");
        for namespace in ["scheduler", "scenes", EVENTS_NAMESPACE] {
            for metric in self.metrics.get_namespace_metrics(namespace) {
                log::info!(
                    "  {}: {} {}",
                    metric.id,
                    metric.value.as_f64(),
                    metric.unit
                );
            }
        }
        log::info!("-------------------------");
    }

    /// Returns the number of events of the given label ingested so far.
    pub fn event_count(&self, label: &str) -> u64 {
        self.metrics
            .get_metric(&cadence_core::telemetry::MetricId::new(EVENTS_NAMESPACE, label))
            .ok()
            .and_then(|m| m.value.as_counter())
            .unwrap_or(0)
    }

    /// Returns a reference to the metrics registry.
    pub fn metrics_registry(&self) -> &MetricsRegistry {
        &self.metrics
    }
}
