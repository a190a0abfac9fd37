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

//! RAII timers that record into gauges.

use crate::metrics::GaugeHandle;
use cadence_core::Stopwatch;

/// Times a scope and writes the elapsed milliseconds into a gauge when
/// dropped, including on early return.
pub struct ScopedMetricTimer<'a> {
    stopwatch: Stopwatch,
    gauge: &'a GaugeHandle,
}

impl<'a> ScopedMetricTimer<'a> {
    /// Creates a new timer for the given gauge and starts it immediately.
    pub fn new(gauge: &'a GaugeHandle) -> Self {
        Self {
            stopwatch: Stopwatch::new(),
            gauge,
        }
    }
}

impl Drop for ScopedMetricTimer<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.gauge.set(self.stopwatch.elapsed_ms_f64()) {
            log::warn!("[ScopedMetricTimer] Failed to record metric: {e}");
        }
    }
}
