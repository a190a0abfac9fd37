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

//! Per-category wall-time profiling of the frame loop.
//!
//! The profiler behaves like a stopwatch with several lanes: switching to a
//! category closes the interval of the previous one. Per-frame totals are
//! kept over a rolling window so the host can show smoothed fractions and an
//! average frame rate.

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

/// Buckets that wall time is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeCategory {
    /// Network stage.
    Network,
    /// Physics end/begin frame and integration.
    Physics,
    /// Sensors, controllers, actuators, device polling.
    Logic,
    /// Scenegraph passes and LOD.
    Scenegraph,
    /// Scheduler bookkeeping, async merges, scene-list mutations.
    Services,
    /// Everything between two `advance_frame` calls (rendering, host work).
    Outside,
}

impl TimeCategory {
    /// Every category, in display order.
    pub const ALL: [TimeCategory; 6] = [
        TimeCategory::Network,
        TimeCategory::Physics,
        TimeCategory::Logic,
        TimeCategory::Scenegraph,
        TimeCategory::Services,
        TimeCategory::Outside,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeCategory::Network => "Network",
            TimeCategory::Physics => "Physics",
            TimeCategory::Logic => "Logic",
            TimeCategory::Scenegraph => "Scenegraph",
            TimeCategory::Services => "Services",
            TimeCategory::Outside => "Outside",
        };
        f.write_str(label)
    }
}

const CATEGORY_COUNT: usize = TimeCategory::ALL.len();

/// Rolling per-category frame profiler.
#[derive(Debug, Clone)]
pub struct TimeCategoryProfiler {
    window: usize,
    current: Option<(TimeCategory, Instant)>,
    frame_totals: [f64; CATEGORY_COUNT],
    history: VecDeque<[f64; CATEGORY_COUNT]>,
}

impl TimeCategoryProfiler {
    /// Creates a profiler averaging over the last `window` frames (at least 1).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            current: None,
            frame_totals: [0.0; CATEGORY_COUNT],
            history: VecDeque::with_capacity(window),
        }
    }

    /// Starts charging time to `category` from now on.
    pub fn start(&mut self, category: TimeCategory) {
        self.start_at(category, Instant::now());
    }

    /// Starts charging time to `category` from `now` on.
    pub fn start_at(&mut self, category: TimeCategory, now: Instant) {
        self.close_interval(now);
        self.current = Some((category, now));
    }

    /// Closes the current frame and pushes its totals into the window.
    pub fn end_frame(&mut self) {
        self.end_frame_at(Instant::now());
    }

    /// Closes the current frame at `now`. The running category keeps running.
    ///
    /// Does nothing before the first [`start`](Self::start).
    pub fn end_frame_at(&mut self, now: Instant) {
        if self.current.is_none() {
            return;
        }
        self.close_interval(now);
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(self.frame_totals);
        self.frame_totals = [0.0; CATEGORY_COUNT];
    }

    fn close_interval(&mut self, now: Instant) {
        if let Some((category, since)) = self.current {
            let elapsed = now.saturating_duration_since(since).as_secs_f64();
            self.frame_totals[category.index()] += elapsed;
            self.current = Some((category, now));
        }
    }

    /// Number of frames currently in the window.
    pub fn frames_recorded(&self) -> usize {
        self.history.len()
    }

    /// Average seconds per frame charged to `category`.
    pub fn average(&self, category: TimeCategory) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let total: f64 = self.history.iter().map(|f| f[category.index()]).sum();
        total / self.history.len() as f64
    }

    /// Average seconds per frame over all categories.
    pub fn average_frame_time(&self) -> f64 {
        TimeCategory::ALL.iter().map(|c| self.average(*c)).sum()
    }

    /// Share of the average frame spent in each category.
    ///
    /// All zeros if no time has been recorded yet.
    pub fn average_fractions(&self) -> Vec<(TimeCategory, f64)> {
        let frame = self.average_frame_time();
        TimeCategory::ALL
            .iter()
            .map(|c| {
                let fraction = if frame > 0.0 {
                    self.average(*c) / frame
                } else {
                    0.0
                };
                (*c, fraction)
            })
            .collect()
    }

    /// Frames per second derived from the average frame time.
    pub fn average_frame_rate(&self) -> f64 {
        let frame = self.average_frame_time();
        if frame > 0.0 {
            1.0 / frame
        } else {
            0.0
        }
    }
}

impl Default for TimeCategoryProfiler {
    fn default() -> Self {
        Self::new(25)
    }
}
