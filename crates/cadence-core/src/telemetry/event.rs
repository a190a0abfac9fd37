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

//! Discrete events emitted by the scheduler.

/// Something noteworthy the scheduler decided during a frame.
///
/// Events are fire-and-forget: the scheduler never waits on an observer and
/// drops events when the channel is full.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// Owed ticks exceeded the physics ceiling and the surplus was discarded.
    TicksDropped {
        /// Number of ticks that will never run.
        count: u32,
        /// Virtual time folded into the frame clock without running stages.
        skipped_time: f64,
    },
    /// Owed ticks exceeded the logic ceiling and ticks were lengthened.
    TicksStretched {
        /// Ticks actually run this frame.
        ticks: u32,
        /// Stretched duration of each tick.
        duration: f64,
        /// Nominal tick duration.
        nominal: f64,
    },
    /// A scene joined the active list.
    SceneAdded {
        /// Scene name.
        name: String,
        /// `true` if appended as an overlay, `false` if prepended as background.
        overlay: bool,
    },
    /// A scene left the active list.
    SceneRemoved {
        /// Scene name.
        name: String,
    },
    /// A scene was swapped in place.
    SceneReplaced {
        /// Name of the scene that left.
        old: String,
        /// Name of the scene that took its slot.
        new: String,
    },
    /// A queued scene request could not be honoured when applied.
    SceneRejected {
        /// Scene name.
        name: String,
        /// Human-readable reason.
        reason: String,
    },
    /// The virtual clock was re-seeded from the time source.
    ClockReset {
        /// New clock value in seconds.
        time: f64,
    },
}

impl SchedulerEvent {
    /// Short, stable label used as a metric name.
    pub fn label(&self) -> &'static str {
        match self {
            SchedulerEvent::TicksDropped { .. } => "ticks_dropped",
            SchedulerEvent::TicksStretched { .. } => "ticks_stretched",
            SchedulerEvent::SceneAdded { .. } => "scene_added",
            SchedulerEvent::SceneRemoved { .. } => "scene_removed",
            SchedulerEvent::SceneReplaced { .. } => "scene_replaced",
            SchedulerEvent::SceneRejected { .. } => "scene_rejected",
            SchedulerEvent::ClockReset { .. } => "clock_reset",
        }
    }
}
