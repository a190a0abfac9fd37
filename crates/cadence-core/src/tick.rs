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

//! Per-tick timing values handed to every stage.

/// Timing of a single simulation tick, as observed by the stages.
///
/// `frame_time` is the virtual clock *after* this tick's advance.
/// `nominal_duration` is `time_scale / tick_rate`; `duration` is the time this
/// tick actually covers, which is longer than nominal when the logic ceiling
/// forced the scheduler to stretch ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickStep {
    /// Virtual clock value at which the stages run.
    pub frame_time: f64,
    /// Nominal tick length derived from tick rate and time scale.
    pub nominal_duration: f64,
    /// Simulated length of this tick (nominal, or stretched).
    pub duration: f64,
    /// Zero-based position of the tick within the current frame.
    pub index: u32,
    /// Accumulated virtual time the current scene has spent suspended.
    pub suspended_delta: f64,
}

impl TickStep {
    /// Returns `true` if this tick covers more than the nominal duration.
    pub fn is_stretched(&self) -> bool {
        self.duration > self.nominal_duration
    }

    /// Scene-local time: the virtual clock minus the time the scene spent
    /// suspended.
    pub fn scene_time(&self) -> f64 {
        self.frame_time - self.suspended_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stretched_detection() {
        let mut step = TickStep {
            frame_time: 1.0,
            nominal_duration: 1.0 / 60.0,
            duration: 1.0 / 60.0,
            index: 0,
            suspended_delta: 0.0,
        };
        assert!(!step.is_stretched());

        step.duration = 8.0 / 5.0 / 60.0;
        assert!(step.is_stretched());
    }

    #[test]
    fn test_scene_time_excludes_suspension() {
        let step = TickStep {
            frame_time: 10.0,
            nominal_duration: 0.1,
            duration: 0.1,
            index: 2,
            suspended_delta: 3.5,
        };
        assert_relative_eq!(step.scene_time(), 6.5);
    }
}
