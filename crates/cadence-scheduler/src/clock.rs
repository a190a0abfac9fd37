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

//! Real-time and virtual clock bookkeeping.

use crate::config::ClockMode;

/// Every clock value the scheduler tracks, in seconds.
///
/// `clock_time` is the virtual clock after the latest advance; `frame_time`
/// is the virtual time already consumed by ticks (or dropped). Their
/// difference is what the next frame owes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockState {
    /// Latest sample of the time source.
    pub real_time: f64,
    /// Time source sample of the previous advance.
    pub previous_real_time: f64,
    /// Virtual clock.
    pub clock_time: f64,
    /// Virtual clock before the latest advance.
    pub previous_clock_time: f64,
    /// Virtual time consumed by ticks so far.
    pub frame_time: f64,
    /// Real to virtual time multiplier.
    pub time_scale: f64,
    /// Ticks per second of virtual time.
    pub tick_rate: f64,
    /// Advancement mode.
    pub mode: ClockMode,
}

impl ClockState {
    /// Creates a clock with every time value seeded at `now`.
    pub fn new(now: f64, tick_rate: f64, time_scale: f64, mode: ClockMode) -> Self {
        Self {
            real_time: now,
            previous_real_time: now,
            clock_time: now,
            previous_clock_time: now,
            frame_time: now,
            time_scale,
            tick_rate,
            mode,
        }
    }

    /// Re-seeds every time value at `now`.
    pub fn reset(&mut self, now: f64) {
        self.real_time = now;
        self.previous_real_time = now;
        self.clock_time = now;
        self.previous_clock_time = now;
        self.frame_time = now;
    }

    /// Nominal tick length in virtual seconds.
    pub fn nominal_tick(&self) -> f64 {
        self.time_scale / self.tick_rate
    }

    /// Advances the virtual clock for one frame request and returns the
    /// virtual time owed since `frame_time`.
    ///
    /// The real-time sample is taken in every mode so that switching modes
    /// never produces a spike of elapsed time.
    pub fn advance(&mut self, real_now: f64) -> f64 {
        self.real_time = real_now;
        self.previous_clock_time = self.clock_time;

        match self.mode {
            ClockMode::External => {}
            ClockMode::Fixed => self.clock_time += self.nominal_tick(),
            ClockMode::RealTime => {
                let elapsed = (real_now - self.previous_real_time).max(0.0);
                self.clock_time += elapsed * self.time_scale;
            }
        }

        self.previous_real_time = real_now;
        self.delta()
    }

    /// Virtual time not yet consumed by ticks. Negative if the clock was
    /// set behind `frame_time`.
    pub fn delta(&self) -> f64 {
        self.clock_time - self.frame_time
    }
}
