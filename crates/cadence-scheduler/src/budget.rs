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

//! Translation of owed virtual time into a bounded number of ticks.
//!
//! Two ceilings give two degradation modes. Above the physics ceiling the
//! surplus is dropped for good; above the logic ceiling no time is lost but
//! fewer, longer ticks are run.

/// Compensates floating-point truncation at exact tick boundaries.
pub const TICK_EPSILON: f64 = 1e-6;

/// Per-frame tick ceilings. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickBudget {
    /// Owed ticks above this are dropped.
    pub max_physics_ticks: u32,
    /// Owed ticks above this are merged into stretched ticks.
    pub max_logic_ticks: u32,
}

impl TickBudget {
    /// Creates a budget, raising zero ceilings to 1.
    pub fn new(max_physics_ticks: u32, max_logic_ticks: u32) -> Self {
        Self {
            max_physics_ticks: max_physics_ticks.max(1),
            max_logic_ticks: max_logic_ticks.max(1),
        }
    }
}

/// What a single frame request should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickPlan {
    /// Ticks to run.
    pub ticks: u32,
    /// Nominal tick duration.
    pub nominal: f64,
    /// Duration of each tick to run; longer than `nominal` when stretched.
    pub duration: f64,
    /// Owed ticks discarded by the physics ceiling.
    pub dropped_ticks: u32,
    /// Virtual time to fold into `frame_time` without running stages.
    pub dropped_time: f64,
    /// Whether the host should render this frame.
    pub should_render: bool,
}

impl TickPlan {
    /// Resolves the plan for `delta` seconds of owed virtual time.
    ///
    /// A negative (or NaN) `delta` yields an idle plan: no ticks, no render,
    /// nothing dropped.
    ///
    /// ```
    /// use cadence_scheduler::{TickBudget, TickPlan};
    ///
    /// let plan = TickPlan::resolve(20.0 / 60.0, 60.0, 1.0, TickBudget::new(5, 5));
    /// assert_eq!(plan.ticks, 5);
    /// assert_eq!(plan.dropped_ticks, 15);
    /// assert!(plan.should_render);
    /// ```
    pub fn resolve(delta: f64, tick_rate: f64, time_scale: f64, budget: TickBudget) -> Self {
        let nominal = time_scale / tick_rate;
        let mut plan = TickPlan {
            ticks: 0,
            nominal,
            duration: nominal,
            dropped_ticks: 0,
            dropped_time: 0.0,
            should_render: false,
        };

        if !(delta >= 0.0) {
            return plan;
        }

        // f64 so that a huge stall cannot overflow the count.
        let mut owed = (delta * tick_rate / time_scale + TICK_EPSILON).floor();

        let max_physics = f64::from(budget.max_physics_ticks);
        if owed > max_physics {
            let surplus = owed - max_physics;
            plan.dropped_time = surplus * nominal;
            plan.dropped_ticks = surplus.min(f64::from(u32::MAX)) as u32;
            owed = max_physics;
        }

        let mut ticks = owed as u32;
        plan.should_render = ticks > 0;

        if ticks > budget.max_logic_ticks {
            plan.duration = f64::from(ticks) * nominal / f64::from(budget.max_logic_ticks);
            ticks = budget.max_logic_ticks;
        }

        plan.ticks = ticks;
        plan
    }

    /// Whether ticks were lengthened to respect the logic ceiling.
    pub fn is_stretched(&self) -> bool {
        self.duration > self.nominal
    }

    /// Virtual time covered by the ticks that will run.
    pub fn ticked_time(&self) -> f64 {
        f64::from(self.ticks) * self.duration
    }
}
