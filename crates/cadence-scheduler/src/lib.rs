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

//! # Cadence Scheduler
//!
//! The frame scheduler decouples the host's frame rate from a discrete
//! simulation tick rate. Each call to
//! [`FrameScheduler::advance_frame`](scheduler::FrameScheduler::advance_frame):
//!
//! 1. advances the virtual clock according to the [`ClockMode`],
//! 2. turns the elapsed virtual time into a bounded number of ticks
//!    ([`TickPlan`]), dropping time under extreme stalls and stretching
//!    ticks under moderate ones,
//! 3. runs every active scene through the stage pipeline once per tick,
//! 4. applies queued scene-list mutations at the end of each tick,
//! 5. reports whether the host should render.

#![warn(missing_docs)]

pub mod budget;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod scenes;
pub mod scheduler;

pub use budget::{TickBudget, TickPlan};
pub use clock::ClockState;
pub use config::{ClockMode, SchedulerConfig, DEFAULT_MAX_TICKS, DEFAULT_TICK_RATE};
pub use error::{SchedulerError, SchedulerResult};
pub use scenes::{PendingMutations, SceneEntry, SceneId, SceneSet};
pub use scheduler::{FrameReport, FrameScheduler};
