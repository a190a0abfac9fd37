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

//! # Cadence Core
//!
//! Foundational crate containing the traits, core types, and interface
//! contracts shared by the frame scheduler and the engine that drives it.
//!
//! Nothing in here makes scheduling decisions. It only describes the
//! collaborators the scheduler talks to: the time source it samples, the
//! scenes whose stages it sequences, the devices it polls, and the events
//! it reports.

#![warn(missing_docs)]

pub mod clock;
pub mod device;
pub mod scene;
pub mod telemetry;
pub mod tick;
pub mod utils;

pub use clock::{ManualClock, SystemClock, TimeSource};
pub use device::DeviceInterface;
pub use scene::{
    SceneError, SceneHandle, SceneProvider, SceneRequester, SceneResult, ScenegraphPass,
    StageContext, StageRunner,
};
pub use tick::TickStep;
pub use utils::timer::Stopwatch;
