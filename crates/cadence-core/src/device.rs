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

//! Input and network devices advanced once per simulation tick.

/// A device whose state is latched per tick (keyboard, mouse, network).
///
/// The scheduler calls [`poll_next_frame`](DeviceInterface::poll_next_frame)
/// exactly once per tick, after every scene has run its stages, so that all
/// scenes in a tick observe the same device state.
pub trait DeviceInterface {
    /// Returns the device name for diagnostics.
    fn name(&self) -> &str;

    /// Rolls the device over to the next frame (e.g. clears "just pressed"
    /// flags, flushes received network messages).
    fn poll_next_frame(&mut self);
}
