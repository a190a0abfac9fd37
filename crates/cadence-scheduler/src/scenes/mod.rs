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

//! The active scene list and the mutations queued against it.
//!
//! Scenes are addressed by a [`SceneId`] that stays stable for the lifetime
//! of a list slot. A name index resolves requests without scanning the list.

mod queue;
mod set;

pub use queue::PendingMutations;
pub use set::{SceneEntry, SceneIndex, SceneSet};

/// Stable identifier of a slot in the active scene list.
///
/// A replacement keeps the slot, and therefore the id, of the scene it
/// replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub(crate) u64);

impl SceneId {
    /// Raw numeric value, for logging.
    pub fn raw(&self) -> u64 {
        self.0
    }
}
