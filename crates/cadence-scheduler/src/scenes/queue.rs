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

use super::SceneId;

/// A replacement waiting for the end of the tick.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueuedReplace {
    pub id: SceneId,
    pub old_name: String,
    pub new_name: String,
}

/// Scene-list changes requested during a tick, applied at its end.
///
/// Drain order is fixed: replacements, removals, overlay additions, then
/// background additions.
#[derive(Debug, Default, Clone)]
pub struct PendingMutations {
    pub(crate) replace: Vec<QueuedReplace>,
    pub(crate) remove: Vec<(SceneId, String)>,
    pub(crate) add_overlay: Vec<String>,
    pub(crate) add_background: Vec<String>,
}

impl PendingMutations {
    /// Creates an empty set of queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.replace.is_empty()
            && self.remove.is_empty()
            && self.add_overlay.is_empty()
            && self.add_background.is_empty()
    }

    /// Total number of queued requests.
    pub fn len(&self) -> usize {
        self.replace.len() + self.remove.len() + self.add_overlay.len() + self.add_background.len()
    }

    /// Queues a replacement of the scene in slot `id`. Returns `false` if the
    /// slot already has a replacement queued; the first request is kept.
    pub fn queue_replace(&mut self, id: SceneId, old_name: &str, new_name: &str) -> bool {
        if self.is_replace_queued(id) {
            return false;
        }
        self.replace.push(QueuedReplace {
            id,
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });
        true
    }

    /// Queues a removal. Returns `false` if the slot was already queued.
    pub fn queue_remove(&mut self, id: SceneId, name: &str) -> bool {
        if self.is_removal_queued(id) {
            return false;
        }
        self.remove.push((id, name.to_string()));
        true
    }

    /// Queues an addition. Returns `false` if the name was already queued
    /// on either side.
    pub fn queue_add(&mut self, name: &str, overlay: bool) -> bool {
        if self.is_add_queued(name) {
            return false;
        }
        let queue = if overlay {
            &mut self.add_overlay
        } else {
            &mut self.add_background
        };
        queue.push(name.to_string());
        true
    }

    /// Whether the slot already has a replacement queued.
    pub fn is_replace_queued(&self, id: SceneId) -> bool {
        self.replace.iter().any(|queued| queued.id == id)
    }

    /// Whether the slot is already queued for removal.
    pub fn is_removal_queued(&self, id: SceneId) -> bool {
        self.remove.iter().any(|(queued, _)| *queued == id)
    }

    /// Whether `name` is already queued for addition.
    pub fn is_add_queued(&self, name: &str) -> bool {
        self.add_overlay.iter().any(|n| n == name) || self.add_background.iter().any(|n| n == name)
    }

    /// Moves every queued request out, leaving the queues empty.
    pub fn take(&mut self) -> PendingMutations {
        std::mem::take(self)
    }
}
