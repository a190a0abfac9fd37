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

//! Request handle given to stages and used by the scheduler's own API.

use crate::scenes::{PendingMutations, SceneIndex};
use cadence_core::{SceneError, SceneProvider, SceneRequester, SceneResult};

/// Validates scene-list requests against the list as it stood at the start
/// of the tick and queues them for the end of the tick.
pub struct SceneRequests<'a> {
    index: &'a SceneIndex,
    provider: &'a dyn SceneProvider,
    pending: &'a mut PendingMutations,
}

impl<'a> SceneRequests<'a> {
    /// Creates a request handle over the given list index and queues.
    pub fn new(
        index: &'a SceneIndex,
        provider: &'a dyn SceneProvider,
        pending: &'a mut PendingMutations,
    ) -> Self {
        Self {
            index,
            provider,
            pending,
        }
    }
}

impl SceneRequester for SceneRequests<'_> {
    fn request_add(&mut self, name: &str, overlay: bool) -> SceneResult<()> {
        if self.index.contains_key(name) {
            log::warn!("Scene '{name}' is already active");
            return Err(SceneError::AlreadyExists(name.to_string()));
        }
        if !self.pending.queue_add(name, overlay) {
            log::warn!("Scene '{name}' is already queued for addition");
        }
        Ok(())
    }

    fn request_remove(&mut self, name: &str) -> SceneResult<()> {
        let Some(&id) = self.index.get(name) else {
            log::warn!("Cannot remove '{name}': no such active scene");
            return Err(SceneError::NotFound(name.to_string()));
        };
        if !self.pending.queue_remove(id, name) {
            log::debug!("Scene '{name}' is already queued for removal");
        }
        Ok(())
    }

    fn request_replace(&mut self, old_name: &str, new_name: &str) -> SceneResult<()> {
        if !self.provider.contains(new_name) {
            log::warn!("Cannot replace '{old_name}': '{new_name}' is not loadable");
            return Err(SceneError::NotLoadable(new_name.to_string()));
        }
        let Some(&id) = self.index.get(old_name) else {
            log::warn!("Cannot replace '{old_name}': no such active scene");
            return Err(SceneError::NotFound(old_name.to_string()));
        };
        if !self.pending.queue_replace(id, old_name, new_name) {
            log::warn!("Scene '{old_name}' already has a replacement queued, '{new_name}' ignored");
        }
        Ok(())
    }
}
