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

use super::queue::PendingMutations;
use super::SceneId;
use cadence_core::telemetry::SchedulerEvent;
use cadence_core::{SceneHandle, SceneProvider};
use std::collections::HashMap;

/// Name to slot lookup for the active list.
pub type SceneIndex = HashMap<String, SceneId>;

/// A live scene plus the bookkeeping the scheduler keeps for it.
pub struct SceneEntry {
    id: SceneId,
    name: String,
    scene: Box<dyn SceneHandle>,
    suspended_since: Option<f64>,
    suspended_delta: f64,
}

impl SceneEntry {
    fn new(id: SceneId, name: String, scene: Box<dyn SceneHandle>) -> Self {
        Self {
            id,
            name,
            scene,
            suspended_since: None,
            suspended_delta: 0.0,
        }
    }

    /// Slot identifier.
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Name the scene was requested under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The live scene.
    pub fn scene(&self) -> &dyn SceneHandle {
        self.scene.as_ref()
    }

    /// The live scene, mutably.
    pub fn scene_mut(&mut self) -> &mut dyn SceneHandle {
        self.scene.as_mut()
    }

    /// Virtual time at which the current suspension was first observed.
    pub fn suspended_since(&self) -> Option<f64> {
        self.suspended_since
    }

    /// Total virtual time spent suspended over completed suspensions.
    pub fn suspended_delta(&self) -> f64 {
        self.suspended_delta
    }

    /// Refreshes activity and suspension bookkeeping at the top of the
    /// scene's turn in a tick. Returns `true` if the stages should run.
    ///
    /// The suspension start is recorded once, however many ticks the scene
    /// stays suspended, and folded into `suspended_delta` on resume.
    pub fn refresh(&mut self, frame_time: f64) -> bool {
        self.scene.update_activity();

        if self.scene.is_suspended() {
            if self.suspended_since.is_none() {
                self.suspended_since = Some(frame_time);
            }
            return false;
        }

        if let Some(since) = self.suspended_since.take() {
            self.suspended_delta += frame_time - since;
            log::debug!(
                "Scene '{}' resumed after {:.4}s suspended",
                self.name,
                frame_time - since
            );
        }
        true
    }
}

impl std::fmt::Debug for SceneEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("suspended_since", &self.suspended_since)
            .field("suspended_delta", &self.suspended_delta)
            .finish()
    }
}

/// Ordered list of active scenes. Background scenes sit at the front,
/// overlays at the back; stages run front to back.
#[derive(Debug, Default)]
pub struct SceneSet {
    entries: Vec<SceneEntry>,
    index: SceneIndex,
    positions: HashMap<SceneId, usize>,
    next_id: u64,
}

impl SceneSet {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active scenes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no scene is active.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a scene with this name is active.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Slot of the named scene.
    pub fn id_of(&self, name: &str) -> Option<SceneId> {
        self.index.get(name).copied()
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &str) -> Option<&SceneEntry> {
        let position = self.position(self.id_of(name)?)?;
        self.entries.get(position)
    }

    /// Looks up an entry by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneEntry> {
        let position = self.position(self.id_of(name)?)?;
        self.entries.get_mut(position)
    }

    /// Iterates entries in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneEntry> {
        self.entries.iter()
    }

    /// Name index of the active list.
    pub fn index(&self) -> &SceneIndex {
        &self.index
    }

    /// Splits the set into its read-only name index and its mutable entries,
    /// so stages can validate requests while the scenes are being stepped.
    pub fn parts_mut(&mut self) -> (&SceneIndex, &mut [SceneEntry]) {
        (&self.index, &mut self.entries)
    }

    fn position(&self, id: SceneId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    // Positions shift on front insertion and removal.
    fn reindex_positions(&mut self) {
        self.positions.clear();
        self.positions
            .extend(self.entries.iter().enumerate().map(|(i, e)| (e.id, i)));
    }

    fn allocate(&mut self, name: &str) -> SceneId {
        let id = SceneId(self.next_id);
        self.next_id += 1;
        self.index.insert(name.to_string(), id);
        id
    }

    /// Appends a scene at the end of the list (overlay).
    pub fn push_back(&mut self, name: &str, scene: Box<dyn SceneHandle>) -> SceneId {
        let id = self.allocate(name);
        self.positions.insert(id, self.entries.len());
        self.entries.push(SceneEntry::new(id, name.to_string(), scene));
        id
    }

    /// Inserts a scene at the front of the list (background).
    pub fn push_front(&mut self, name: &str, scene: Box<dyn SceneHandle>) -> SceneId {
        let id = self.allocate(name);
        self.entries.insert(0, SceneEntry::new(id, name.to_string(), scene));
        self.reindex_positions();
        id
    }

    /// Swaps the scene in slot `id`, keeping its position and id. Returns the
    /// previous name and scene.
    pub fn replace(
        &mut self,
        id: SceneId,
        name: &str,
        scene: Box<dyn SceneHandle>,
    ) -> Option<(String, Box<dyn SceneHandle>)> {
        let position = self.position(id)?;
        let entry = &mut self.entries[position];
        let old_name = std::mem::replace(&mut entry.name, name.to_string());
        let old_scene = std::mem::replace(&mut entry.scene, scene);
        entry.suspended_since = None;
        entry.suspended_delta = 0.0;

        self.index.remove(&old_name);
        self.index.insert(name.to_string(), id);
        Some((old_name, old_scene))
    }

    /// Removes the scene in slot `id`, preserving the order of the others.
    pub fn remove(&mut self, id: SceneId) -> Option<SceneEntry> {
        let position = self.position(id)?;
        let entry = self.entries.remove(position);
        self.index.remove(&entry.name);
        self.reindex_positions();
        Some(entry)
    }

    /// Empties the list, returning the scenes in execution order.
    pub fn drain(&mut self) -> Vec<Box<dyn SceneHandle>> {
        self.index.clear();
        self.positions.clear();
        self.entries.drain(..).map(|e| e.scene).collect()
    }

    /// Applies every queued mutation: replacements, removals, overlay
    /// additions, then background additions.
    ///
    /// Requests that cannot be honoured are dropped with a warning and
    /// reported as [`SchedulerEvent::SceneRejected`]. Returns the number of
    /// mutations applied.
    pub fn apply(
        &mut self,
        pending: PendingMutations,
        provider: &mut dyn SceneProvider,
        emit: &mut dyn FnMut(SchedulerEvent),
    ) -> usize {
        let mut applied = 0;

        for request in pending.replace {
            if self.position(request.id).is_none() {
                log::debug!("Replace of '{}' skipped: slot is gone", request.old_name);
                continue;
            }
            if let Some(existing) = self.id_of(&request.new_name) {
                if existing != request.id {
                    log::warn!(
                        "Cannot replace '{}' with '{}': '{}' is already active",
                        request.old_name,
                        request.new_name,
                        request.new_name
                    );
                    emit(SchedulerEvent::SceneRejected {
                        name: request.new_name,
                        reason: "already active".to_string(),
                    });
                    continue;
                }
            }
            let Some(scene) = provider.create(&request.new_name) else {
                log::warn!("Scene provider could not create '{}'", request.new_name);
                emit(SchedulerEvent::SceneRejected {
                    name: request.new_name,
                    reason: "not loadable".to_string(),
                });
                continue;
            };
            if let Some((old_name, old_scene)) = self.replace(request.id, &request.new_name, scene) {
                provider.release(old_scene);
                log::info!("Scene '{}' replaced by '{}'", old_name, request.new_name);
                emit(SchedulerEvent::SceneReplaced {
                    old: old_name,
                    new: request.new_name,
                });
                applied += 1;
            }
        }

        for (id, requested_name) in pending.remove {
            match self.remove(id) {
                Some(entry) => {
                    log::info!("Scene '{}' removed", entry.name);
                    emit(SchedulerEvent::SceneRemoved {
                        name: entry.name.clone(),
                    });
                    provider.release(entry.scene);
                    applied += 1;
                }
                None => log::debug!("Removal of '{requested_name}' skipped: slot is gone"),
            }
        }

        for name in pending.add_overlay {
            if self.add(&name, true, provider, emit) {
                applied += 1;
            }
        }
        for name in pending.add_background {
            if self.add(&name, false, provider, emit) {
                applied += 1;
            }
        }

        applied
    }

    fn add(
        &mut self,
        name: &str,
        overlay: bool,
        provider: &mut dyn SceneProvider,
        emit: &mut dyn FnMut(SchedulerEvent),
    ) -> bool {
        if self.contains(name) {
            log::warn!("Scene '{name}' is already active, add ignored");
            emit(SchedulerEvent::SceneRejected {
                name: name.to_string(),
                reason: "already active".to_string(),
            });
            return false;
        }
        let Some(scene) = provider.create(name) else {
            log::warn!("Scene provider could not create '{name}'");
            emit(SchedulerEvent::SceneRejected {
                name: name.to_string(),
                reason: "not loadable".to_string(),
            });
            return false;
        };

        if overlay {
            self.push_back(name, scene);
        } else {
            self.push_front(name, scene);
        }
        log::info!(
            "Scene '{name}' added as {}",
            if overlay { "overlay" } else { "background" }
        );
        emit(SchedulerEvent::SceneAdded {
            name: name.to_string(),
            overlay,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::StageRunner;
    use std::collections::HashSet;

    struct StubScene {
        name: String,
        suspended: bool,
    }

    impl StageRunner for StubScene {}

    impl SceneHandle for StubScene {
        fn name(&self) -> &str {
            &self.name
        }
        fn is_suspended(&self) -> bool {
            self.suspended
        }
        fn suspend(&mut self) {
            self.suspended = true;
        }
        fn resume(&mut self) {
            self.suspended = false;
        }
    }

    #[derive(Default)]
    struct StubProvider {
        known: HashSet<String>,
        released: Vec<String>,
    }

    impl StubProvider {
        fn with(names: &[&str]) -> Self {
            Self {
                known: names.iter().map(|n| n.to_string()).collect(),
                released: Vec::new(),
            }
        }
    }

    impl SceneProvider for StubProvider {
        fn contains(&self, name: &str) -> bool {
            self.known.contains(name)
        }
        fn create(&mut self, name: &str) -> Option<Box<dyn SceneHandle>> {
            self.contains(name).then(|| {
                Box::new(StubScene {
                    name: name.to_string(),
                    suspended: false,
                }) as Box<dyn SceneHandle>
            })
        }
        fn release(&mut self, scene: Box<dyn SceneHandle>) {
            self.released.push(scene.name().to_string());
        }
    }

    fn stub(name: &str) -> Box<dyn SceneHandle> {
        Box::new(StubScene {
            name: name.to_string(),
            suspended: false,
        })
    }

    #[test]
    fn test_front_and_back_ordering() {
        let mut set = SceneSet::new();
        set.push_back("level", stub("level"));
        set.push_back("hud", stub("hud"));
        set.push_front("sky", stub("sky"));
        assert_eq!(set.names(), vec!["sky", "level", "hud"]);
    }

    #[test]
    fn test_replace_keeps_slot() {
        let mut set = SceneSet::new();
        set.push_back("menu", stub("menu"));
        let id = set.push_back("hud", stub("hud"));
        let (old, _) = set.replace(id, "score", stub("score")).unwrap();

        assert_eq!(old, "hud");
        assert_eq!(set.names(), vec!["menu", "score"]);
        assert_eq!(set.id_of("score"), Some(id));
        assert!(!set.contains("hud"));
    }

    #[test]
    fn test_apply_drains_in_order() {
        let mut set = SceneSet::new();
        let mut provider = StubProvider::with(&["a", "b", "c", "hud", "sky", "far"]);
        let a = set.push_back("a", stub("a"));
        let c = set.push_back("c", stub("c"));

        let mut pending = PendingMutations::new();
        pending.queue_add("sky", false);
        pending.queue_add("hud", true);
        pending.queue_add("far", false);
        pending.queue_remove(c, "c");
        pending.queue_replace(a, "a", "b");

        let mut events = Vec::new();
        let applied = set.apply(pending, &mut provider, &mut |e| events.push(e));

        assert_eq!(applied, 5);
        assert_eq!(set.names(), vec!["far", "sky", "b", "hud"]);
        assert_eq!(provider.released, vec!["a", "c"]);
        assert_eq!(
            events[0],
            SchedulerEvent::SceneReplaced {
                old: "a".into(),
                new: "b".into()
            }
        );
        assert_eq!(events[1], SchedulerEvent::SceneRemoved { name: "c".into() });
    }

    #[test]
    fn test_apply_rejects_unloadable_and_duplicate_adds() {
        let mut set = SceneSet::new();
        let mut provider = StubProvider::with(&["level"]);
        set.push_back("level", stub("level"));

        let mut pending = PendingMutations::new();
        pending.queue_add("level", true);
        pending.queue_add("ghost", true);

        let mut events = Vec::new();
        assert_eq!(set.apply(pending, &mut provider, &mut |e| events.push(e)), 0);
        assert_eq!(set.len(), 1);
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, SchedulerEvent::SceneRejected { .. })));
    }

    #[test]
    fn test_suspension_marker_recorded_once() {
        let mut set = SceneSet::new();
        set.push_back("level", stub("level"));
        let entry = set.get_mut("level").unwrap();

        assert!(entry.refresh(1.0));
        entry.scene_mut().suspend();
        assert!(!entry.refresh(2.0));
        assert!(!entry.refresh(3.0));
        assert!(!entry.refresh(4.0));
        assert_eq!(entry.suspended_since(), Some(2.0));

        entry.scene_mut().resume();
        assert!(entry.refresh(5.0));
        assert_eq!(entry.suspended_since(), None);
        assert_eq!(entry.suspended_delta(), 3.0);

        assert!(entry.refresh(6.0));
        assert_eq!(entry.suspended_delta(), 3.0);
    }

    #[test]
    fn test_lookup_follows_shifted_positions() {
        let mut set = SceneSet::new();
        set.push_back("level", stub("level"));
        let hud = set.push_back("hud", stub("hud"));
        set.push_front("sky", stub("sky"));

        assert_eq!(set.get("hud").map(SceneEntry::id), Some(hud));
        assert_eq!(set.get("level").map(SceneEntry::name), Some("level"));

        set.remove(set.id_of("sky").unwrap());
        assert_eq!(set.get("hud").map(SceneEntry::id), Some(hud));
        assert_eq!(set.get("level").map(SceneEntry::name), Some("level"));
        assert!(set.get("sky").is_none());

        set.replace(hud, "score", stub("score"));
        assert_eq!(set.get_mut("score").map(|e| e.id()), Some(hud));
    }

    #[test]
    fn test_drain_empties_index() {
        let mut set = SceneSet::new();
        set.push_back("a", stub("a"));
        set.push_back("b", stub("b"));
        let scenes = set.drain();
        assert_eq!(scenes.len(), 2);
        assert!(set.is_empty());
        assert!(!set.contains("a"));
    }
}
