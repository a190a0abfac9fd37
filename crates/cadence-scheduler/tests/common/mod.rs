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

//! Recording scenes, provider and devices that record every call the
//! scheduler makes into a shared log.

#![allow(dead_code)]

use cadence_core::{
    DeviceInterface, ManualClock, SceneHandle, SceneProvider, ScenegraphPass, StageContext,
    StageRunner, TickStep,
};
use cadence_scheduler::{FrameScheduler, SchedulerConfig};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub const NOMINAL_60HZ: f64 = 1.0 / 60.0;

/// A scene-list request a recorder scene issues from its logic stage.
#[derive(Debug, Clone)]
pub enum SceneAction {
    Add(String, bool),
    Remove(String),
    Replace(String, String),
}

/// State shared between the test and every recorder it hands out.
#[derive(Clone, Default)]
pub struct Recorder {
    pub log: Rc<RefCell<Vec<String>>>,
    pub steps: Rc<RefCell<Vec<(String, TickStep)>>>,
    pub actions: Rc<RefCell<HashMap<String, Vec<SceneAction>>>>,
    pub results: Rc<RefCell<Vec<bool>>>,
}

impl Recorder {
    pub fn push(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }

    pub fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    pub fn count(&self, entry: &str) -> usize {
        self.log.borrow().iter().filter(|e| *e == entry).count()
    }

    /// Schedules `action` to be issued by `scene` during its next logic stage.
    pub fn script(&self, scene: &str, action: SceneAction) {
        self.actions
            .borrow_mut()
            .entry(scene.to_string())
            .or_default()
            .push(action);
    }

    pub fn steps_of(&self, scene: &str) -> Vec<TickStep> {
        self.steps
            .borrow()
            .iter()
            .filter(|(name, _)| name == scene)
            .map(|(_, step)| *step)
            .collect()
    }
}

pub struct RecorderScene {
    name: String,
    suspended: bool,
    recorder: Recorder,
}

impl RecorderScene {
    fn stage(&self, stage: &str) {
        self.recorder.push(format!("{}:{stage}", self.name));
    }
}

impl StageRunner for RecorderScene {
    fn network(&mut self, ctx: &mut StageContext<'_>) {
        self.stage("network");
        self.recorder.steps.borrow_mut().push((self.name.clone(), *ctx.step()));
    }

    fn physics_end_frame(&mut self, _ctx: &mut StageContext<'_>) {
        self.stage("physics_end_frame");
    }

    fn logic_begin_frame(&mut self, ctx: &mut StageContext<'_>) {
        self.stage("logic_begin_frame");
        let actions = self
            .recorder
            .actions
            .borrow_mut()
            .remove(&self.name)
            .unwrap_or_default();
        for action in actions {
            let ok = match action {
                SceneAction::Add(name, overlay) => ctx.scenes().request_add(&name, overlay).is_ok(),
                SceneAction::Remove(name) => ctx.scenes().request_remove(&name).is_ok(),
                SceneAction::Replace(old, new) => {
                    ctx.scenes().request_replace(&old, &new).is_ok()
                }
            };
            self.recorder.results.borrow_mut().push(ok);
        }
    }

    fn update_scenegraph(&mut self, pass: ScenegraphPass, _ctx: &mut StageContext<'_>) {
        self.stage(&format!("scenegraph({pass:?})"));
    }

    fn logic_update_frame(&mut self, _ctx: &mut StageContext<'_>) {
        self.stage("logic_update_frame");
    }

    fn logic_end_frame(&mut self, _ctx: &mut StageContext<'_>) {
        self.stage("logic_end_frame");
    }

    fn update_lods(&mut self, _ctx: &mut StageContext<'_>) {
        self.stage("update_lods");
    }

    fn physics_begin_frame(&mut self, _ctx: &mut StageContext<'_>) {
        self.stage("physics_begin_frame");
    }

    fn physics_proceed(&mut self, _ctx: &mut StageContext<'_>) {
        self.stage("physics_proceed");
    }

    fn record_physics_frame(&mut self, frame: u64, _ctx: &mut StageContext<'_>) {
        self.stage(&format!("record({frame})"));
    }
}

impl SceneHandle for RecorderScene {
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

    fn update_activity(&mut self) {
        self.stage("update_activity");
    }
}

pub struct RecorderProvider {
    known: HashSet<String>,
    recorder: Recorder,
}

impl SceneProvider for RecorderProvider {
    fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    fn create(&mut self, name: &str) -> Option<Box<dyn SceneHandle>> {
        if !self.contains(name) {
            return None;
        }
        self.recorder.push(format!("create:{name}"));
        Some(Box::new(RecorderScene {
            name: name.to_string(),
            suspended: false,
            recorder: self.recorder.clone(),
        }))
    }

    fn release(&mut self, scene: Box<dyn SceneHandle>) {
        self.recorder.push(format!("release:{}", scene.name()));
    }

    fn merge_async_loads(&mut self) {
        self.recorder.push("merge".to_string());
    }

    fn finalize_async_loads(&mut self) {
        self.recorder.push("finalize".to_string());
    }
}

pub struct RecorderDevice {
    pub name: String,
    pub recorder: Recorder,
}

impl DeviceInterface for RecorderDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll_next_frame(&mut self) {
        self.recorder.push(format!("poll:{}", self.name));
    }
}

/// Builds a scheduler over a manual clock starting at zero. `known` lists
/// the scene names the provider can create.
pub fn setup(config: SchedulerConfig, known: &[&str]) -> (FrameScheduler, ManualClock, Recorder) {
    let clock = ManualClock::new(0.0);
    let recorder = Recorder::default();
    let provider = RecorderProvider {
        known: known.iter().map(|n| n.to_string()).collect(),
        recorder: recorder.clone(),
    };
    let scheduler = FrameScheduler::new(config, Box::new(clock.clone()), Box::new(provider));
    (scheduler, clock, recorder)
}

/// Like [`setup`], then adds `active` as overlays in order and starts.
pub fn started(
    config: SchedulerConfig,
    known: &[&str],
    active: &[&str],
) -> (FrameScheduler, ManualClock, Recorder) {
    let (mut scheduler, clock, recorder) = setup(config, known);
    for name in active {
        scheduler
            .request_add_scene(name, true)
            .expect("scene should queue");
    }
    scheduler.start();
    recorder.take_log();
    (scheduler, clock, recorder)
}

pub fn config_60hz(max_physics_ticks: u32, max_logic_ticks: u32) -> SchedulerConfig {
    SchedulerConfig {
        tick_rate: 60.0,
        max_physics_ticks,
        max_logic_ticks,
        ..Default::default()
    }
}
