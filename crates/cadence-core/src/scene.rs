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

//! # Scene & Stage Contracts
//!
//! The scheduler decides *when* and *how many times* a scene is stepped;
//! the engine decides *what* a step does. This module is the seam between
//! the two.
//!
//! ## Per-tick stage order
//!
//! For every active scene, each tick runs:
//!
//! ```text
//! network
//!   -> physics_end_frame
//!   -> logic_begin_frame        (sensors + controllers)
//!   -> update_scenegraph(AfterLogic)
//!   -> logic_update_frame       (actuators)
//!   -> logic_end_frame
//!   -> update_scenegraph(AfterActuators)
//!   -> update_lods
//!   -> physics_begin_frame
//!   -> physics_proceed
//!   -> update_scenegraph(AfterPhysics)
//! ```
//!
//! Every call is synchronous. A stage may fan work out to a worker pool
//! internally, but it must not return before that work is done.

use crate::tick::TickStep;
use thiserror::Error;

/// Recoverable errors raised by scene-list requests.
///
/// None of these are fatal: the request is simply dropped and the scheduler
/// state is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The named scene is not in the active scene list.
    #[error("scene '{0}' does not exist")]
    NotFound(String),

    /// The named scene is already in the active scene list.
    #[error("scene '{0}' already exists")]
    AlreadyExists(String),

    /// The provider has no definition for the named scene.
    #[error("scene '{0}' could not be found by the scene provider")]
    NotLoadable(String),
}

/// Result alias for scene-list requests.
pub type SceneResult<T> = Result<T, SceneError>;

/// Port through which stages (and the host) request scene-list changes.
///
/// Requests are queued; the list itself only changes at the end of a tick.
pub trait SceneRequester {
    /// Queues a scene to be created and added. Overlay scenes go to the end
    /// of the list, background scenes to the front.
    fn request_add(&mut self, name: &str, overlay: bool) -> SceneResult<()>;

    /// Queues an active scene for removal.
    fn request_remove(&mut self, name: &str) -> SceneResult<()>;

    /// Queues an in-place replacement. Fails immediately if `new_name` has
    /// no loadable definition.
    fn request_replace(&mut self, old_name: &str, new_name: &str) -> SceneResult<()>;
}

/// Everything a stage can see and do during one tick of one scene.
pub struct StageContext<'a> {
    step: TickStep,
    requests: &'a mut dyn SceneRequester,
}

impl<'a> StageContext<'a> {
    /// Creates a context for one scene's turn in a tick.
    pub fn new(step: TickStep, requests: &'a mut dyn SceneRequester) -> Self {
        Self { step, requests }
    }

    /// Timing of the current tick.
    pub fn step(&self) -> &TickStep {
        &self.step
    }

    /// Virtual clock value for the current tick.
    pub fn frame_time(&self) -> f64 {
        self.step.frame_time
    }

    /// Handle for queuing scene-list changes.
    pub fn scenes(&mut self) -> &mut dyn SceneRequester {
        &mut *self.requests
    }
}

/// Identifies which of the three scenegraph passes of a tick is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenegraphPass {
    /// After controllers ran; they may have moved local transforms.
    AfterLogic,
    /// After actuators ran; they move transforms independently of controllers.
    AfterActuators,
    /// After the physics integration mapped bodies back onto nodes.
    AfterPhysics,
}

/// One method per simulation stage.
///
/// All methods default to no-ops so an implementation only overrides the
/// stages it participates in.
#[allow(unused_variables)]
pub trait StageRunner {
    /// Network stage: process replicated state for this tick.
    fn network(&mut self, ctx: &mut StageContext<'_>) {}

    /// Closes the previous physics frame.
    fn physics_end_frame(&mut self, ctx: &mut StageContext<'_>) {}

    /// Sensors and controllers.
    fn logic_begin_frame(&mut self, ctx: &mut StageContext<'_>) {}

    /// Propagates transforms through the scenegraph.
    fn update_scenegraph(&mut self, pass: ScenegraphPass, ctx: &mut StageContext<'_>) {}

    /// Actuators.
    fn logic_update_frame(&mut self, ctx: &mut StageContext<'_>) {}

    /// Per-tick logic cleanup.
    fn logic_end_frame(&mut self, ctx: &mut StageContext<'_>) {}

    /// Level-of-detail selection.
    fn update_lods(&mut self, ctx: &mut StageContext<'_>) {}

    /// Opens the next physics frame.
    fn physics_begin_frame(&mut self, ctx: &mut StageContext<'_>) {}

    /// Integrates physics over the tick.
    ///
    /// `ctx.step().duration` is the real simulated time per step (possibly
    /// stretched) while `ctx.step().nominal_duration` is the configured rate.
    fn physics_proceed(&mut self, ctx: &mut StageContext<'_>) {}

    /// Called after the physics step while record mode is on, with the
    /// running record frame number.
    fn record_physics_frame(&mut self, frame: u64, ctx: &mut StageContext<'_>) {}
}

/// A live scene as seen by the scheduler.
pub trait SceneHandle: StageRunner {
    /// Unique scene name.
    fn name(&self) -> &str;

    /// Whether the whole scene is currently suspended.
    fn is_suspended(&self) -> bool;

    /// Suspends logic and physics for the whole scene.
    fn suspend(&mut self);

    /// Resumes a suspended scene.
    fn resume(&mut self);

    /// Refreshes per-object activity before the suspension check.
    fn update_activity(&mut self) {}
}

/// Resolves scene names into live scenes and owns their teardown.
pub trait SceneProvider {
    /// Returns `true` if a loadable definition exists for `name`.
    fn contains(&self, name: &str) -> bool;

    /// Builds a live scene from its definition.
    fn create(&mut self, name: &str) -> Option<Box<dyn SceneHandle>>;

    /// Tears down a scene that left the active list.
    fn release(&mut self, scene: Box<dyn SceneHandle>) {
        drop(scene);
    }

    /// Merges scenes or assets finished by background loaders. Called once
    /// per tick, before any scene runs.
    fn merge_async_loads(&mut self) {}

    /// Blocks until every background load is finished. Called on shutdown.
    fn finalize_async_loads(&mut self) {}
}
