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

//! Toy scenes and the provider that builds them.

use cadence_sdk::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

/// Counters shared between the scenes and `main`.
#[derive(Default)]
pub struct DemoStats {
    pub world_ticks: Cell<u64>,
    pub hud_ticks: Cell<u64>,
    pub polls: Cell<u64>,
    pub angle: Cell<f64>,
}

/// A body orbiting at constant angular speed, integrated in the physics stage.
struct Orbit {
    name: String,
    speed: f64,
    angle: f64,
    suspended: bool,
    stats: Rc<DemoStats>,
}

impl StageRunner for Orbit {
    fn physics_proceed(&mut self, ctx: &mut StageContext<'_>) {
        self.angle = (self.angle + self.speed * ctx.step().duration) % std::f64::consts::TAU;
        self.stats.angle.set(self.angle);
        self.stats.world_ticks.set(self.stats.world_ticks.get() + 1);
    }

    fn update_scenegraph(&mut self, pass: ScenegraphPass, ctx: &mut StageContext<'_>) {
        if pass == ScenegraphPass::AfterPhysics {
            log::trace!(
                "{}: angle {:.3} rad at t={:.3}",
                self.name,
                self.angle,
                ctx.step().scene_time()
            );
        }
    }
}

impl SceneHandle for Orbit {
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

/// An overlay that swaps itself for its alternate layout after `swap_at`
/// seconds of virtual time.
struct Hud {
    name: String,
    alternate: Option<String>,
    swap_at: f64,
    stats: Rc<DemoStats>,
}

impl StageRunner for Hud {
    fn logic_begin_frame(&mut self, ctx: &mut StageContext<'_>) {
        self.stats.hud_ticks.set(self.stats.hud_ticks.get() + 1);
        if ctx.frame_time() < self.swap_at {
            return;
        }
        if let Some(alternate) = self.alternate.take() {
            if let Err(e) = ctx.scenes().request_replace(&self.name, &alternate) {
                log::warn!("{}: {e}", self.name);
            }
        }
    }
}

impl SceneHandle for Hud {
    fn name(&self) -> &str {
        &self.name
    }
    fn is_suspended(&self) -> bool {
        false
    }
    fn suspend(&mut self) {}
    fn resume(&mut self) {}
}

/// Builds `world`, `hud` and `hud_compact`.
pub struct DemoProvider {
    stats: Rc<DemoStats>,
    hud_swap_at: f64,
}

impl DemoProvider {
    pub fn new(stats: Rc<DemoStats>, hud_swap_at: f64) -> Self {
        Self { stats, hud_swap_at }
    }
}

impl SceneProvider for DemoProvider {
    fn contains(&self, name: &str) -> bool {
        matches!(name, "world" | "hud" | "hud_compact")
    }

    fn create(&mut self, name: &str) -> Option<Box<dyn SceneHandle>> {
        let scene: Box<dyn SceneHandle> = match name {
            "world" => Box::new(Orbit {
                name: name.to_string(),
                speed: 1.5,
                angle: 0.0,
                suspended: false,
                stats: self.stats.clone(),
            }),
            "hud" => Box::new(Hud {
                name: name.to_string(),
                alternate: Some("hud_compact".to_string()),
                swap_at: self.hud_swap_at,
                stats: self.stats.clone(),
            }),
            "hud_compact" => Box::new(Hud {
                name: name.to_string(),
                alternate: None,
                swap_at: f64::INFINITY,
                stats: self.stats.clone(),
            }),
            _ => return None,
        };
        log::debug!("DemoProvider: created '{name}'");
        Some(scene)
    }

    fn release(&mut self, scene: Box<dyn SceneHandle>) {
        log::debug!("DemoProvider: released '{}'", scene.name());
    }
}

/// Stands in for an input device; only counts polls.
pub struct SimulatedKeyboard {
    pub stats: Rc<DemoStats>,
}

impl DeviceInterface for SimulatedKeyboard {
    fn name(&self) -> &str {
        "keyboard"
    }

    fn poll_next_frame(&mut self) {
        self.stats.polls.set(self.stats.polls.get() + 1);
    }
}
