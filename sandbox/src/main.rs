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

// cadence sandbox
// Drives toy scenes through the frame scheduler without a window.

mod scenes;

use anyhow::Result;
use cadence_sdk::prelude::*;
use cadence_telemetry::{init_logging, LoggingConfig};
use clap::Parser;
use scenes::{DemoProvider, DemoStats, SimulatedKeyboard};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Headless cadence scheduler demo")]
struct Cli {
    /// Scheduler config in RON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks per second of virtual time.
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Real to virtual time multiplier.
    #[arg(long)]
    time_scale: Option<f64>,

    /// Advance one nominal tick per frame instead of following the wall clock.
    #[arg(long)]
    fixed: bool,

    /// Host frames to run.
    #[arg(long, default_value_t = 240)]
    frames: u64,

    /// Sleep between host frames, in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Log filter, e.g. "debug" or "cadence_scheduler=trace".
    #[arg(long)]
    log: Option<String>,
}

struct SandboxApp {
    frames: u64,
    renders: u64,
}

impl Application for SandboxApp {
    fn setup(&mut self, scheduler: &mut FrameScheduler) -> Result<()> {
        scheduler.request_add_scene("hud", true)?;
        log::info!("SandboxApp: scenes queued");
        Ok(())
    }

    fn update(&mut self, _frame: &FrameReport, scheduler: &mut FrameScheduler) {
        self.frames += 1;
        // Pause the world for a stretch to exercise suspension bookkeeping.
        let outcome = match self.frames {
            60 => scheduler.suspend_scene("world"),
            120 => scheduler.resume_scene("world"),
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            log::warn!("SandboxApp: {e}");
        }
    }

    fn render(&mut self, frame: &FrameReport) {
        self.renders += 1;
        log::trace!(
            "render #{} at t={:.3} ({} tick(s))",
            self.renders,
            frame.frame_time,
            frame.ticks_run
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    let mut config = match &cli.config {
        Some(path) => SchedulerConfig::load(path)?,
        None => SchedulerConfig::default(),
    };
    if let Some(tick_rate) = cli.tick_rate {
        config.tick_rate = tick_rate;
    }
    if let Some(time_scale) = cli.time_scale {
        config.time_scale = time_scale;
    }
    if cli.fixed {
        config.clock_mode = ClockMode::Fixed;
    }

    let stats = Rc::new(DemoStats::default());
    let mut engine = Engine::builder()
        .config(config)
        .provider(DemoProvider::new(stats.clone(), 2.0))
        .device(SimulatedKeyboard {
            stats: stats.clone(),
        })
        .scene("world", false)
        .profiler_window(60)
        .build()?;

    let mut app = SandboxApp {
        frames: 0,
        renders: 0,
    };

    engine.start(&mut app)?;
    for _ in 0..cli.frames {
        engine.step(&mut app)?;
        std::thread::sleep(Duration::from_millis(cli.frame_ms));
    }

    let totals = engine.totals();
    log::info!(
        "Sandbox done: {} frames, {} renders, {} ticks ({} dropped)",
        totals.frames,
        totals.renders,
        totals.ticks,
        totals.dropped_ticks
    );
    log::info!(
        "  world ticks: {}, hud ticks: {}, keyboard polls: {}, orbit angle: {:.3} rad",
        stats.world_ticks.get(),
        stats.hud_ticks.get(),
        stats.polls.get(),
        stats.angle.get()
    );
    log::info!(
        "  active scenes: {:?}, suspended delta: {:.3}s",
        engine.scheduler().scene_names(),
        engine.scheduler().suspended_delta()
    );

    engine.shutdown();
    Ok(())
}
