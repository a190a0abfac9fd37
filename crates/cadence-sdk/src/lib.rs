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

//! The public-facing SDK for cadence.
//!
//! An [`Engine`] owns a [`FrameScheduler`] and a [`TelemetryService`] and
//! drives them from a host loop, calling back into an [`Application`] on
//! every frame and rendering only when the scheduler says so.

use anyhow::{bail, Context, Result};
use cadence_core::{DeviceInterface, SceneProvider, Stopwatch, SystemClock, TimeSource};
use cadence_scheduler::{FrameReport, FrameScheduler, SchedulerConfig};
use cadence_telemetry::{TelemetryService, TimeCategoryProfiler};
use std::path::Path;
use std::time::Duration;

pub mod prelude {
    //! Everything needed to write scenes, providers and applications.
    pub use crate::{Application, Engine, EngineBuilder, RunSummary};
    pub use cadence_core::{
        DeviceInterface, ManualClock, SceneError, SceneHandle, SceneProvider, SceneRequester,
        SceneResult, ScenegraphPass, StageContext, StageRunner, SystemClock, TickStep,
        TimeSource,
    };
    pub use cadence_scheduler::{ClockMode, FrameReport, FrameScheduler, SchedulerConfig};
}

/// User code driven by the [`Engine`].
#[allow(unused_variables)]
pub trait Application {
    /// Called once before the first frame. The usual place to queue the
    /// initial scenes.
    fn setup(&mut self, scheduler: &mut FrameScheduler) -> Result<()> {
        Ok(())
    }

    /// Called after every frame request, whether or not ticks ran.
    fn update(&mut self, frame: &FrameReport, scheduler: &mut FrameScheduler) {}

    /// Called when the frame ran at least one tick.
    fn render(&mut self, frame: &FrameReport);
}

/// Totals over a [`Engine::run_frames`] or [`Engine::run_for`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Frame requests served.
    pub frames: u64,
    /// Frames that rendered.
    pub renders: u64,
    /// Ticks run.
    pub ticks: u64,
    /// Owed ticks dropped by the physics ceiling.
    pub dropped_ticks: u64,
}

impl RunSummary {
    fn add(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.ticks += u64::from(report.ticks_run);
        self.dropped_ticks += u64::from(report.dropped_ticks);
        if report.should_render {
            self.renders += 1;
        }
    }
}

/// Builder for an [`Engine`].
pub struct EngineBuilder {
    config: SchedulerConfig,
    time_source: Option<Box<dyn TimeSource>>,
    provider: Option<Box<dyn SceneProvider>>,
    devices: Vec<Box<dyn DeviceInterface>>,
    scenes: Vec<(String, bool)>,
    telemetry_interval: Duration,
    event_buffer: usize,
    profiler_window: Option<usize>,
    frame_pacing: Option<Duration>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: SchedulerConfig::default(),
            time_source: None,
            provider: None,
            devices: Vec::new(),
            scenes: Vec::new(),
            telemetry_interval: Duration::from_secs(1),
            event_buffer: 1000,
            profiler_window: None,
            frame_pacing: None,
        }
    }
}

impl EngineBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheduler configuration.
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the scheduler configuration from a RON file.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        self.config = SchedulerConfig::load(path)
            .with_context(|| format!("loading scheduler config from {}", path.display()))?;
        Ok(self)
    }

    /// Time source for the scheduler. Defaults to [`SystemClock`].
    pub fn time_source(mut self, time_source: impl TimeSource + 'static) -> Self {
        self.time_source = Some(Box::new(time_source));
        self
    }

    /// Scene provider. Required.
    pub fn provider(mut self, provider: impl SceneProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Adds a device polled once per tick.
    pub fn device(mut self, device: impl DeviceInterface + 'static) -> Self {
        self.devices.push(Box::new(device));
        self
    }

    /// Queues a scene to be active from the first frame.
    pub fn scene(mut self, name: impl Into<String>, overlay: bool) -> Self {
        self.scenes.push((name.into(), overlay));
        self
    }

    /// Interval between telemetry summaries in the log.
    pub fn telemetry_interval(mut self, interval: Duration) -> Self {
        self.telemetry_interval = interval;
        self
    }

    /// Enables the per-stage profiler, averaging over `window` frames.
    pub fn profiler_window(mut self, window: usize) -> Self {
        self.profiler_window = Some(window);
        self
    }

    /// Sleeps this long between frames in [`Engine::run_for`].
    pub fn frame_pacing(mut self, pacing: Duration) -> Self {
        self.frame_pacing = Some(pacing);
        self
    }

    /// Builds the engine. Fails if no scene provider was given or an initial
    /// scene cannot be queued.
    pub fn build(self) -> Result<Engine> {
        let Some(provider) = self.provider else {
            bail!("EngineBuilder: a scene provider is required");
        };
        let time_source = self
            .time_source
            .unwrap_or_else(|| Box::new(SystemClock::new()) as Box<dyn TimeSource>);

        let (telemetry, events) = TelemetryService::new(self.telemetry_interval, self.event_buffer);
        let mut scheduler = FrameScheduler::new(self.config, time_source, provider)
            .with_telemetry(telemetry.metrics_registry())
            .with_event_sink(events);
        if let Some(window) = self.profiler_window {
            scheduler = scheduler.with_profiler(TimeCategoryProfiler::new(window));
        }

        for device in self.devices {
            scheduler.add_device(device);
        }
        for (name, overlay) in &self.scenes {
            scheduler
                .request_add_scene(name, *overlay)
                .with_context(|| format!("queuing initial scene '{name}'"))?;
        }

        Ok(Engine {
            scheduler,
            telemetry,
            frame_pacing: self.frame_pacing,
            totals: RunSummary::default(),
            started: false,
        })
    }
}

/// A running scheduler plus its telemetry.
pub struct Engine {
    scheduler: FrameScheduler,
    telemetry: TelemetryService,
    frame_pacing: Option<Duration>,
    totals: RunSummary,
    started: bool,
}

impl Engine {
    /// Starts building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Runs the application's setup and starts the scheduler clock. Called
    /// by the first [`step`](Self::step) if not called explicitly.
    pub fn start<A: Application>(&mut self, app: &mut A) -> Result<()> {
        if self.started {
            return Ok(());
        }
        log::info!("cadence engine: starting...");
        app.setup(&mut self.scheduler)
            .context("application setup failed")?;
        self.scheduler.start();
        self.started = true;
        Ok(())
    }

    /// Serves one host frame.
    pub fn step<A: Application>(&mut self, app: &mut A) -> Result<FrameReport> {
        self.start(app)?;

        let report = self.scheduler.advance_frame();
        app.update(&report, &mut self.scheduler);
        if report.should_render {
            app.render(&report);
        }
        self.totals.add(&report);

        if self.telemetry.tick() {
            self.log_telemetry_summary();
        }
        Ok(report)
    }

    /// Serves exactly `frames` host frames.
    pub fn run_frames<A: Application>(&mut self, app: &mut A, frames: u64) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for _ in 0..frames {
            let report = self.step(app)?;
            summary.add(&report);
        }
        Ok(summary)
    }

    /// Serves frames until `duration` of wall time has passed, sleeping for
    /// the configured pacing between frames.
    pub fn run_for<A: Application>(&mut self, app: &mut A, duration: Duration) -> Result<RunSummary> {
        let stopwatch = Stopwatch::new();
        let mut summary = RunSummary::default();
        while stopwatch.elapsed() < duration {
            let report = self.step(app)?;
            summary.add(&report);
            if let Some(pacing) = self.frame_pacing {
                std::thread::sleep(pacing);
            }
        }
        Ok(summary)
    }

    /// Stops the scheduler, releasing every scene, and logs a final summary.
    pub fn shutdown(&mut self) {
        if !self.started {
            return;
        }
        log::info!("cadence engine: shutting down...");
        self.scheduler.stop();
        self.telemetry.tick();
        self.log_telemetry_summary();
        self.started = false;
        log::info!("cadence engine: shutdown complete.");
    }

    /// Logs metrics and, when profiling, the per-stage time split.
    pub fn log_telemetry_summary(&self) {
        self.telemetry.log_summary();
        log::info!(
            "  Frames: {} (rendered {}), ticks: {} (dropped {})",
            self.totals.frames,
            self.totals.renders,
            self.totals.ticks,
            self.totals.dropped_ticks
        );
        if let Some(profiler) = self.scheduler.profiler() {
            for (category, fraction) in profiler.average_fractions() {
                log::info!("  {category}: {:.1}%", fraction * 100.0);
            }
            log::info!("  Frame rate: {:.1} fps", profiler.average_frame_rate());
        }
    }

    /// Totals since the engine was built.
    pub fn totals(&self) -> RunSummary {
        self.totals
    }

    /// Whether the engine was started and not shut down.
    pub fn is_running(&self) -> bool {
        self.started
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// The scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler {
        &mut self.scheduler
    }

    /// The telemetry service.
    pub fn telemetry(&self) -> &TelemetryService {
        &self.telemetry
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
