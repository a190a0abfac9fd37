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

//! The frame scheduler.

use crate::budget::{TickBudget, TickPlan};
use crate::clock::ClockState;
use crate::config::{ClockMode, SchedulerConfig};
use crate::context::SceneRequests;
use crate::error::{SchedulerError, SchedulerResult};
use crate::scenes::{PendingMutations, SceneSet};
use cadence_core::telemetry::{MetricsResult, SchedulerEvent};
use cadence_core::{
    DeviceInterface, SceneError, SceneProvider, SceneRequester, SceneResult, ScenegraphPass,
    StageContext, TickStep, TimeSource,
};
use cadence_telemetry::{
    CounterHandle, GaugeHandle, MetricsRegistry, ScopedMetricTimer, TimeCategory,
    TimeCategoryProfiler,
};
use crossbeam_channel::Sender;

/// Outcome of one [`FrameScheduler::advance_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Ticks that ran this frame.
    pub ticks_run: u32,
    /// Whether the host should render.
    pub should_render: bool,
    /// Owed ticks discarded by the physics ceiling.
    pub dropped_ticks: u32,
    /// Whether ticks were stretched by the logic ceiling.
    pub stretched: bool,
    /// Virtual time consumed after this frame.
    pub frame_time: f64,
}

struct SchedulerMetrics {
    frames: CounterHandle,
    ticks_run: CounterHandle,
    ticks_dropped: CounterHandle,
    stretched_frames: CounterHandle,
    frame_time: GaugeHandle,
    active_scenes: GaugeHandle,
    advance_ms: GaugeHandle,
}

impl SchedulerMetrics {
    fn register(registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            frames: registry.register_counter("scheduler", "frames", "Frame requests served")?,
            ticks_run: registry.register_counter("scheduler", "ticks_run", "Ticks run")?,
            ticks_dropped: registry.register_counter(
                "scheduler",
                "ticks_dropped",
                "Owed ticks dropped by the physics ceiling",
            )?,
            stretched_frames: registry.register_counter(
                "scheduler",
                "stretched_frames",
                "Frames whose ticks were stretched by the logic ceiling",
            )?,
            frame_time: registry.register_gauge(
                "scheduler",
                "frame_time",
                "Virtual time consumed by ticks",
                "s",
            )?,
            active_scenes: registry.register_gauge(
                "scenes",
                "active",
                "Scenes in the active list",
                "count",
            )?,
            advance_ms: registry.register_gauge(
                "scheduler",
                "advance_ms",
                "Wall time spent in advance_frame",
                "ms",
            )?,
        })
    }

    fn record(&self, report: &FrameReport, scene_count: usize) -> MetricsResult<()> {
        self.frames.increment()?;
        self.ticks_run.increment_by(u64::from(report.ticks_run))?;
        self.ticks_dropped
            .increment_by(u64::from(report.dropped_ticks))?;
        if report.stretched {
            self.stretched_frames.increment()?;
        }
        self.frame_time.set(report.frame_time)?;
        self.active_scenes.set(scene_count as f64)?;
        Ok(())
    }
}

fn emit(sink: &Option<Sender<SchedulerEvent>>, event: SchedulerEvent) {
    if let Some(tx) = sink {
        if let Err(e) = tx.try_send(event) {
            log::trace!("Scheduler event dropped: {e}");
        }
    }
}

fn profile(profiler: &mut Option<TimeCategoryProfiler>, category: TimeCategory) {
    if let Some(profiler) = profiler {
        profiler.start(category);
    }
}

/// Drives the simulation from host frame requests.
///
/// The host calls [`advance_frame`](Self::advance_frame) once per frame,
/// from a single thread. The scheduler advances its virtual clock, resolves
/// how many ticks are owed, steps every active scene through the stage
/// pipeline once per tick and tells the host whether to render.
///
/// Scene-list requests made during a tick, by stages or by the host, are
/// applied at the end of that tick. Requests made between frames are
/// applied at the end of the next tick.
pub struct FrameScheduler {
    config: SchedulerConfig,
    clock: ClockState,
    budget: TickBudget,
    time_source: Box<dyn TimeSource>,
    provider: Box<dyn SceneProvider>,
    scenes: SceneSet,
    pending: PendingMutations,
    devices: Vec<Box<dyn DeviceInterface>>,
    record_mode: bool,
    recorded_frame: u64,
    suspended_delta: f64,
    running: bool,
    metrics: Option<SchedulerMetrics>,
    events: Option<Sender<SchedulerEvent>>,
    profiler: Option<TimeCategoryProfiler>,
}

impl FrameScheduler {
    /// Creates a scheduler. Out-of-range configuration values fall back to
    /// their defaults.
    pub fn new(
        config: SchedulerConfig,
        time_source: Box<dyn TimeSource>,
        provider: Box<dyn SceneProvider>,
    ) -> Self {
        let config = config.sanitized();
        let now = time_source.now_secs();
        log::debug!(
            "FrameScheduler created: {} Hz, ceilings {}/{}, scale {}, {} clock from {}",
            config.tick_rate,
            config.max_physics_ticks,
            config.max_logic_ticks,
            config.time_scale,
            config.clock_mode,
            time_source.name()
        );

        Self {
            clock: ClockState::new(now, config.tick_rate, config.time_scale, config.clock_mode),
            budget: TickBudget::new(config.max_physics_ticks, config.max_logic_ticks),
            config,
            time_source,
            provider,
            scenes: SceneSet::new(),
            pending: PendingMutations::new(),
            devices: Vec::new(),
            record_mode: false,
            recorded_frame: 0,
            suspended_delta: 0.0,
            running: false,
            metrics: None,
            events: None,
            profiler: None,
        }
    }

    /// Publishes scheduler metrics into `registry`.
    pub fn with_telemetry(mut self, registry: &MetricsRegistry) -> Self {
        match SchedulerMetrics::register(registry) {
            Ok(metrics) => self.metrics = Some(metrics),
            Err(e) => log::warn!("FrameScheduler: telemetry disabled: {e}"),
        }
        self
    }

    /// Sends [`SchedulerEvent`]s to `sink`. Events are dropped, never
    /// waited on, when the channel is full.
    pub fn with_event_sink(mut self, sink: Sender<SchedulerEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Charges wall time spent in each stage to `profiler`.
    pub fn with_profiler(mut self, profiler: TimeCategoryProfiler) -> Self {
        self.profiler = Some(profiler);
        self
    }

    /// Changes rate, ceilings and time scale. Invalid values fall back to
    /// their defaults with a warning.
    pub fn configure(
        &mut self,
        tick_rate: f64,
        max_physics_ticks: u32,
        max_logic_ticks: u32,
        time_scale: f64,
    ) {
        self.set_config(SchedulerConfig {
            tick_rate,
            max_physics_ticks,
            max_logic_ticks,
            time_scale,
            clock_mode: self.clock.mode,
        });
    }

    /// Replaces the whole configuration, clock mode included.
    pub fn set_config(&mut self, config: SchedulerConfig) {
        let config = config.sanitized();
        self.budget = TickBudget::new(config.max_physics_ticks, config.max_logic_ticks);
        self.clock.tick_rate = config.tick_rate;
        self.clock.time_scale = config.time_scale;
        self.config = config;
        self.set_mode(self.config.clock_mode);
    }

    /// Selects the clock mode from the host's pair of flags. External wins
    /// when both are set.
    pub fn set_clock_mode(&mut self, use_external: bool, use_fixed: bool) {
        self.set_mode(ClockMode::from_flags(use_external, use_fixed));
    }

    fn set_mode(&mut self, mode: ClockMode) {
        let mode = if self.record_mode && mode == ClockMode::Fixed {
            log::warn!("Fixed clock is not available while recording, using real-time");
            ClockMode::RealTime
        } else {
            mode
        };
        if mode != self.clock.mode {
            log::debug!("Clock mode: {} -> {}", self.clock.mode, mode);
        }
        self.clock.mode = mode;
        self.config.clock_mode = mode;
    }

    /// Sets the virtual clock directly.
    ///
    /// Only valid in external mode with a finite value; otherwise the call
    /// fails and the clock is left untouched. Setting the clock behind the
    /// consumed frame time produces idle frames until it catches up.
    pub fn set_external_clock(&mut self, value: f64) -> SchedulerResult<()> {
        if self.clock.mode != ClockMode::External {
            return Err(SchedulerError::ExternalClockDisabled(
                self.clock.mode.to_string(),
            ));
        }
        if !value.is_finite() {
            log::warn!("Ignoring non-finite external clock value {value}");
            return Err(SchedulerError::InvalidClockValue(value));
        }
        self.clock.clock_time = value;
        Ok(())
    }

    /// Turns physics recording on or off. Recording needs real elapsed time,
    /// so a fixed clock is switched to real-time.
    pub fn set_record_mode(&mut self, enabled: bool, start_frame: u64) {
        self.record_mode = enabled;
        self.recorded_frame = start_frame;
        if enabled && self.clock.mode == ClockMode::Fixed {
            log::info!("Recording enabled, switching fixed clock to real-time");
            self.clock.mode = ClockMode::RealTime;
            self.config.clock_mode = ClockMode::RealTime;
        }
    }

    /// Registers a device polled once per tick, after every scene.
    pub fn add_device(&mut self, device: Box<dyn DeviceInterface>) {
        log::debug!("Device '{}' registered", device.name());
        self.devices.push(device);
    }

    /// Seeds every clock from the time source and applies scene requests
    /// queued before start, so the first frame owes only the time elapsed
    /// since now.
    pub fn start(&mut self) {
        let now = self.time_source.now_secs();
        self.clock.reset(now);
        emit(&self.events, SchedulerEvent::ClockReset { time: now });
        self.apply_mutations();
        self.running = true;
        log::info!(
            "FrameScheduler started at {now:.4}s with {} scene(s)",
            self.scenes.len()
        );
    }

    /// Finishes background loads and releases every scene.
    pub fn stop(&mut self) {
        if !self.running && self.scenes.is_empty() {
            return;
        }
        self.provider.finalize_async_loads();
        for scene in self.scenes.drain() {
            self.provider.release(scene);
        }
        self.pending = PendingMutations::new();
        self.running = false;
        log::info!("FrameScheduler stopped at frame time {:.4}s", self.clock.frame_time);
    }

    /// Runs one host frame: advances the clock, runs the owed ticks and
    /// reports whether to render.
    pub fn advance_frame(&mut self) -> FrameReport {
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.end_frame();
            profiler.start(TimeCategory::Services);
        }
        let advance_gauge = self.metrics.as_ref().map(|m| m.advance_ms.clone());
        let _timer = advance_gauge.as_ref().map(ScopedMetricTimer::new);

        let now = self.time_source.now_secs();
        let delta = self.clock.advance(now);
        let plan = TickPlan::resolve(delta, self.clock.tick_rate, self.clock.time_scale, self.budget);

        if plan.dropped_ticks > 0 {
            self.clock.frame_time += plan.dropped_time;
            log::debug!(
                "Dropped {} tick(s), skipping {:.4}s of virtual time",
                plan.dropped_ticks,
                plan.dropped_time
            );
            emit(
                &self.events,
                SchedulerEvent::TicksDropped {
                    count: plan.dropped_ticks,
                    skipped_time: plan.dropped_time,
                },
            );
        }

        if plan.is_stretched() {
            log::debug!(
                "Stretching {} tick(s) to {:.5}s (nominal {:.5}s)",
                plan.ticks,
                plan.duration,
                plan.nominal
            );
            emit(
                &self.events,
                SchedulerEvent::TicksStretched {
                    ticks: plan.ticks,
                    duration: plan.duration,
                    nominal: plan.nominal,
                },
            );
        }

        for index in 0..plan.ticks {
            self.clock.frame_time += plan.duration;
            log::trace!("Tick {index} at {:.5}s", self.clock.frame_time);
            self.run_tick(index, &plan);
        }

        profile(&mut self.profiler, TimeCategory::Outside);

        let report = FrameReport {
            ticks_run: plan.ticks,
            should_render: plan.should_render,
            dropped_ticks: plan.dropped_ticks,
            stretched: plan.is_stretched(),
            frame_time: self.clock.frame_time,
        };

        if let Some(metrics) = &self.metrics {
            if let Err(e) = metrics.record(&report, self.scenes.len()) {
                log::warn!("FrameScheduler: failed to record metrics: {e}");
            }
        }

        report
    }

    fn run_tick(&mut self, index: u32, plan: &TickPlan) {
        profile(&mut self.profiler, TimeCategory::Services);
        self.provider.merge_async_loads();

        let frame_time = self.clock.frame_time;
        let (scene_index, entries) = self.scenes.parts_mut();
        let mut requests = SceneRequests::new(scene_index, self.provider.as_ref(), &mut self.pending);

        for entry in entries.iter_mut() {
            if !entry.refresh(frame_time) {
                continue;
            }
            self.suspended_delta = entry.suspended_delta();

            let step = TickStep {
                frame_time,
                nominal_duration: plan.nominal,
                duration: plan.duration,
                index,
                suspended_delta: entry.suspended_delta(),
            };
            let mut ctx = StageContext::new(step, &mut requests);
            let scene = entry.scene_mut();

            profile(&mut self.profiler, TimeCategory::Network);
            scene.network(&mut ctx);

            profile(&mut self.profiler, TimeCategory::Physics);
            scene.physics_end_frame(&mut ctx);

            profile(&mut self.profiler, TimeCategory::Logic);
            scene.logic_begin_frame(&mut ctx);

            profile(&mut self.profiler, TimeCategory::Scenegraph);
            scene.update_scenegraph(ScenegraphPass::AfterLogic, &mut ctx);

            profile(&mut self.profiler, TimeCategory::Logic);
            scene.logic_update_frame(&mut ctx);
            scene.logic_end_frame(&mut ctx);

            profile(&mut self.profiler, TimeCategory::Scenegraph);
            scene.update_scenegraph(ScenegraphPass::AfterActuators, &mut ctx);
            scene.update_lods(&mut ctx);

            profile(&mut self.profiler, TimeCategory::Physics);
            scene.physics_begin_frame(&mut ctx);
            scene.physics_proceed(&mut ctx);

            profile(&mut self.profiler, TimeCategory::Scenegraph);
            scene.update_scenegraph(ScenegraphPass::AfterPhysics, &mut ctx);

            if self.record_mode {
                self.recorded_frame += 1;
                scene.record_physics_frame(self.recorded_frame, &mut ctx);
            }
        }

        profile(&mut self.profiler, TimeCategory::Logic);
        for device in &mut self.devices {
            device.poll_next_frame();
        }

        profile(&mut self.profiler, TimeCategory::Services);
        self.apply_mutations();
    }

    fn apply_mutations(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = self.pending.take();
        let events = &self.events;
        let applied = self
            .scenes
            .apply(pending, self.provider.as_mut(), &mut |event| emit(events, event));
        log::debug!(
            "Applied {applied} scene mutation(s), {} scene(s) active",
            self.scenes.len()
        );
    }

    fn requests(&mut self) -> SceneRequests<'_> {
        SceneRequests::new(self.scenes.index(), self.provider.as_ref(), &mut self.pending)
    }

    /// Queues a scene to be added at the end of the next tick, at the end of
    /// the list for an overlay or at the front otherwise.
    pub fn request_add_scene(&mut self, name: &str, overlay: bool) -> SceneResult<()> {
        self.requests().request_add(name, overlay)
    }

    /// Queues an active scene for removal. Unknown names are a recoverable
    /// error; queuing the same scene twice is a no-op.
    pub fn request_remove_scene(&mut self, name: &str) -> SceneResult<()> {
        self.requests().request_remove(name)
    }

    /// Queues an in-place replacement, rejected immediately if the provider
    /// cannot load `new_name`.
    ///
    /// `old_name` is looked up in the active list, not among queued requests,
    /// so chaining `A -> B` then `B -> C` in one tick fails with `NotFound`
    /// until the first replacement has been applied. A second replacement of
    /// the same scene in one tick is ignored and the first one wins.
    ///
    /// Removal requests address the slot, so removing `old_name` in the same
    /// tick removes the replacement too.
    pub fn request_replace_scene(&mut self, old_name: &str, new_name: &str) -> SceneResult<()> {
        self.requests().request_replace(old_name, new_name)
    }

    /// Suspends an active scene.
    pub fn suspend_scene(&mut self, name: &str) -> SceneResult<()> {
        match self.scenes.get_mut(name) {
            Some(entry) => {
                entry.scene_mut().suspend();
                Ok(())
            }
            None => {
                log::warn!("Cannot suspend '{name}': no such active scene");
                Err(SceneError::NotFound(name.to_string()))
            }
        }
    }

    /// Resumes a suspended scene.
    pub fn resume_scene(&mut self, name: &str) -> SceneResult<()> {
        match self.scenes.get_mut(name) {
            Some(entry) => {
                entry.scene_mut().resume();
                Ok(())
            }
            None => {
                log::warn!("Cannot resume '{name}': no such active scene");
                Err(SceneError::NotFound(name.to_string()))
            }
        }
    }

    /// Current virtual clock.
    pub fn clock_time(&self) -> f64 {
        self.clock.clock_time
    }

    /// Virtual time consumed by ticks (and dropped).
    pub fn frame_time(&self) -> f64 {
        self.clock.frame_time
    }

    /// Latest time source sample.
    pub fn real_time(&self) -> f64 {
        self.clock.real_time
    }

    /// Ticks per second of virtual time.
    pub fn tick_rate(&self) -> f64 {
        self.clock.tick_rate
    }

    /// Real to virtual time multiplier.
    pub fn time_scale(&self) -> f64 {
        self.clock.time_scale
    }

    /// Current clock mode.
    pub fn clock_mode(&self) -> ClockMode {
        self.clock.mode
    }

    /// Current tick ceilings.
    pub fn budget(&self) -> TickBudget {
        self.budget
    }

    /// Effective configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Full clock state.
    pub fn clock(&self) -> &ClockState {
        &self.clock
    }

    /// Active scene names in execution order.
    pub fn scene_names(&self) -> Vec<String> {
        self.scenes.names()
    }

    /// The active scene list.
    pub fn scenes(&self) -> &SceneSet {
        &self.scenes
    }

    /// Number of requests waiting for the end of the tick.
    pub fn pending_mutations(&self) -> usize {
        self.pending.len()
    }

    /// Suspended delta of the last scene that ran.
    pub fn suspended_delta(&self) -> f64 {
        self.suspended_delta
    }

    /// Whether physics recording is on.
    pub fn is_recording(&self) -> bool {
        self.record_mode
    }

    /// Last frame number handed to `record_physics_frame`.
    pub fn recorded_frame(&self) -> u64 {
        self.recorded_frame
    }

    /// Whether [`start`](Self::start) was called without a later
    /// [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The stage profiler, if one was attached.
    pub fn profiler(&self) -> Option<&TimeCategoryProfiler> {
        self.profiler.as_ref()
    }

    /// The scene provider.
    pub fn provider(&self) -> &dyn SceneProvider {
        self.provider.as_ref()
    }
}
