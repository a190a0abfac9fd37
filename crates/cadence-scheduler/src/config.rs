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

//! Scheduler configuration and its RON representation.

use crate::error::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Tick rate used when the configured one is not a positive number.
pub const DEFAULT_TICK_RATE: f64 = 60.0;

/// Tick ceiling used when a configured ceiling is zero.
pub const DEFAULT_MAX_TICKS: u32 = 5;

/// How the virtual clock advances on each frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockMode {
    /// Advance by the scaled wall-clock time since the previous frame.
    #[default]
    RealTime,
    /// Advance by exactly one nominal tick per frame, whatever the wall clock says.
    Fixed,
    /// Never advance automatically; the host sets the clock.
    External,
}

impl ClockMode {
    /// Maps the pair of flags used by hosts onto a mode. External wins when
    /// both are set.
    pub fn from_flags(use_external: bool, use_fixed: bool) -> Self {
        match (use_external, use_fixed) {
            (true, _) => ClockMode::External,
            (false, true) => ClockMode::Fixed,
            (false, false) => ClockMode::RealTime,
        }
    }
}

impl fmt::Display for ClockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClockMode::RealTime => "real-time",
            ClockMode::Fixed => "fixed",
            ClockMode::External => "external",
        };
        f.write_str(s)
    }
}

/// Configuration of a [`FrameScheduler`](crate::FrameScheduler).
///
/// Missing fields in a RON document take their default value:
///
/// ```
/// use cadence_scheduler::{ClockMode, SchedulerConfig};
///
/// let config = SchedulerConfig::from_ron_str("(tick_rate: 30.0, clock_mode: Fixed)").unwrap();
/// assert_eq!(config.tick_rate, 30.0);
/// assert_eq!(config.max_physics_ticks, 5);
/// assert_eq!(config.clock_mode, ClockMode::Fixed);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Logic/physics ticks per second of virtual time.
    pub tick_rate: f64,
    /// Ceiling above which owed ticks are dropped outright.
    pub max_physics_ticks: u32,
    /// Ceiling above which ticks are stretched instead of run.
    pub max_logic_ticks: u32,
    /// Multiplier from real time to virtual time.
    pub time_scale: f64,
    /// How the virtual clock advances.
    pub clock_mode: ClockMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_physics_ticks: DEFAULT_MAX_TICKS,
            max_logic_ticks: DEFAULT_MAX_TICKS,
            time_scale: 1.0,
            clock_mode: ClockMode::RealTime,
        }
    }
}

impl SchedulerConfig {
    /// Parses a configuration from a RON document.
    pub fn from_ron_str(source: &str) -> SchedulerResult<Self> {
        ron::de::from_str(source).map_err(|e| SchedulerError::ConfigParse(e.to_string()))
    }

    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> SchedulerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SchedulerError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// Serializes the configuration to pretty RON.
    pub fn to_ron_string(&self) -> SchedulerResult<String> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty)
            .map_err(|e| SchedulerError::ConfigParse(e.to_string()))
    }

    /// Returns a copy where every out-of-range value is replaced by its
    /// fallback, logging a warning for each correction.
    pub fn sanitized(mut self) -> Self {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            log::warn!(
                "Invalid tick rate {}, falling back to {DEFAULT_TICK_RATE}",
                self.tick_rate
            );
            self.tick_rate = DEFAULT_TICK_RATE;
        }
        if self.max_physics_ticks == 0 {
            log::warn!("max_physics_ticks is 0, falling back to {DEFAULT_MAX_TICKS}");
            self.max_physics_ticks = DEFAULT_MAX_TICKS;
        }
        if self.max_logic_ticks == 0 {
            log::warn!("max_logic_ticks is 0, falling back to {DEFAULT_MAX_TICKS}");
            self.max_logic_ticks = DEFAULT_MAX_TICKS;
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            log::warn!("Invalid time scale {}, falling back to 1.0", self.time_scale);
            self.time_scale = 1.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_fallbacks() {
        let config = SchedulerConfig {
            tick_rate: 0.0,
            max_physics_ticks: 0,
            max_logic_ticks: 3,
            time_scale: -2.0,
            clock_mode: ClockMode::Fixed,
        }
        .sanitized();

        assert_eq!(config.tick_rate, DEFAULT_TICK_RATE);
        assert_eq!(config.max_physics_ticks, DEFAULT_MAX_TICKS);
        assert_eq!(config.max_logic_ticks, 3);
        assert_eq!(config.time_scale, 1.0);
        assert_eq!(config.clock_mode, ClockMode::Fixed);
    }

    #[test]
    fn test_sanitized_rejects_nan_tick_rate() {
        let config = SchedulerConfig {
            tick_rate: f64::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.tick_rate, DEFAULT_TICK_RATE);
    }

    #[test]
    fn test_valid_config_is_untouched() {
        let config = SchedulerConfig {
            tick_rate: 120.0,
            max_physics_ticks: 10,
            max_logic_ticks: 4,
            time_scale: 0.5,
            clock_mode: ClockMode::External,
        };
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = SchedulerConfig {
            tick_rate: 50.0,
            max_physics_ticks: 8,
            max_logic_ticks: 2,
            time_scale: 2.0,
            clock_mode: ClockMode::External,
        };
        let text = config.to_ron_string().unwrap();
        assert_eq!(SchedulerConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_ron_parse_error() {
        let err = SchedulerConfig::from_ron_str("(tick_rate: \"fast\")").unwrap_err();
        assert!(matches!(err, SchedulerError::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SchedulerConfig::load("/nonexistent/cadence.ron").unwrap_err();
        assert!(matches!(err, SchedulerError::ConfigIo { .. }));
    }

    #[test]
    fn test_clock_mode_from_flags() {
        assert_eq!(ClockMode::from_flags(true, true), ClockMode::External);
        assert_eq!(ClockMode::from_flags(false, true), ClockMode::Fixed);
        assert_eq!(ClockMode::from_flags(false, false), ClockMode::RealTime);
        assert_eq!(ClockMode::External.to_string(), "external");
    }
}
