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

//! Time sources sampled by the scheduler.
//!
//! The scheduler never reads the wall clock directly. It asks a
//! [`TimeSource`] for a monotonic number of seconds, which lets the host
//! plug in the real clock for play, or a [`ManualClock`] for tests,
//! replays and offline recording.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Port for a monotonic real-time clock.
pub trait TimeSource {
    /// Returns the current time in seconds. Successive calls must never
    /// return a smaller value.
    fn now_secs(&self) -> f64;

    /// Returns the clock's name for diagnostics.
    fn name(&self) -> &str {
        "TimeSource"
    }
}

/// Real monotonic clock measuring seconds since its creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose zero is "now".
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying value, so a test can keep one handle
/// while the scheduler owns another.
///
/// ```
/// use cadence_core::{ManualClock, TimeSource};
///
/// let clock = ManualClock::new(0.0);
/// let handle = clock.clone();
/// handle.advance(0.5);
/// assert_eq!(clock.now_secs(), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a manual clock starting at `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
        }
    }

    /// Sets the clock to an absolute value.
    ///
    /// Moving the clock backwards is allowed here; the scheduler treats a
    /// negative elapsed time as "nothing to do".
    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::SeqCst);
    }

    /// Moves the clock forward by `secs`.
    pub fn advance(&self, secs: f64) {
        let current = f64::from_bits(self.bits.load(Ordering::SeqCst));
        self.set(current + secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl TimeSource for ManualClock {
    fn now_secs(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let t1 = clock.now_secs();
        thread::sleep(Duration::from_millis(10));
        let t2 = clock.now_secs();

        assert!(t2 > t1);
        assert!(t2 - t1 >= 0.009);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1.0);
        let handle = clock.clone();

        handle.advance(0.25);
        assert_eq!(clock.now_secs(), 1.25);

        handle.set(10.0);
        assert_eq!(clock.now_secs(), 10.0);
    }

    #[test]
    fn test_manual_clock_does_not_move_by_itself() {
        let clock = ManualClock::default();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.now_secs(), 0.0);
    }
}
