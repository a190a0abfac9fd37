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

//! Errors returned by the scheduler's public operations.

use thiserror::Error;

/// Errors that the scheduler reports back to the host.
///
/// Timing anomalies and budget exhaustion are not errors; they are handled
/// by the frame policy and never surface here.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// `set_external_clock` was called while the clock is not in external mode.
    #[error("external clock is disabled (current mode: {0})")]
    ExternalClockDisabled(String),

    /// `set_external_clock` was given a NaN or infinite time.
    #[error("external clock value must be finite, got {0}")]
    InvalidClockValue(f64),

    /// A configuration file could not be read.
    #[error("failed to read scheduler config '{path}': {source}")]
    ConfigIo {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration document could not be parsed.
    #[error("failed to parse scheduler config: {0}")]
    ConfigParse(String),
}

/// Result alias for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
