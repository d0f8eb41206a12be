// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clock configuration.

use crate::predict::{DEFAULT_REFRESH_INTERVAL, MAX_HISTORY_AGE};

/// Tunables for a [`FrameClock`](crate::clock::FrameClock).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClockConfig {
    /// How far (µs) the backend's clock may move past the cached frame time
    /// before [`frame_time`](crate::clock::FrameClock::frame_time) resamples
    /// it outside of a frame.
    ///
    /// Calls closer together than this see the same value, which keeps
    /// animations started from independent event handlers in step.
    pub frame_time_staleness: i64,
    /// Refresh interval (µs) assumed until the backend reports one.
    pub default_refresh_interval: i64,
    /// Presentation timestamps older than this (µs) are not used for
    /// prediction.
    pub max_history_age: i64,
    /// Log a formatted timings line for every completed frame.
    pub debug_timings: bool,
}

impl FrameClockConfig {
    /// Standard configuration: one nominal 60 Hz refresh of staleness and no
    /// per-frame logging.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frame_time_staleness: DEFAULT_REFRESH_INTERVAL,
            default_refresh_interval: DEFAULT_REFRESH_INTERVAL,
            max_history_age: MAX_HISTORY_AGE,
            debug_timings: false,
        }
    }

    /// Standard configuration with per-frame timings logging.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            debug_timings: true,
            ..Self::new()
        }
    }
}

impl Default for FrameClockConfig {
    fn default() -> Self {
        Self::new()
    }
}
