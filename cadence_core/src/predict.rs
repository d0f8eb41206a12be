// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation-time prediction from recent history.
//!
//! Observers that want to target a specific vblank (audio/video sync, frame
//! pacing) ask the clock for the next presentation time after some base
//! time. The prediction anchors on the newest presentation timestamp the
//! backend has reported and steps it forward by the refresh interval.

use crate::ring::TimingsRing;

/// Refresh interval assumed until the backend reports one (60 Hz).
pub const DEFAULT_REFRESH_INTERVAL: i64 = 16_667;

/// Presentation timestamps older than this, relative to the base time, are
/// too stale to anchor a prediction.
pub const MAX_HISTORY_AGE: i64 = 150_000;

/// Result of a refresh prediction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RefreshInfo {
    /// Interval between presentations, in microseconds.
    pub refresh_interval: i64,
    /// Next predicted presentation strictly after the base time, or `0` if
    /// there is no recent enough data.
    pub presentation_time: i64,
}

/// Predicts the next presentation time from a [`TimingsRing`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshPredictor {
    /// Interval used before any record reports one.
    pub default_refresh_interval: i64,
    /// Maximum age of a usable presentation anchor.
    pub max_history_age: i64,
}

impl Default for RefreshPredictor {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

impl RefreshPredictor {
    /// Creates a predictor with the given fallback interval and the standard
    /// [`MAX_HISTORY_AGE`].
    #[must_use]
    pub const fn new(default_refresh_interval: i64) -> Self {
        Self {
            default_refresh_interval,
            max_history_age: MAX_HISTORY_AGE,
        }
    }

    /// Walks the history from newest to oldest and predicts the next
    /// presentation after `base_time`.
    ///
    /// Every nonzero refresh interval met during the walk replaces the
    /// default, so the anchor's own interval wins when it has one. The first
    /// nonzero
    /// presentation time is the anchor; if it is older than
    /// `base_time - max_history_age` the walk stops without a prediction.
    #[must_use]
    pub fn predict(&self, ring: &TimingsRing, base_time: i64) -> RefreshInfo {
        let mut refresh_interval = self.default_refresh_interval;

        for timings in ring.iter_newest_first() {
            if timings.refresh_interval() > 0 {
                refresh_interval = timings.refresh_interval();
            }

            let presentation_time = timings.presentation_time();
            if presentation_time == 0 {
                continue;
            }
            if presentation_time <= base_time - self.max_history_age {
                break;
            }

            let interval = if refresh_interval > 0 {
                refresh_interval
            } else {
                DEFAULT_REFRESH_INTERVAL
            };
            return RefreshInfo {
                refresh_interval: interval,
                presentation_time: next_after(presentation_time, interval, base_time),
            };
        }

        RefreshInfo {
            refresh_interval,
            presentation_time: 0,
        }
    }
}

/// Convenience for [`RefreshPredictor::predict`] with the standard history
/// age.
#[must_use]
pub fn refresh_info(ring: &TimingsRing, base_time: i64, default_interval: i64) -> RefreshInfo {
    RefreshPredictor::new(default_interval).predict(ring, base_time)
}

/// Smallest `anchor + k * interval` (for any integer `k`) strictly greater
/// than `base_time`.
fn next_after(anchor: i64, interval: i64, base_time: i64) -> i64 {
    debug_assert!(interval > 0, "interval must be positive");
    if anchor <= base_time {
        anchor + ((base_time - anchor) / interval + 1) * interval
    } else {
        anchor - ((anchor - base_time - 1) / interval) * interval
    }
}
