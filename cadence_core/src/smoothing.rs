// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-time smoothing.
//!
//! Wakeups jitter around vblank, so raw frame times make animations stutter
//! even at a steady refresh rate. The smoothed frame time snaps each sample
//! to the refresh grid established by the previous smoothed time.
//!
//! Frames that follow a thaw are driven by the display itself (they are
//! "vsync related"), so a systematic offset between the grid and real time
//! is likely drift rather than jitter. For those frames the grid is nudged
//! toward the real sample by `error² / interval`, which converges quickly for
//! large errors and barely moves for small ones.

use crate::predict::DEFAULT_REFRESH_INTERVAL;

/// Snaps `new_frame_time` to the refresh grid anchored at `smoothed_base`.
///
/// The result is always strictly greater than `smoothed_base`. A
/// non-positive `interval` is replaced by [`DEFAULT_REFRESH_INTERVAL`].
#[must_use]
pub fn smooth_frame_time(
    new_frame_time: i64,
    vsync_related: bool,
    smoothed_base: i64,
    interval: i64,
) -> i64 {
    let interval = if interval > 0 {
        interval
    } else {
        DEFAULT_REFRESH_INTERVAL
    };

    let elapsed = new_frame_time - smoothed_base;
    let frames_passed = (elapsed + interval / 2).div_euclid(interval);
    let mut smoothed = smoothed_base + frames_passed * interval;

    if vsync_related {
        let error = new_frame_time - smoothed;
        let correction = error * error / interval;
        if error < 0 {
            smoothed -= correction;
        } else {
            smoothed += correction;
        }
    }

    if smoothed <= smoothed_base {
        smoothed = smoothed_base + 1;
    }
    smoothed
}
