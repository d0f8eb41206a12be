// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-line debug dump of a timings record.
//!
//! ```text
//!     5: interval=16.6         smoothed= 0.1 / 16.7 layout_start=1.0  paint_start=2.5  frame_end=4.0  refresh_interval=16.7
//! ```
//!
//! All values are milliseconds with one decimal. Landmarks are offsets from
//! the record's `frame_time`; the interval and smoothed deltas need the
//! previous record and are omitted without one. Zero landmarks are omitted.

use core::fmt;
use core::fmt::Write as _;

use crate::timings::FrameTimings;

/// `Display` adapter printing a record relative to its predecessor.
#[derive(Clone, Copy, Debug)]
pub struct TimingsLine<'a> {
    timings: &'a FrameTimings,
    previous: Option<&'a FrameTimings>,
}

impl<'a> TimingsLine<'a> {
    /// Wraps `timings`, with `previous` being the record for the frame
    /// before it, if still known.
    #[must_use]
    pub fn new(timings: &'a FrameTimings, previous: Option<&'a FrameTimings>) -> Self {
        Self { timings, previous }
    }
}

fn ms(micros: i64) -> f64 {
    micros as f64 / 1000.
}

impl fmt::Display for TimingsLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.timings;
        let frame_time = t.frame_time();
        let (previous_frame_time, previous_smoothed) = self
            .previous
            .map_or((0, 0), |p| (p.frame_time(), p.smoothed_frame_time()));

        // Fields are padded for alignment; the end of the line is trimmed.
        let mut line = String::new();
        write!(line, "{:5}:", t.frame_counter())?;
        if previous_frame_time != 0 {
            write!(line, " interval={:<4.1}", ms(frame_time - previous_frame_time))?;
            line.push_str(if t.slept_before() { " (sleep)" } else { "        " });
            write!(
                line,
                " smoothed={:4.1} / {:<4.1}",
                ms(t.smoothed_frame_time() - frame_time),
                ms(t.smoothed_frame_time() - previous_smoothed)
            )?;
        }

        let landmarks = [
            ("layout_start", t.layout_start_time()),
            ("paint_start", t.paint_start_time()),
            ("frame_end", t.frame_end_time()),
            ("drawn", t.drawn_time()),
            ("present", t.presentation_time()),
            ("predicted", t.predicted_presentation_time()),
        ];
        for (label, time) in landmarks {
            if time != 0 {
                write!(line, " {label}={:<4.1}", ms(time - frame_time))?;
            }
        }

        if t.refresh_interval() != 0 {
            write!(line, " refresh_interval={:<4.1}", ms(t.refresh_interval()))?;
        }
        f.write_str(line.trim_end())
    }
}

/// Formats `timings` relative to `previous` as a single line.
#[must_use]
pub fn format_timings(timings: &FrameTimings, previous: Option<&FrameTimings>) -> String {
    TimingsLine::new(timings, previous).to_string()
}
