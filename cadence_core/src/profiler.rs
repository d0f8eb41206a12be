// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Profiler output for completed frames.
//!
//! The clock does not know what a profiler looks like. It forwards opaque
//! marks and counter samples to a [`ProfilerSink`], whose methods all default
//! to no-ops. [`Profiler`] wraps an optional boxed sink and is what the clock
//! owns; with no sink installed every call is a single `Option` branch.
//!
//! For each completed record the clock emits:
//!
//! - a `"frame"` mark from `frame_time` to `frame_end_time`,
//! - a `"layout"` mark from `layout_start_time` to the paint start (or frame
//!   end when nothing was painted),
//! - a `"paint"` mark from `paint_start_time` to `frame_end_time`,
//! - an instantaneous `"presentation"` mark,
//! - an `"fps"` counter sample at `frame_end_time` (see [`fps`]).
//!
//! Missing landmarks produce no mark.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ring::TimingsRing;
use crate::timings::FrameTimings;

/// Name of the per-frame mark.
pub const FRAME_MARK: &str = "frame";
/// Name of the layout mark.
pub const LAYOUT_MARK: &str = "layout";
/// Name of the paint mark.
pub const PAINT_MARK: &str = "paint";
/// Name of the presentation mark.
pub const PRESENTATION_MARK: &str = "presentation";
/// Name of the frame-rate counter.
pub const FPS_COUNTER: &str = "fps";

/// Receives profiler events.
///
/// Times are microseconds on the clock's timeline.
pub trait ProfilerSink {
    /// Whether events should be produced at all.
    fn is_running(&self) -> bool {
        true
    }

    /// A span starting at `start` lasting `duration` µs. A zero duration is
    /// an instantaneous mark.
    fn add_mark(&mut self, start: i64, duration: i64, name: &'static str, message: &str) {
        _ = (start, duration, name, message);
    }

    /// A sample of the counter `name` at `time`.
    fn set_counter(&mut self, name: &'static str, time: i64, value: f64) {
        _ = (name, time, value);
    }
}

/// Shares a sink with the clock so its contents stay inspectable.
impl<S: ProfilerSink + ?Sized> ProfilerSink for Rc<RefCell<S>> {
    fn is_running(&self) -> bool {
        self.borrow().is_running()
    }

    fn add_mark(&mut self, start: i64, duration: i64, name: &'static str, message: &str) {
        self.borrow_mut().add_mark(start, duration, name, message);
    }

    fn set_counter(&mut self, name: &'static str, time: i64, value: f64) {
        self.borrow_mut().set_counter(name, time, value);
    }
}

/// A sink that is never running.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl ProfilerSink for NoopSink {
    fn is_running(&self) -> bool {
        false
    }
}

/// Optional profiler sink owned by a clock.
#[derive(Default)]
pub struct Profiler {
    sink: Option<Box<dyn ProfilerSink>>,
}

impl core::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Profiler")
            .field("installed", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Profiler {
    /// Creates a profiler that dispatches to `sink`.
    #[must_use]
    pub fn new(sink: impl ProfilerSink + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
        }
    }

    /// Creates a profiler that discards everything.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Whether a sink is installed and running.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.is_running())
    }

    /// Forwards a completed record to the sink.
    pub fn add_timings(&mut self, timings: &FrameTimings, fps: f64) {
        if let Some(sink) = &mut self.sink
            && sink.is_running()
        {
            add_timings_to_profiler(sink.as_mut(), timings, fps);
        }
    }
}

/// Emits the marks and counter sample for one completed record.
pub fn add_timings_to_profiler(sink: &mut dyn ProfilerSink, timings: &FrameTimings, fps: f64) {
    let frame_time = timings.frame_time();
    let frame_end = timings.frame_end_time();
    let message = format!("frame {}", timings.frame_counter());

    sink.add_mark(
        frame_time,
        (frame_end - frame_time).max(0),
        FRAME_MARK,
        &message,
    );

    let layout_start = timings.layout_start_time();
    let paint_start = timings.paint_start_time();
    if layout_start != 0 {
        let layout_end = if paint_start != 0 { paint_start } else { frame_end };
        sink.add_mark(layout_start, (layout_end - layout_start).max(0), LAYOUT_MARK, "");
    }
    if paint_start != 0 {
        sink.add_mark(paint_start, (frame_end - paint_start).max(0), PAINT_MARK, "");
    }
    if timings.presentation_time() != 0 {
        sink.add_mark(timings.presentation_time(), 0, PRESENTATION_MARK, "");
    }

    sink.set_counter(FPS_COUNTER, frame_end, fps);
}

/// Estimates frames per second over the reachable history.
///
/// Spans from the oldest reachable record to the newest complete one, and
/// prefers presentation times over frame times when both ends have them.
/// Returns `0.0` when fewer than four frames separate the ends or no
/// refresh interval can be established.
#[must_use]
pub fn fps(ring: &TimingsRing) -> f64 {
    let Some(start) = ring.get(ring.history_start()) else {
        return 0.0;
    };
    let Some(end) = ring.iter_newest_first().find(|t| t.complete()) else {
        return 0.0;
    };
    let frames = end.frame_counter() - start.frame_counter();
    if frames < 4 {
        return 0.0;
    }

    let (start_time, end_time) = if start.presentation_time() != 0 && end.presentation_time() != 0
    {
        (start.presentation_time(), end.presentation_time())
    } else {
        (start.frame_time(), end.frame_time())
    };

    let interval = if end.refresh_interval() > 0 {
        end.refresh_interval()
    } else {
        min_frame_interval(ring, start.frame_counter(), end.frame_counter())
    };
    if interval == 0 {
        return 0.0;
    }

    let span = end_time - start_time;
    if span <= 0 {
        return 0.0;
    }
    frames as f64 * 1_000_000.0 / span as f64
}

/// Smallest positive `frame_time` step between consecutive records in
/// `[first, last]`, or `0`.
fn min_frame_interval(ring: &TimingsRing, first: i64, last: i64) -> i64 {
    (first..last)
        .filter_map(|counter| Some((ring.get(counter)?, ring.get(counter + 1)?)))
        .map(|(a, b)| b.frame_time() - a.frame_time())
        .filter(|&step| step > 0)
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect {
        marks: Vec<(i64, i64, &'static str)>,
        counters: Vec<(&'static str, i64, f64)>,
    }

    impl ProfilerSink for Collect {
        fn add_mark(&mut self, start: i64, duration: i64, name: &'static str, _message: &str) {
            self.marks.push((start, duration, name));
        }

        fn set_counter(&mut self, name: &'static str, time: i64, value: f64) {
            self.counters.push((name, time, value));
        }
    }

    fn ring_with_frames(n: i64, step: i64, interval: i64, present: bool) -> TimingsRing {
        let mut ring = TimingsRing::new();
        for i in 0..n {
            let mut timings = ring.begin_frame();
            timings
                .set_frame_time(1_000 + i * step)
                .set_refresh_interval(interval);
            if present {
                timings.set_presentation_time(2_000 + i * step);
            }
            timings.mark_complete();
        }
        ring
    }

    #[test]
    fn full_frame_emits_all_marks() {
        let timings = FrameTimings::new(7);
        crate::timings::TimingsMut::new(&timings)
            .set_frame_time(100)
            .set_layout_start_time(110)
            .set_paint_start_time(130)
            .set_frame_end_time(160)
            .set_presentation_time(200);

        let mut sink = Collect::default();
        add_timings_to_profiler(&mut sink, &timings, 60.0);
        assert_eq!(
            sink.marks,
            [
                (100, 60, FRAME_MARK),
                (110, 20, LAYOUT_MARK),
                (130, 30, PAINT_MARK),
                (200, 0, PRESENTATION_MARK),
            ]
        );
        assert_eq!(sink.counters, [(FPS_COUNTER, 160, 60.0)]);
    }

    #[test]
    fn missing_landmarks_are_skipped() {
        let timings = FrameTimings::new(0);
        crate::timings::TimingsMut::new(&timings)
            .set_frame_time(100)
            .set_layout_start_time(120)
            .set_frame_end_time(150);

        let mut sink = Collect::default();
        add_timings_to_profiler(&mut sink, &timings, 0.0);
        assert_eq!(sink.marks, [(100, 50, FRAME_MARK), (120, 30, LAYOUT_MARK)]);
    }

    #[test]
    fn profiler_without_sink_is_idle() {
        let mut profiler = Profiler::none();
        assert!(!profiler.is_running());
        profiler.add_timings(&FrameTimings::new(0), 0.0);
        assert!(!Profiler::new(NoopSink).is_running());
    }

    #[test]
    fn shared_sink_collects() {
        let shared = Rc::new(RefCell::new(Collect::default()));
        let mut profiler = Profiler::new(Rc::clone(&shared));
        assert!(profiler.is_running());
        profiler.add_timings(&FrameTimings::new(0), 30.0);
        assert_eq!(shared.borrow().counters.len(), 1);
    }

    #[test]
    fn fps_needs_four_frames() {
        let ring = ring_with_frames(4, 16_667, 16_667, true);
        assert_eq!(fps(&ring), 0.0);
    }

    #[test]
    fn fps_from_presentation_times() {
        let ring = ring_with_frames(11, 20_000, 20_000, true);
        let fps = fps(&ring);
        assert!((fps - 50.0).abs() < 1e-9, "fps = {fps}");
    }

    #[test]
    fn fps_falls_back_to_frame_times() {
        let ring = ring_with_frames(6, 10_000, 0, false);
        let fps = fps(&ring);
        assert!((fps - 100.0).abs() < 1e-9, "fps = {fps}");
    }

    #[test]
    fn fps_without_any_interval_is_zero() {
        let ring = ring_with_frames(6, 0, 0, false);
        assert_eq!(fps(&ring), 0.0);
    }

    #[test]
    fn fps_ignores_incomplete_tail() {
        let mut ring = ring_with_frames(6, 10_000, 10_000, false);
        ring.begin_frame().set_frame_time(1_000_000);
        let fps = fps(&ring);
        assert!((fps - 100.0).abs() < 1e-9, "fps = {fps}");
    }
}
