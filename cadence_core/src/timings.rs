// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame timing records.
//!
//! A [`FrameTimings`] is a shared handle to one frame's bag of timestamps.
//! Cloning the handle takes a reference and dropping it releases one; the
//! record is freed when the last handle goes away. The clock's
//! [`TimingsRing`](crate::ring::TimingsRing) holds one handle per slot and
//! recycles a slot's storage in place when nobody else holds it (see
//! [`FrameTimings::try_recycle`]).
//!
//! All timestamps are microseconds on the backend's monotonic timeline. A
//! value of `0` means "not available" and must never be read as an epoch.
//!
//! Handles are read-only. Fields are written through a [`TimingsMut`], which
//! only the ring and the owning [`FrameClock`](crate::clock::FrameClock) hand
//! out. Once a record is [complete](FrameTimings::complete), writes are
//! ignored until the record is recycled.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// The raw field set of one timings record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Fields {
    frame_counter: i64,
    cookie: u64,
    complete: bool,
    slept_before: bool,
    frame_time: i64,
    smoothed_frame_time: i64,
    drawn_time: i64,
    presentation_time: i64,
    predicted_presentation_time: i64,
    refresh_interval: i64,
    layout_start_time: i64,
    paint_start_time: i64,
    frame_end_time: i64,
}

impl Fields {
    fn newborn(frame_counter: i64) -> Self {
        Self {
            frame_counter,
            ..Self::default()
        }
    }
}

/// A reference-counted timing record for a single frame.
///
/// `Clone` is the "ref" operation and `Drop` is the "unref" operation.
#[derive(Clone)]
pub struct FrameTimings {
    inner: Rc<Cell<Fields>>,
}

impl FrameTimings {
    /// Allocates a zeroed record for `frame_counter` with a single reference.
    #[must_use]
    pub fn new(frame_counter: i64) -> Self {
        Self {
            inner: Rc::new(Cell::new(Fields::newborn(frame_counter))),
        }
    }

    /// Number of live handles to this record.
    #[inline]
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Returns `true` if both handles refer to the same underlying storage.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Resets the record to its newborn state for `frame_counter`, but only
    /// if this handle is the sole reference.
    ///
    /// Returns `false` (and leaves the record untouched) when any other
    /// handle is alive.
    pub fn try_recycle(&mut self, frame_counter: i64) -> bool {
        match Rc::get_mut(&mut self.inner) {
            Some(cell) => {
                *cell.get_mut() = Fields::newborn(frame_counter);
                true
            }
            None => false,
        }
    }

    #[inline]
    fn fields(&self) -> Fields {
        self.inner.get()
    }

    /// Applies `f` to the fields unless the record is already complete.
    fn update(&self, f: impl FnOnce(&mut Fields)) {
        let mut fields = self.inner.get();
        if fields.complete {
            debug_assert!(
                !fields.complete,
                "frame {} timings mutated after completion",
                fields.frame_counter
            );
            return;
        }
        f(&mut fields);
        self.inner.set(fields);
    }

    /// The frame counter this record describes.
    #[inline]
    #[must_use]
    pub fn frame_counter(&self) -> i64 {
        self.fields().frame_counter
    }

    /// Opaque backend correlator (e.g. a swap or commit serial).
    #[inline]
    #[must_use]
    pub fn cookie(&self) -> u64 {
        self.fields().cookie
    }

    /// Whether all information for this frame has been collected.
    ///
    /// Once this returns `true`, no other accessor's value will change until
    /// the record is recycled.
    #[inline]
    #[must_use]
    pub fn complete(&self) -> bool {
        self.fields().complete
    }

    /// Whether the clock was idle between the previous frame and this one.
    #[inline]
    #[must_use]
    pub fn slept_before(&self) -> bool {
        self.fields().slept_before
    }

    /// The animation clock sample this frame was started with.
    #[inline]
    #[must_use]
    pub fn frame_time(&self) -> i64 {
        self.fields().frame_time
    }

    /// The frame time after jitter smoothing.
    #[inline]
    #[must_use]
    pub fn smoothed_frame_time(&self) -> i64 {
        self.fields().smoothed_frame_time
    }

    /// When drawing finished, or `0`.
    #[inline]
    #[must_use]
    pub fn drawn_time(&self) -> i64 {
        self.fields().drawn_time
    }

    /// When the frame became visible, or `0`.
    #[inline]
    #[must_use]
    pub fn presentation_time(&self) -> i64 {
        self.fields().presentation_time
    }

    /// When the frame was predicted to become visible, or `0`.
    #[inline]
    #[must_use]
    pub fn predicted_presentation_time(&self) -> i64 {
        self.fields().predicted_presentation_time
    }

    /// The display's natural presentation interval, or `0` if unknown.
    #[inline]
    #[must_use]
    pub fn refresh_interval(&self) -> i64 {
        self.fields().refresh_interval
    }

    /// When the layout phase started, or `0` if it did not run.
    #[inline]
    #[must_use]
    pub fn layout_start_time(&self) -> i64 {
        self.fields().layout_start_time
    }

    /// When the paint phase started, or `0` if it did not run.
    #[inline]
    #[must_use]
    pub fn paint_start_time(&self) -> i64 {
        self.fields().paint_start_time
    }

    /// When the last phase of the frame finished, or `0`.
    #[inline]
    #[must_use]
    pub fn frame_end_time(&self) -> i64 {
        self.fields().frame_end_time
    }
}

impl fmt::Debug for FrameTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields();
        f.debug_struct("FrameTimings")
            .field("frame_counter", &fields.frame_counter)
            .field("cookie", &fields.cookie)
            .field("complete", &fields.complete)
            .field("slept_before", &fields.slept_before)
            .field("frame_time", &fields.frame_time)
            .field("smoothed_frame_time", &fields.smoothed_frame_time)
            .field("drawn_time", &fields.drawn_time)
            .field("presentation_time", &fields.presentation_time)
            .field(
                "predicted_presentation_time",
                &fields.predicted_presentation_time,
            )
            .field("refresh_interval", &fields.refresh_interval)
            .field("layout_start_time", &fields.layout_start_time)
            .field("paint_start_time", &fields.paint_start_time)
            .field("frame_end_time", &fields.frame_end_time)
            .finish()
    }
}

/// Write access to a timings record held in the clock's history.
///
/// Obtained from [`FrameClock::timings_mut`](crate::clock::FrameClock::timings_mut)
/// by the code driving the clock (usually the platform backend glue). The
/// public setters cover what a backend learns after the fact; the phase
/// landmarks are written by the clock itself.
///
/// Writes to a complete record are dropped.
#[derive(Debug)]
pub struct TimingsMut<'a> {
    timings: &'a FrameTimings,
}

impl<'a> TimingsMut<'a> {
    pub(crate) fn new(timings: &'a FrameTimings) -> Self {
        Self { timings }
    }

    /// Returns a read-only view of the record.
    #[must_use]
    pub fn timings(&self) -> &'a FrameTimings {
        self.timings
    }

    /// Sets the backend correlator.
    pub fn set_cookie(&mut self, cookie: u64) -> &mut Self {
        self.timings.update(|f| f.cookie = cookie);
        self
    }

    /// Records when drawing finished.
    pub fn set_drawn_time(&mut self, time: i64) -> &mut Self {
        self.timings.update(|f| f.drawn_time = time);
        self
    }

    /// Records when the frame became visible.
    pub fn set_presentation_time(&mut self, time: i64) -> &mut Self {
        self.timings.update(|f| f.presentation_time = time);
        self
    }

    /// Records when the frame is expected to become visible.
    pub fn set_predicted_presentation_time(&mut self, time: i64) -> &mut Self {
        self.timings.update(|f| f.predicted_presentation_time = time);
        self
    }

    /// Records the display's refresh interval. Negative values are stored as
    /// `0` (unknown).
    pub fn set_refresh_interval(&mut self, interval: i64) -> &mut Self {
        self.timings.update(|f| f.refresh_interval = interval.max(0));
        self
    }

    pub(crate) fn set_frame_time(&mut self, time: i64) -> &mut Self {
        self.timings.update(|f| f.frame_time = time);
        self
    }

    pub(crate) fn set_smoothed_frame_time(&mut self, time: i64) -> &mut Self {
        self.timings.update(|f| f.smoothed_frame_time = time);
        self
    }

    pub(crate) fn set_slept_before(&mut self, slept: bool) -> &mut Self {
        self.timings.update(|f| f.slept_before = slept);
        self
    }

    pub(crate) fn set_layout_start_time(&mut self, time: i64) -> &mut Self {
        self.timings.update(|f| f.layout_start_time = time);
        self
    }

    pub(crate) fn set_paint_start_time(&mut self, time: i64) -> &mut Self {
        self.timings.update(|f| f.paint_start_time = time);
        self
    }

    pub(crate) fn set_frame_end_time(&mut self, time: i64) -> &mut Self {
        self.timings.update(|f| f.frame_end_time = time);
        self
    }

    pub(crate) fn mark_complete(&mut self) {
        self.timings.update(|f| f.complete = true);
    }
}
