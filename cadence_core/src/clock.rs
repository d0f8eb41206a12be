// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame clock.
//!
//! A [`FrameClock`] collects phase requests, asks its [`Backend`] for a
//! wakeup, and on [`dispatch`](FrameClock::dispatch) runs one frame: it rolls
//! the timings history forward, samples the animation clock and then walks
//! the requested phases in fixed order, notifying each phase's observers.
//!
//! ```text
//!   request_phase / begin_updating
//!       │
//!       ▼
//!   Idle ──► Scheduled ──(backend wakeup: dispatch)──► InFrame(phase…)
//!    ▲           ▲                                         │
//!    │           └──────── more work pending ──────────────┤
//!    └──────────────────── nothing pending ────────────────┘
//!
//!   freeze ──► Frozen (requests accumulate) ──thaw──► Scheduled / Idle
//! ```
//!
//! Everything runs on one thread. Observers receive `&mut FrameClock` and may
//! request phases, toggle updating, freeze or thaw; anything they request
//! lands in the *next* frame.

use crate::backend::Backend;
use crate::config::FrameClockConfig;
use crate::error::ClockError;
use crate::format::TimingsLine;
use crate::observer::{ObserverId, ObserverRegistry};
use crate::phase::{Phase, Phases};
use crate::predict::{RefreshInfo, RefreshPredictor};
use crate::profiler::{self, Profiler, ProfilerSink};
use crate::ring::TimingsRing;
use crate::smoothing::smooth_frame_time;
use crate::timings::{FrameTimings, TimingsMut};

/// Observable scheduling state of a clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClockState {
    /// Nothing pending.
    Idle,
    /// A wakeup has been requested from the backend.
    Scheduled,
    /// A frame is being processed; the phase is the one being dispatched.
    InFrame(Phase),
    /// Frozen; requests accumulate until the last `thaw`.
    Frozen,
}

/// Paces observers' update, layout and paint work to the display.
pub struct FrameClock<B: Backend> {
    backend: B,
    config: FrameClockConfig,
    ring: TimingsRing,
    observers: ObserverRegistry<Self>,
    profiler: Profiler,
    /// Phases requested for the next frame.
    requested: Phases,
    updating_count: u32,
    freeze_count: u32,
    /// A backend wakeup is outstanding.
    scheduled: bool,
    /// Set for the whole duration of a frame.
    current_phase: Option<Phase>,
    /// Animation clock: the frame's sample while in a frame, a cached
    /// reading otherwise. `0` until first sampled.
    frame_time: i64,
    /// Smoothed frame time of the previous frame, `0` before the first.
    smoothed_base: i64,
    /// The clock went idle since the previous frame.
    slept: bool,
    /// The next frame follows a thaw.
    paint_is_thaw: bool,
}

impl<B: Backend> core::fmt::Debug for FrameClock<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameClock")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("frame_counter", &self.ring.frame_counter())
            .field("requested", &self.requested)
            .field("updating_count", &self.updating_count)
            .field("freeze_count", &self.freeze_count)
            .field("frame_time", &self.frame_time)
            .field("observers", &self.observers)
            .field("profiler", &self.profiler)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> FrameClock<B> {
    /// Creates an idle clock driven by `backend`.
    #[must_use]
    pub fn new(backend: B, config: FrameClockConfig) -> Self {
        Self {
            backend,
            config,
            ring: TimingsRing::new(),
            observers: ObserverRegistry::new(),
            profiler: Profiler::none(),
            requested: Phases::NONE,
            updating_count: 0,
            freeze_count: 0,
            scheduled: false,
            current_phase: None,
            frame_time: 0,
            smoothed_base: 0,
            slept: false,
            paint_is_thaw: false,
        }
    }

    /// Creates an idle clock that reports completed frames to `sink`.
    #[must_use]
    pub fn with_profiler(
        backend: B,
        config: FrameClockConfig,
        sink: impl ProfilerSink + 'static,
    ) -> Self {
        Self {
            profiler: Profiler::new(sink),
            ..Self::new(backend, config)
        }
    }

    /// The clock's configuration.
    #[must_use]
    pub fn config(&self) -> &FrameClockConfig {
        &self.config
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The timings history.
    #[must_use]
    pub fn history(&self) -> &TimingsRing {
        &self.ring
    }

    /// Current scheduling state.
    ///
    /// A frame that is already running reports [`ClockState::InFrame`] even
    /// if an observer froze the clock; the freeze takes effect once the frame
    /// finishes.
    #[must_use]
    pub fn state(&self) -> ClockState {
        if let Some(phase) = self.current_phase {
            ClockState::InFrame(phase)
        } else if self.freeze_count > 0 {
            ClockState::Frozen
        } else if self.scheduled {
            ClockState::Scheduled
        } else {
            ClockState::Idle
        }
    }

    /// Phases requested for the next frame, including the implicit
    /// [`UPDATE`](Phases::UPDATE) while updating.
    #[must_use]
    pub fn pending_phases(&self) -> Phases {
        if self.updating_count > 0 {
            self.requested | Phases::UPDATE
        } else {
            self.requested
        }
    }

    /// Number of unbalanced [`begin_updating`](Self::begin_updating) calls.
    #[must_use]
    pub fn updating_count(&self) -> u32 {
        self.updating_count
    }

    /// Number of unbalanced [`freeze`](Self::freeze) calls.
    #[must_use]
    pub fn freeze_count(&self) -> u32 {
        self.freeze_count
    }

    // ---------------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------------

    /// Requests `phases` for the next frame. Requests coalesce.
    ///
    /// [`FLUSH_EVENTS`](Phases::FLUSH_EVENTS) and
    /// [`RESUME_EVENTS`](Phases::RESUME_EVENTS) are meant for the toolkit's
    /// event plumbing, not for application observers.
    pub fn request_phase(&mut self, phases: Phases) {
        self.requested |= phases;
        tracing::trace!(target: "cadence::clock", ?phases, "phase requested");
        self.maybe_schedule();
    }

    /// Starts continuous updating: every frame includes
    /// [`UPDATE`](Phases::UPDATE) until the matching
    /// [`end_updating`](Self::end_updating).
    pub fn begin_updating(&mut self) {
        self.updating_count += 1;
        if self.updating_count == 1 {
            tracing::trace!(target: "cadence::clock", "updating started");
            self.backend.begin_updating();
        }
        self.maybe_schedule();
    }

    /// Balances a [`begin_updating`](Self::begin_updating).
    ///
    /// An unbalanced call panics in debug builds and is ignored (after
    /// logging) in release builds.
    pub fn end_updating(&mut self) {
        if let Err(err) = self.try_end_updating() {
            report_misuse(err);
        }
    }

    /// Balances a [`begin_updating`](Self::begin_updating), reporting an
    /// unbalanced call as an error.
    pub fn try_end_updating(&mut self) -> Result<(), ClockError> {
        if self.updating_count == 0 {
            return Err(ClockError::UpdatingImbalance);
        }
        self.updating_count -= 1;
        if self.updating_count == 0 {
            tracing::trace!(target: "cadence::clock", "updating stopped");
            self.backend.end_updating();
            if self.scheduled && self.pending_phases().is_empty() {
                self.scheduled = false;
                self.go_idle();
            }
        }
        Ok(())
    }

    /// Suspends frame processing. Nests; a frame already running finishes.
    pub fn freeze(&mut self) {
        self.freeze_count += 1;
        if self.freeze_count == 1 {
            tracing::trace!(target: "cadence::clock", "frozen");
            // Outstanding wakeups are void; thaw re-arms.
            self.scheduled = false;
            self.backend.freeze();
        }
    }

    /// Balances a [`freeze`](Self::freeze). The last thaw schedules a frame
    /// if anything is pending.
    ///
    /// An unbalanced call panics in debug builds and is ignored (after
    /// logging) in release builds.
    pub fn thaw(&mut self) {
        if let Err(err) = self.try_thaw() {
            report_misuse(err);
        }
    }

    /// Balances a [`freeze`](Self::freeze), reporting an unbalanced call as
    /// an error.
    pub fn try_thaw(&mut self) -> Result<(), ClockError> {
        if self.freeze_count == 0 {
            return Err(ClockError::FreezeImbalance);
        }
        self.freeze_count -= 1;
        if self.freeze_count == 0 {
            tracing::trace!(target: "cadence::clock", "thawed");
            self.backend.thaw();
            self.maybe_schedule();
            // Only the frame the thaw itself wakes up is vsync related.
            self.paint_is_thaw = self.scheduled || self.current_phase.is_some();
        }
        Ok(())
    }

    fn maybe_schedule(&mut self) {
        if self.scheduled || self.current_phase.is_some() || self.freeze_count > 0 {
            return;
        }
        let pending = self.pending_phases();
        if pending.is_empty() {
            return;
        }
        self.scheduled = true;
        tracing::trace!(target: "cadence::clock", phases = ?pending, "wakeup requested");
        self.backend.request_phase(pending);
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    /// Connects `callback` to `phase`. Observers of one phase run in
    /// connection order.
    pub fn connect(
        &mut self,
        phase: Phase,
        callback: impl FnMut(&mut Self) + 'static,
    ) -> ObserverId {
        self.observers.connect(phase, callback)
    }

    /// Disconnects an observer. Returns `false` if it was not connected.
    ///
    /// Disconnecting an observer whose phase is being dispatched keeps it
    /// from running if it has not run yet.
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.disconnect(observer)
    }

    fn observers_of(clock: &mut Self) -> &mut ObserverRegistry<Self> {
        &mut clock.observers
    }

    // ---------------------------------------------------------------------
    // Frame processing
    // ---------------------------------------------------------------------

    /// Handles a backend wakeup: runs one frame if one is scheduled.
    ///
    /// Returns `true` if a frame ran. Nothing happens while frozen, while a
    /// frame is already running, or when no wakeup was requested.
    pub fn dispatch(&mut self) -> bool {
        if self.current_phase.is_some() {
            tracing::warn!(target: "cadence::clock", "dispatch called from inside a frame");
            return false;
        }
        if self.freeze_count > 0 || !self.scheduled {
            return false;
        }
        self.scheduled = false;
        if self.pending_phases().is_empty() {
            tracing::trace!(target: "cadence::clock", "nothing pending; sleeping");
            self.go_idle();
            return false;
        }
        self.process_frame();
        true
    }

    fn process_frame(&mut self) {
        let mut phases = core::mem::take(&mut self.requested);
        if self.updating_count > 0 {
            phases |= Phases::UPDATE;
        }
        self.current_phase = Some(Phase::FlushEvents);

        let interval = self
            .ring
            .current()
            .map(FrameTimings::refresh_interval)
            .filter(|&interval| interval > 0)
            .unwrap_or(self.config.default_refresh_interval);
        let now = self.backend.now();
        let smoothed = if self.smoothed_base == 0 {
            now
        } else {
            smooth_frame_time(now, self.paint_is_thaw, self.smoothed_base, interval)
        };
        self.smoothed_base = smoothed;
        self.paint_is_thaw = false;
        self.frame_time = now;
        let slept = core::mem::take(&mut self.slept);

        self.ring
            .begin_frame()
            .set_frame_time(now)
            .set_smoothed_frame_time(smoothed)
            .set_slept_before(slept);
        let counter = self.ring.frame_counter();
        tracing::trace!(target: "cadence::clock", frame = counter, ?phases, "frame started");

        for phase in phases.phases() {
            self.current_phase = Some(phase);
            match phase {
                Phase::Layout => {
                    let time = self.backend.now();
                    self.stamp_current(|t| {
                        t.set_layout_start_time(time);
                    });
                }
                Phase::Paint => {
                    let time = self.backend.now();
                    self.stamp_current(|t| {
                        t.set_paint_start_time(time);
                    });
                }
                _ => {}
            }
            ObserverRegistry::dispatch(self, phase, Self::observers_of);
        }

        let end = self.backend.now();
        self.stamp_current(|t| {
            t.set_frame_end_time(end);
        });
        self.current_phase = None;
        tracing::trace!(target: "cadence::clock", frame = counter, "frame finished");

        if !self.backend.reports_presentation() {
            self.complete_timings(counter);
        }

        self.maybe_schedule();
        if !self.scheduled {
            self.go_idle();
        }
    }

    fn go_idle(&mut self) {
        self.slept = true;
        self.paint_is_thaw = false;
    }

    /// Writes to the current frame's record unless it was already completed.
    fn stamp_current(&mut self, f: impl FnOnce(&mut TimingsMut<'_>)) {
        if let Some(mut timings) = self.ring.mutator(self.ring.frame_counter())
            && !timings.timings().complete()
        {
            f(&mut timings);
        }
    }

    // ---------------------------------------------------------------------
    // Time and history
    // ---------------------------------------------------------------------

    /// The animation clock, in microseconds.
    ///
    /// Constant for the duration of a frame. Outside a frame it returns the
    /// last sample until the backend's clock has moved more than
    /// [`frame_time_staleness`](FrameClockConfig::frame_time_staleness) past
    /// it, so back-to-back calls agree.
    pub fn frame_time(&mut self) -> i64 {
        if self.current_phase.is_some() {
            return self.frame_time;
        }
        let now = self.backend.now();
        if self.frame_time == 0 || now - self.frame_time > self.config.frame_time_staleness {
            self.frame_time = now;
        }
        self.frame_time
    }

    /// Counter of the current frame while in a frame, of the latest frame
    /// otherwise; `-1` before the first frame.
    #[must_use]
    pub fn frame_counter(&self) -> i64 {
        self.ring.frame_counter()
    }

    /// Oldest counter still in the history.
    #[must_use]
    pub fn history_start(&self) -> i64 {
        self.ring.history_start()
    }

    /// Record for `counter`, if still in the history.
    #[must_use]
    pub fn timings(&self, counter: i64) -> Option<&FrameTimings> {
        self.ring.get(counter)
    }

    /// Record for the latest frame.
    #[must_use]
    pub fn current_timings(&self) -> Option<&FrameTimings> {
        self.ring.current()
    }

    /// Write access to the record for `counter`, for the backend to report
    /// drawn and presentation information.
    pub fn timings_mut(&mut self, counter: i64) -> Option<TimingsMut<'_>> {
        self.ring.mutator(counter)
    }

    /// Marks the record for `counter` complete and hands it to the profiler.
    ///
    /// Returns `false` if the record is gone or was already complete.
    pub fn complete_timings(&mut self, counter: i64) -> bool {
        let Some(mut timings) = self.ring.mutator(counter) else {
            return false;
        };
        if timings.timings().complete() {
            return false;
        }
        timings.mark_complete();
        let timings = timings.timings();

        if self.profiler.is_running() {
            let fps = profiler::fps(&self.ring);
            self.profiler.add_timings(timings, fps);
        }
        if self.config.debug_timings {
            let previous = self.ring.get(counter - 1);
            tracing::debug!(
                target: "cadence::timings",
                "{}",
                TimingsLine::new(timings, previous)
            );
        }
        true
    }

    /// Predicts the next presentation after `base_time`.
    #[must_use]
    pub fn refresh_info(&self, base_time: i64) -> RefreshInfo {
        RefreshPredictor {
            default_refresh_interval: self.config.default_refresh_interval,
            max_history_age: self.config.max_history_age,
        }
        .predict(&self.ring, base_time)
    }

    /// Frames per second over the history; see [`profiler::fps`].
    #[must_use]
    pub fn fps(&self) -> f64 {
        profiler::fps(&self.ring)
    }
}

#[track_caller]
fn report_misuse(err: ClockError) {
    tracing::error!(target: "cadence::clock", error = %err, "unbalanced clock call");
    if cfg!(debug_assertions) {
        panic!("{err}");
    }
}
