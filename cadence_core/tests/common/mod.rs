// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic backend for driving a clock from tests.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use std::cell::RefCell;
use std::rc::Rc;

use cadence_core::{Backend, FrameClock, FrameClockConfig, Phase, Phases};

/// Backend whose time only moves when the test moves it.
#[derive(Debug)]
pub(crate) struct ManualBackend {
    /// Current time in microseconds.
    pub(crate) now: i64,
    /// Whether presentation feedback completes records.
    pub(crate) reports_presentation: bool,
    /// Pending set passed with every wakeup request.
    pub(crate) wakeups: Vec<Phases>,
    /// Between the backend's begin/end updating hooks.
    pub(crate) updating: bool,
    /// Between the backend's freeze/thaw hooks.
    pub(crate) frozen: bool,
}

impl Default for ManualBackend {
    fn default() -> Self {
        Self {
            now: 1_000_000,
            reports_presentation: false,
            wakeups: Vec::new(),
            updating: false,
            frozen: false,
        }
    }
}

impl Backend for ManualBackend {
    fn now(&mut self) -> i64 {
        self.now
    }

    fn request_phase(&mut self, phases: Phases) {
        self.wakeups.push(phases);
    }

    fn begin_updating(&mut self) {
        self.updating = true;
    }

    fn end_updating(&mut self) {
        self.updating = false;
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn thaw(&mut self) {
        self.frozen = false;
    }

    fn reports_presentation(&self) -> bool {
        self.reports_presentation
    }
}

pub(crate) type TestClock = FrameClock<ManualBackend>;

pub(crate) fn clock() -> TestClock {
    FrameClock::new(ManualBackend::default(), FrameClockConfig::new())
}

/// Moves time forward one 60 Hz refresh and delivers a wakeup.
pub(crate) fn vblank(clock: &mut TestClock) -> bool {
    clock.backend_mut().now += 16_667;
    clock.dispatch()
}

/// Log of `(frame_counter, phase)` pairs seen by observers.
pub(crate) type PhaseLog = Rc<RefCell<Vec<(i64, Phase)>>>;

/// Connects a logging observer to every phase.
pub(crate) fn log_all_phases(clock: &mut TestClock) -> PhaseLog {
    let log = PhaseLog::default();
    for phase in Phase::ALL {
        let log = Rc::clone(&log);
        clock.connect(phase, move |clock| {
            log.borrow_mut().push((clock.frame_counter(), phase));
        });
    }
    log
}
