// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! The clock never talks to the display itself. A *backend* supplies the
//! pieces that are platform specific:
//!
//! - **Time**: [`Backend::now`] reads the platform's monotonic clock in
//!   microseconds. `0` is reserved as the "not available" sentinel, so a
//!   backend must never return it.
//!
//! - **Wakeups**: [`Backend::request_phase`] is called when the clock goes
//!   from idle to scheduled. The backend arms whatever mechanism delivers
//!   the next vblank (a frame callback, a display link, a timer) and, when it
//!   fires, calls [`FrameClock::dispatch`].
//!
//! - **Hints**: the updating and freeze hooks tell the backend that frames
//!   will be wanted continuously, or not at all, so it can keep a display
//!   link running or stop it.
//!
//! - **Feedback**: after a frame, the backend writes drawn and presentation
//!   times through [`FrameClock::timings_mut`] and, if it
//!   [reports presentation](Backend::reports_presentation), completes the
//!   record with [`FrameClock::complete_timings`].
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_vblank(clock: &mut FrameClock<MyBackend>, presented_at: i64) {
//!     let last = clock.frame_counter();
//!     if let Some(mut timings) = clock.timings_mut(last) {
//!         timings.set_presentation_time(presented_at);
//!     }
//!     clock.complete_timings(last);
//!     clock.dispatch();
//! }
//! ```
//!
//! [`FrameClock::dispatch`]: crate::clock::FrameClock::dispatch
//! [`FrameClock::timings_mut`]: crate::clock::FrameClock::timings_mut
//! [`FrameClock::complete_timings`]: crate::clock::FrameClock::complete_timings

use std::time::Instant;

use crate::phase::Phases;

/// Platform hooks driven by a [`FrameClock`](crate::clock::FrameClock).
///
/// Only [`now`](Backend::now) is required; the hooks default to no-ops.
pub trait Backend {
    /// Current monotonic time in microseconds. Must be nonzero.
    fn now(&mut self) -> i64;

    /// Arms a wakeup; `phases` is the pending set at the time of the request.
    fn request_phase(&mut self, phases: Phases) {
        let _ = phases;
    }

    /// Continuous updating started.
    fn begin_updating(&mut self) {}

    /// Continuous updating stopped.
    fn end_updating(&mut self) {}

    /// The clock was frozen. Any armed wakeup may be dropped; the clock
    /// requests a new one after the last thaw.
    fn freeze(&mut self) {}

    /// The clock was thawed.
    fn thaw(&mut self) {}

    /// Whether this backend completes timings itself once presentation
    /// feedback arrives. If `false`, the clock completes each record at the
    /// end of its frame.
    fn reports_presentation(&self) -> bool {
        false
    }
}

/// A backend over [`std::time::Instant`] with no display feedback.
///
/// Suitable for headless loops and tests that want real time. The event loop
/// polls [`take_wakeup`](Self::take_wakeup) to learn that a frame is wanted.
#[derive(Debug)]
pub struct SystemBackend {
    origin: Instant,
    wakeup_armed: bool,
}

impl Default for SystemBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBackend {
    /// Creates a backend whose timeline starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wakeup_armed: false,
        }
    }

    /// Returns `true` if a wakeup is armed.
    #[must_use]
    pub fn wakeup_armed(&self) -> bool {
        self.wakeup_armed
    }

    /// Consumes the armed wakeup, returning whether there was one.
    pub fn take_wakeup(&mut self) -> bool {
        core::mem::take(&mut self.wakeup_armed)
    }
}

impl Backend for SystemBackend {
    fn now(&mut self) -> i64 {
        let micros = i64::try_from(self.origin.elapsed().as_micros()).unwrap_or(i64::MAX - 1);
        micros + 1
    }

    fn request_phase(&mut self, _phases: Phases) {
        self.wakeup_armed = true;
    }

    fn freeze(&mut self) {
        self.wakeup_armed = false;
    }
}
