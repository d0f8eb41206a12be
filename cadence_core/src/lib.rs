// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame clock: phase scheduling and frame timing history for UI toolkits.
//!
//! `cadence_core` paces a toolkit's per-frame work to the display. Widgets
//! and animations ask for phases; a platform backend decides when the next
//! frame may start; the clock runs the requested phases in a fixed order and
//! keeps a short history of what each frame looked like.
//!
//! # Architecture
//!
//! ```text
//!   Observers ──request_phase / begin_updating──► FrameClock ──► Backend::request_phase
//!                                                     ▲                  │
//!                                                     └──── dispatch ◄───┘ (vblank)
//!                                                     │
//!       FLUSH_EVENTS ► BEFORE_PAINT ► UPDATE ► LAYOUT ► PAINT ► AFTER_PAINT ► RESUME_EVENTS
//!                                                     │
//!                                                     ▼
//!   TimingsRing (16 × FrameTimings) ◄── TimingsMut ◄── backend feedback
//!        │                 │
//!        ▼                 ▼
//!   RefreshPredictor    Profiler (marks, fps) / TimingsLine (debug log)
//! ```
//!
//! **[`timings`]**: Reference-counted per-frame records. `0` means "not
//! available" for every timestamp.
//!
//! **[`ring`]**: The bounded history, indexed by frame counter, which
//! recycles records nobody else holds.
//!
//! **[`predict`]**: Next presentation time from recent presentation
//! feedback.
//!
//! **[`smoothing`]**: Snaps frame times to the refresh grid.
//!
//! **[`phase`]**: The [`Phase`] sequence and the [`Phases`] bitset.
//!
//! **[`observer`]**: Per-phase observer lists with panic isolation.
//!
//! **[`backend`]**: The [`Backend`] trait and a [`SystemBackend`] over
//! `std::time::Instant`.
//!
//! **[`clock`]**: [`FrameClock`], the scheduler tying it together.
//!
//! **[`profiler`]**: [`ProfilerSink`] trait, marks per completed frame and
//! the FPS estimate.
//!
//! **[`format`]**: One-line human readable dump of a record.
//!
//! # Logging
//!
//! The crate logs through [`tracing`]. Scheduling decisions are `trace!`
//! events and misuse is `error!` under the `cadence::clock` target. With
//! [`FrameClockConfig::debug_timings`] set, every completed frame is logged
//! at `debug!` under `cadence::timings`.
//!
//! # Threading
//!
//! A clock and its records are single threaded (`!Send`, `!Sync`).

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod observer;
pub mod phase;
pub mod predict;
pub mod profiler;
pub mod ring;
pub mod smoothing;
pub mod timings;

pub use backend::{Backend, SystemBackend};
pub use clock::{ClockState, FrameClock};
pub use config::FrameClockConfig;
pub use error::ClockError;
pub use format::{TimingsLine, format_timings};
pub use observer::ObserverId;
pub use phase::{Phase, Phases};
pub use predict::{DEFAULT_REFRESH_INTERVAL, MAX_HISTORY_AGE, RefreshInfo, RefreshPredictor};
pub use profiler::{NoopSink, Profiler, ProfilerSink};
pub use ring::{RING_CAPACITY, TimingsRing};
pub use timings::{FrameTimings, TimingsMut};
