// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error kinds reported by the frame clock.
//!
//! Most misuse of a [`FrameClock`](crate::clock::FrameClock) is a programmer
//! error: the infallible entry points assert in debug builds and clamp in
//! release builds. The `try_*` variants surface the same conditions as a
//! [`ClockError`] for callers that would rather handle them.

/// Misuse detected by the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ClockError {
    /// A phase bitset contained bits outside the known phases.
    #[error("unknown phase bits {0:#x}")]
    UnknownPhaseBits(u32),
    /// `end_updating` was called more often than `begin_updating`.
    #[error("end_updating() called without a matching begin_updating()")]
    UpdatingImbalance,
    /// `thaw` was called more often than `freeze`.
    #[error("thaw() called without a matching freeze()")]
    FreezeImbalance,
}
