// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame phases.
//!
//! A frame walks a fixed sequence of phases. [`Phase`] names one of them and
//! [`Phases`] is the bitset used for "requested" state. The bit values are
//! fixed for compatibility with existing toolkits; note that
//! [`AFTER_PAINT`](Phases::AFTER_PAINT) has a larger value than
//! [`RESUME_EVENTS`](Phases::RESUME_EVENTS) even though it runs first.
//!
//! [`FLUSH_EVENTS`](Phases::FLUSH_EVENTS) and
//! [`RESUME_EVENTS`](Phases::RESUME_EVENTS) belong to the toolkit's event
//! plumbing. Applications may request them, but usually should not.

use core::fmt;

use bitflags::bitflags;

use crate::error::ClockError;

bitflags! {
    /// A set of frame phases.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Phases: u32 {
        /// Pending input events should be delivered.
        const FLUSH_EVENTS = 1;
        /// Work that must happen before anything else in the frame.
        const BEFORE_PAINT = 2;
        /// Animations advance to the frame time.
        const UPDATE = 4;
        /// Size allocation.
        const LAYOUT = 8;
        /// Rendering.
        const PAINT = 16;
        /// Event delivery is resumed.
        const RESUME_EVENTS = 32;
        /// Post-paint bookkeeping.
        const AFTER_PAINT = 64;
    }
}

impl Phases {
    /// The empty set.
    pub const NONE: Self = Self::empty();

    /// Converts raw bits, rejecting unknown ones.
    pub fn from_bits_checked(bits: u32) -> Result<Self, ClockError> {
        Self::from_bits(bits).ok_or(ClockError::UnknownPhaseBits(bits & !Self::all().bits()))
    }

    /// Iterates over the contained phases in dispatch order.
    pub fn phases(self) -> impl Iterator<Item = Phase> {
        Phase::ALL
            .into_iter()
            .filter(move |phase| self.contains(phase.bit()))
    }
}

/// A single stage of frame processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// See [`Phases::FLUSH_EVENTS`].
    FlushEvents,
    /// See [`Phases::BEFORE_PAINT`].
    BeforePaint,
    /// See [`Phases::UPDATE`].
    Update,
    /// See [`Phases::LAYOUT`].
    Layout,
    /// See [`Phases::PAINT`].
    Paint,
    /// See [`Phases::AFTER_PAINT`].
    AfterPaint,
    /// See [`Phases::RESUME_EVENTS`].
    ResumeEvents,
}

impl Phase {
    /// Number of phases.
    pub const COUNT: usize = 7;

    /// Every phase, in dispatch order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::FlushEvents,
        Self::BeforePaint,
        Self::Update,
        Self::Layout,
        Self::Paint,
        Self::AfterPaint,
        Self::ResumeEvents,
    ];

    /// The bit for this phase.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> Phases {
        match self {
            Self::FlushEvents => Phases::FLUSH_EVENTS,
            Self::BeforePaint => Phases::BEFORE_PAINT,
            Self::Update => Phases::UPDATE,
            Self::Layout => Phases::LAYOUT,
            Self::Paint => Phases::PAINT,
            Self::AfterPaint => Phases::AFTER_PAINT,
            Self::ResumeEvents => Phases::RESUME_EVENTS,
        }
    }

    /// Position in the dispatch order.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::FlushEvents => 0,
            Self::BeforePaint => 1,
            Self::Update => 2,
            Self::Layout => 3,
            Self::Paint => 4,
            Self::AfterPaint => 5,
            Self::ResumeEvents => 6,
        }
    }

    /// Short lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FlushEvents => "flush-events",
            Self::BeforePaint => "before-paint",
            Self::Update => "update",
            Self::Layout => "layout",
            Self::Paint => "paint",
            Self::AfterPaint => "after-paint",
            Self::ResumeEvents => "resume-events",
        }
    }
}

impl From<Phase> for Phases {
    fn from(phase: Phase) -> Self {
        phase.bit()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
