// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded history of timing records.
//!
//! The [`TimingsRing`] keeps the [`RING_CAPACITY`] most recent
//! [`FrameTimings`], addressed by frame counter. When the ring is full the
//! oldest slot is reused: if the ring holds the only handle to the evicted
//! record its storage is reset in place, otherwise the ring lets go of it
//! (external holders keep it alive) and allocates a fresh one.

use crate::timings::{FrameTimings, TimingsMut};

/// Number of frames of history kept by a clock.
pub const RING_CAPACITY: usize = 16;

/// Fixed-capacity FIFO of timing records indexed by frame counter.
#[derive(Debug)]
pub struct TimingsRing {
    slots: [Option<FrameTimings>; RING_CAPACITY],
    /// Slot holding the newest record.
    current: usize,
    /// Populated slots, at most [`RING_CAPACITY`].
    n_timings: usize,
    /// Counter of the newest record, `-1` before the first frame.
    frame_counter: i64,
    /// Records allocated over the ring's lifetime.
    allocations: u64,
}

impl Default for TimingsRing {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingsRing {
    /// Creates an empty ring.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [const { None }; RING_CAPACITY],
            current: 0,
            n_timings: 0,
            frame_counter: -1,
            allocations: 0,
        }
    }

    /// Counter of the newest record, or `-1` if no frame has begun.
    #[inline]
    #[must_use]
    pub fn frame_counter(&self) -> i64 {
        self.frame_counter
    }

    /// Oldest reachable counter: `frame_counter + 1 - len`.
    #[inline]
    #[must_use]
    pub fn history_start(&self) -> i64 {
        self.frame_counter + 1 - self.n_timings as i64
    }

    /// Number of reachable records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_timings
    }

    /// Returns `true` before the first frame.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_timings == 0
    }

    /// Number of records allocated so far (as opposed to recycled).
    #[inline]
    #[must_use]
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Starts a new frame and returns a mutator for its record.
    ///
    /// The returned record is newborn: only its counter is set.
    pub fn begin_frame(&mut self) -> TimingsMut<'_> {
        self.frame_counter += 1;
        let counter = self.frame_counter;

        if self.n_timings > 0 {
            self.current = (self.current + 1) % RING_CAPACITY;
        }
        if self.n_timings < RING_CAPACITY {
            self.n_timings += 1;
        }

        let slot = &mut self.slots[self.current];
        if !slot
            .as_mut()
            .is_some_and(|timings| timings.try_recycle(counter))
        {
            // Evicted record is still shared, or the slot was never filled.
            *slot = None;
            self.allocations += 1;
        }
        TimingsMut::new(slot.get_or_insert_with(|| FrameTimings::new(counter)))
    }

    /// Slot index of `counter`, if it lies in the reachable window.
    fn slot_of(&self, counter: i64) -> Option<usize> {
        if self.n_timings == 0 || counter > self.frame_counter || counter < self.history_start() {
            return None;
        }
        let back = self.frame_counter - counter;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "rem_euclid keeps the index below RING_CAPACITY"
        )]
        let index = (self.current as i64 - back).rem_euclid(RING_CAPACITY as i64) as usize;
        Some(index)
    }

    /// Returns the record for `counter` if it is still reachable.
    #[must_use]
    pub fn get(&self, counter: i64) -> Option<&FrameTimings> {
        self.slot_of(counter)
            .and_then(|index| self.slots[index].as_ref())
    }

    /// Returns a mutator for the record for `counter` if it is still
    /// reachable.
    pub(crate) fn mutator(&self, counter: i64) -> Option<TimingsMut<'_>> {
        self.get(counter).map(TimingsMut::new)
    }

    /// Returns the newest record.
    #[must_use]
    pub fn current(&self) -> Option<&FrameTimings> {
        self.get(self.frame_counter)
    }

    /// Iterates over the reachable records from newest to oldest.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &FrameTimings> + '_ {
        (self.history_start()..=self.frame_counter)
            .rev()
            .filter_map(|counter| self.get(counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring() {
        let ring = TimingsRing::new();
        assert!(ring.is_empty());
        assert_eq!(ring.frame_counter(), -1);
        assert_eq!(ring.history_start(), 0);
        assert!(ring.get(0).is_none());
        assert!(ring.get(-1).is_none());
        assert!(ring.current().is_none());
    }

    #[test]
    fn begin_frame_assigns_sequential_counters() {
        let mut ring = TimingsRing::new();
        for expected in 0..5 {
            let counter = ring.begin_frame().timings().frame_counter();
            assert_eq!(counter, expected);
        }
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.history_start(), 0);
        for counter in 0..5 {
            assert_eq!(ring.get(counter).map(FrameTimings::frame_counter), Some(counter));
        }
    }

    #[test]
    fn window_slides_after_capacity() {
        let mut ring = TimingsRing::new();
        for _ in 0..20 {
            ring.begin_frame();
        }
        assert_eq!(ring.frame_counter(), 19);
        assert_eq!(ring.history_start(), 4);
        assert!(ring.get(3).is_none());
        assert!(ring.get(20).is_none());
        for counter in 4..=19 {
            assert_eq!(ring.get(counter).map(FrameTimings::frame_counter), Some(counter));
        }
    }

    #[test]
    fn unreferenced_records_are_recycled() {
        let mut ring = TimingsRing::new();
        for _ in 0..RING_CAPACITY {
            ring.begin_frame();
        }
        assert_eq!(ring.allocations(), RING_CAPACITY as u64);

        for _ in 0..3 * RING_CAPACITY {
            ring.begin_frame();
        }
        assert_eq!(ring.allocations(), RING_CAPACITY as u64);
    }

    #[test]
    fn held_records_are_not_recycled() {
        let mut ring = TimingsRing::new();
        ring.begin_frame().set_refresh_interval(16_667);
        let held = ring.get(0).cloned();
        for _ in 0..RING_CAPACITY {
            ring.begin_frame();
        }
        assert_eq!(ring.allocations(), RING_CAPACITY as u64 + 1);
        let held = held.unwrap();
        assert_eq!(held.frame_counter(), 0);
        assert_eq!(held.refresh_interval(), 16_667);
        assert_eq!(held.ref_count(), 1);
        assert!(ring.get(0).is_none());
        assert!(!ring.get(RING_CAPACITY as i64).unwrap().ptr_eq(&held));
    }

    #[test]
    fn recycled_record_is_newborn() {
        let mut ring = TimingsRing::new();
        ring.begin_frame().set_presentation_time(1_000).mark_complete();
        for _ in 1..RING_CAPACITY {
            ring.begin_frame();
        }
        let reused = ring.begin_frame();
        let timings = reused.timings();
        assert_eq!(timings.frame_counter(), RING_CAPACITY as i64);
        assert_eq!(timings.presentation_time(), 0);
        assert!(!timings.complete());
    }

    #[test]
    fn newest_first_iteration() {
        let mut ring = TimingsRing::new();
        for _ in 0..18 {
            ring.begin_frame();
        }
        let counters: Vec<_> = ring.iter_newest_first().map(FrameTimings::frame_counter).collect();
        let expected: Vec<_> = (2..18).rev().collect();
        assert_eq!(counters, expected);
    }
}
