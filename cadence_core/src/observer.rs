// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-phase observer lists.
//!
//! Each phase keeps its observers in registration order. Dispatch takes the
//! list out of the registry while the callbacks run, so a callback receives
//! `&mut` access to its context (the clock) and may connect or disconnect
//! observers, including itself. Observers connected during dispatch first run
//! on the next dispatch of that phase; observers disconnected during dispatch
//! are skipped if they have not run yet.

use std::panic::{self, AssertUnwindSafe};

use crate::phase::Phase;

/// Handle identifying a connected observer.
///
/// Returned by [`FrameClock::connect`](crate::clock::FrameClock::connect) and
/// passed back to `disconnect`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId {
    phase: Phase,
    id: u64,
}

impl ObserverId {
    /// The phase this observer is connected to.
    #[inline]
    #[must_use]
    pub fn phase(self) -> Phase {
        self.phase
    }
}

type Callback<C> = Box<dyn FnMut(&mut C)>;

struct Entry<C> {
    id: u64,
    callback: Callback<C>,
}

/// Observer lists for every phase, generic over the context passed to the
/// callbacks.
pub struct ObserverRegistry<C> {
    lists: [Vec<Entry<C>>; Phase::COUNT],
    next_id: u64,
    /// Phase being dispatched, with the ids of its checked-out observers.
    dispatching: Option<(Phase, Vec<u64>)>,
    /// Ids disconnected while their phase was being dispatched.
    removed: Vec<u64>,
}

impl<C> Default for ObserverRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> core::fmt::Debug for ObserverRegistry<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let counts: Vec<_> = self.lists.iter().map(Vec::len).collect();
        f.debug_struct("ObserverRegistry")
            .field("counts", &counts)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl<C> ObserverRegistry<C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lists: core::array::from_fn(|_| Vec::new()),
            next_id: 0,
            dispatching: None,
            removed: Vec::new(),
        }
    }

    /// Appends `callback` to the list for `phase`.
    pub fn connect(&mut self, phase: Phase, callback: impl FnMut(&mut C) + 'static) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.lists[phase.index()].push(Entry {
            id,
            callback: Box::new(callback),
        });
        ObserverId { phase, id }
    }

    /// Removes an observer. Returns `false` if it was not connected.
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        let list = &mut self.lists[observer.phase.index()];
        if let Some(pos) = list.iter().position(|e| e.id == observer.id) {
            list.remove(pos);
            return true;
        }
        // The phase's list may be checked out for dispatch.
        match &mut self.dispatching {
            Some((phase, checked_out)) if *phase == observer.phase => {
                match checked_out.iter().position(|&id| id == observer.id) {
                    Some(pos) => {
                        checked_out.swap_remove(pos);
                        self.removed.push(observer.id);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Number of observers connected to `phase`.
    #[must_use]
    pub fn len(&self, phase: Phase) -> usize {
        let checked_out = match &self.dispatching {
            Some((p, checked_out)) if *p == phase => checked_out.len(),
            _ => 0,
        };
        self.lists[phase.index()].len() + checked_out
    }

    /// Returns `true` if no observer is connected to `phase`.
    #[must_use]
    pub fn is_empty(&self, phase: Phase) -> bool {
        self.len(phase) == 0
    }

    /// Runs every observer of `phase` in registration order.
    ///
    /// `registry` projects the registry out of the context so callbacks can
    /// reach it through the same `&mut C`. A panicking observer is logged and
    /// skipped; the remaining observers still run. Returns the number of
    /// observers that panicked.
    pub fn dispatch(
        ctx: &mut C,
        phase: Phase,
        registry: impl Fn(&mut C) -> &mut Self,
    ) -> usize {
        let reg = registry(ctx);
        debug_assert!(reg.dispatching.is_none(), "phase dispatch is not reentrant");
        let mut entries = core::mem::take(&mut reg.lists[phase.index()]);
        if entries.is_empty() {
            return 0;
        }
        reg.dispatching = Some((phase, entries.iter().map(|e| e.id).collect()));

        let mut failures = 0;
        for entry in &mut entries {
            if registry(ctx).removed.contains(&entry.id) {
                continue;
            }
            let result = panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(ctx)));
            if result.is_err() {
                failures += 1;
                tracing::warn!(
                    target: "cadence::clock",
                    phase = phase.name(),
                    observer = entry.id,
                    "observer panicked; continuing with remaining observers"
                );
            }
        }

        let reg = registry(ctx);
        reg.dispatching = None;
        let removed = core::mem::take(&mut reg.removed);
        entries.retain(|e| !removed.contains(&e.id));
        let added = core::mem::replace(&mut reg.lists[phase.index()], entries);
        reg.lists[phase.index()].extend(added);
        failures
    }
}
