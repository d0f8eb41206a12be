// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of a clock driven by a deterministic backend.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cadence_core::{
    ClockState, DEFAULT_REFRESH_INTERVAL, FrameTimings, Phase, Phases, RING_CAPACITY,
};
use common::{clock, log_all_phases, vblank};

#[test]
fn single_phase_frame() {
    let mut clock = clock();
    let log = log_all_phases(&mut clock);

    clock.request_phase(Phases::UPDATE);
    assert!(vblank(&mut clock));

    assert_eq!(*log.borrow(), [(0, Phase::Update)]);
    assert_eq!(
        clock.current_timings().map(FrameTimings::frame_counter),
        Some(0)
    );
    assert_eq!(clock.state(), ClockState::Idle);
}

#[test]
fn continuous_animation() {
    let mut clock = clock();
    let log = log_all_phases(&mut clock);

    clock.begin_updating();
    for _ in 0..5 {
        assert!(vblank(&mut clock));
    }
    clock.end_updating();
    assert!(!vblank(&mut clock));

    let expected: Vec<_> = (0..5).map(|frame| (frame, Phase::Update)).collect();
    assert_eq!(*log.borrow(), expected);
    assert_eq!(clock.frame_counter(), 4);
    assert!(clock.timings(5).is_none());
}

#[test]
fn ring_eviction() {
    let mut clock = clock();
    clock.begin_updating();
    for _ in 0..20 {
        assert!(vblank(&mut clock));
    }

    assert_eq!(clock.history_start(), 4);
    assert_eq!(clock.frame_counter(), 19);
    assert!(clock.timings(3).is_none());
    for counter in 4..=19 {
        assert_eq!(
            clock.timings(counter).map(FrameTimings::frame_counter),
            Some(counter)
        );
    }
}

#[test]
fn refresh_prediction() {
    let mut clock = clock();
    clock.backend_mut().reports_presentation = true;
    clock.begin_updating();
    for _ in 0..6 {
        assert!(vblank(&mut clock));
    }
    for counter in 0..=5 {
        let mut timings = clock.timings_mut(counter).unwrap();
        timings
            .set_refresh_interval(16_667)
            .set_presentation_time(100_000 + counter * 16_667);
        assert!(clock.complete_timings(counter));
    }

    let info = clock.refresh_info(120_000);
    assert_eq!(info.refresh_interval, 16_667);
    assert_eq!(info.presentation_time, 133_334);
}

#[test]
fn refresh_prediction_without_presentation() {
    let mut clock = clock();
    clock.request_phase(Phases::PAINT);
    vblank(&mut clock);
    let info = clock.refresh_info(clock.backend().now);
    assert_eq!(info.refresh_interval, DEFAULT_REFRESH_INTERVAL);
    assert_eq!(info.presentation_time, 0);
}

#[test]
fn freeze_suppresses_frames() {
    let mut clock = clock();
    let log = log_all_phases(&mut clock);

    clock.freeze();
    clock.request_phase(Phases::PAINT);
    for _ in 0..3 {
        assert!(!vblank(&mut clock));
    }
    assert!(log.borrow().is_empty());
    assert_eq!(clock.state(), ClockState::Frozen);

    clock.thaw();
    assert!(vblank(&mut clock));
    assert_eq!(*log.borrow(), [(0, Phase::Paint)]);
    assert!(!vblank(&mut clock));
}

#[test]
fn request_during_dispatch_lands_in_next_frame() {
    let mut clock = clock();
    let log = log_all_phases(&mut clock);
    clock.connect(Phase::Update, |clock| clock.request_phase(Phases::PAINT));

    clock.request_phase(Phases::UPDATE);
    assert!(vblank(&mut clock));
    assert_eq!(*log.borrow(), [(0, Phase::Update)]);
    assert_eq!(clock.state(), ClockState::Scheduled);

    assert!(vblank(&mut clock));
    assert_eq!(*log.borrow(), [(0, Phase::Update), (1, Phase::Paint)]);
}

#[test]
fn requesting_a_later_phase_mid_frame_does_not_join_the_frame() {
    let mut clock = clock();
    let log = log_all_phases(&mut clock);
    clock.connect(Phase::Layout, |clock| {
        clock.request_phase(Phases::PAINT);
        clock.begin_updating();
    });

    clock.request_phase(Phases::LAYOUT);
    vblank(&mut clock);
    assert_eq!(*log.borrow(), [(0, Phase::Layout)]);

    vblank(&mut clock);
    assert_eq!(log.borrow()[1..], [(1, Phase::Update), (1, Phase::Paint)]);
}

#[test]
fn observer_panic_is_isolated() {
    let mut clock = clock();
    let ran = Rc::new(Cell::new(0));
    clock.connect(Phase::Paint, |_| panic!("broken observer"));
    let r = Rc::clone(&ran);
    clock.connect(Phase::Paint, move |_| r.set(r.get() + 1));
    let r = Rc::clone(&ran);
    clock.connect(Phase::AfterPaint, move |_| r.set(r.get() + 10));

    clock.request_phase(Phases::PAINT | Phases::AFTER_PAINT);
    assert!(vblank(&mut clock));
    assert_eq!(ran.get(), 11);
    assert!(clock.current_timings().unwrap().complete());
}

#[test]
fn observer_can_disconnect_itself() {
    let mut clock = clock();
    let count = Rc::new(Cell::new(0));
    let own_id = Rc::new(Cell::new(None));

    let c = Rc::clone(&count);
    let id = Rc::clone(&own_id);
    let observer = clock.connect(Phase::Update, move |clock| {
        c.set(c.get() + 1);
        if let Some(me) = id.get() {
            assert!(clock.disconnect(me));
        }
    });
    own_id.set(Some(observer));

    clock.begin_updating();
    vblank(&mut clock);
    vblank(&mut clock);
    assert_eq!(count.get(), 1);
    assert!(!clock.disconnect(observer));
}

#[test]
fn observers_keep_registration_order_across_frames() {
    let mut clock = clock();
    let order = Rc::new(RefCell::new(Vec::new()));
    for name in ["a", "b", "c"] {
        let order = Rc::clone(&order);
        clock.connect(Phase::Layout, move |_| order.borrow_mut().push(name));
    }
    clock.request_phase(Phases::LAYOUT);
    vblank(&mut clock);
    clock.request_phase(Phases::LAYOUT);
    vblank(&mut clock);
    assert_eq!(*order.borrow(), ["a", "b", "c", "a", "b", "c"]);
}

#[test]
fn unreferenced_records_are_recycled() {
    let mut clock = clock();
    clock.begin_updating();
    for _ in 0..RING_CAPACITY {
        vblank(&mut clock);
    }
    assert_eq!(clock.history().allocations(), RING_CAPACITY as u64);
    for _ in 0..4 * RING_CAPACITY {
        vblank(&mut clock);
    }
    assert_eq!(clock.history().allocations(), RING_CAPACITY as u64);
}

#[test]
fn held_records_outlive_the_window() {
    let mut clock = clock();
    clock.begin_updating();
    vblank(&mut clock);
    let held = clock.timings(0).unwrap().clone();
    assert_eq!(held.ref_count(), 2);

    for _ in 0..RING_CAPACITY {
        vblank(&mut clock);
    }
    assert!(clock.timings(0).is_none());
    assert_eq!(held.frame_counter(), 0);
    assert!(held.complete());
    assert_eq!(held.ref_count(), 1);
    assert_eq!(clock.history().allocations(), RING_CAPACITY as u64 + 1);
    let reused = clock.timings(RING_CAPACITY as i64).unwrap();
    assert!(!reused.ptr_eq(&held));
}

#[test]
fn late_presentation_feedback() {
    let mut clock = clock();
    clock.backend_mut().reports_presentation = true;
    clock.begin_updating();
    vblank(&mut clock);
    vblank(&mut clock);
    assert!(!clock.timings(0).unwrap().complete());

    let presented = clock.backend().now + 5_000;
    clock
        .timings_mut(0)
        .unwrap()
        .set_drawn_time(presented - 1_000)
        .set_presentation_time(presented)
        .set_refresh_interval(16_667);
    assert!(clock.complete_timings(0));
    assert!(!clock.complete_timings(0));

    let t = clock.timings(0).unwrap();
    assert!(t.complete());
    assert_eq!(t.presentation_time(), presented);
    assert_eq!(t.drawn_time(), presented - 1_000);
    assert!(!clock.complete_timings(99));
}

#[test]
fn frame_time_is_constant_within_a_frame() {
    let mut clock = clock();
    let samples = Rc::new(RefCell::new(Vec::new()));
    for phase in [Phase::Update, Phase::Layout, Phase::Paint] {
        let samples = Rc::clone(&samples);
        clock.connect(phase, move |clock| {
            clock.backend_mut().now += 1_000;
            let t = clock.frame_time();
            samples.borrow_mut().push(t);
        });
    }
    clock.request_phase(Phases::UPDATE | Phases::LAYOUT | Phases::PAINT);
    vblank(&mut clock);

    let samples = samples.borrow();
    assert_eq!(samples.len(), 3);
    assert!(samples.iter().all(|&t| t == samples[0]));
    let timings = clock.current_timings().unwrap();
    assert_eq!(timings.frame_time(), samples[0]);
    assert_eq!(timings.frame_end_time() - timings.frame_time(), 3_000);
}

#[test]
fn smoothed_frame_time_follows_refresh_grid() {
    let mut clock = clock();
    clock.begin_updating();
    vblank(&mut clock);
    // Wake late by 3 ms; the smoothed time stays on the grid.
    clock.backend_mut().now += 3_000;
    vblank(&mut clock);
    let first = clock.timings(0).unwrap().smoothed_frame_time();
    let second = clock.timings(1).unwrap();
    assert_eq!(second.smoothed_frame_time(), first + DEFAULT_REFRESH_INTERVAL);
    assert_eq!(second.frame_time(), first + DEFAULT_REFRESH_INTERVAL + 3_000);
}

#[test]
fn idle_freeze_thaw_pair_leaves_next_frame_untouched() {
    let mut plain = clock();
    let mut paired = clock();
    for clock in [&mut plain, &mut paired] {
        clock.request_phase(Phases::PAINT);
        assert!(clock.dispatch());
        // Idle for ten refreshes plus 5 ms.
        clock.backend_mut().now += 10 * DEFAULT_REFRESH_INTERVAL + 5_000;
    }

    paired.freeze();
    paired.thaw();
    assert_eq!(paired.state(), ClockState::Idle);

    for clock in [&mut plain, &mut paired] {
        clock.request_phase(Phases::PAINT);
        assert!(clock.dispatch());
    }
    let plain = plain.timings(1).unwrap();
    let paired = paired.timings(1).unwrap();
    assert_eq!(paired.frame_time(), plain.frame_time());
    assert_eq!(paired.smoothed_frame_time(), plain.smoothed_frame_time());
    assert_eq!(paired.slept_before(), plain.slept_before());
}

#[test]
fn freeze_from_observer_finishes_current_frame() {
    let mut clock = clock();
    let log = log_all_phases(&mut clock);
    clock.connect(Phase::Update, |clock| clock.freeze());

    clock.begin_updating();
    clock.request_phase(Phases::PAINT);
    assert!(vblank(&mut clock));
    assert_eq!(*log.borrow(), [(0, Phase::Update), (0, Phase::Paint)]);
    assert_eq!(clock.state(), ClockState::Frozen);
    assert!(!vblank(&mut clock));

    clock.thaw();
    assert!(vblank(&mut clock));
    assert_eq!(clock.frame_counter(), 1);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "end_updating() called without a matching begin_updating()")]
fn unbalanced_end_updating_panics_in_debug() {
    let mut clock = clock();
    clock.end_updating();
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "thaw() called without a matching freeze()")]
fn unbalanced_thaw_panics_in_debug() {
    let mut clock = clock();
    clock.thaw();
}
