// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated 60 Hz display driving a frame clock.
//!
//! Animates a value for 90 frames through the clock's update, layout and
//! paint phases, feeding presentation feedback back one refresh after each
//! frame. Profiler output is recorded to a
//! [`RecorderSink`](cadence_debug::recorder::RecorderSink) and exported as
//! `cadence_trace.json`.
//!
//! Run with `RUST_LOG=cadence::timings=debug` to see one line per frame.

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::rc::Rc;

use anyhow::{Context, Result};
use cadence_core::{Backend, FrameClock, FrameClockConfig, Phase, Phases};
use cadence_debug::chrome;
use cadence_debug::recorder::RecorderSink;

const ANIMATION_FRAMES: i64 = 90;
/// 60 Hz refresh interval in microseconds.
const REFRESH_INTERVAL: i64 = 16_667;
/// Simulated cost of the layout and paint work.
const LAYOUT_COST: i64 = 1_200;
const PAINT_COST: i64 = 3_400;
const TRACE_PATH: &str = "cadence_trace.json";

/// A display that wakes the clock on every vblank it was asked for.
#[derive(Debug)]
struct SimulatedDisplay {
    now: i64,
    wakeup_armed: bool,
}

impl Backend for SimulatedDisplay {
    fn now(&mut self) -> i64 {
        self.now
    }

    fn request_phase(&mut self, _phases: Phases) {
        self.wakeup_armed = true;
    }

    fn freeze(&mut self) {
        self.wakeup_armed = false;
    }

    fn reports_presentation(&self) -> bool {
        true
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let recorder = Rc::new(RefCell::new(RecorderSink::new()));
    let display = SimulatedDisplay {
        now: 1_000_000,
        wakeup_armed: false,
    };
    let mut clock = FrameClock::with_profiler(
        display,
        FrameClockConfig::debug(),
        Rc::clone(&recorder),
    );

    // -- observers ---------------------------------------------------------
    let position = Rc::new(Cell::new(0.0_f64));
    {
        let position = Rc::clone(&position);
        let mut start_time = None;
        clock.connect(Phase::Update, move |clock| {
            let now = clock.frame_time();
            let start = *start_time.get_or_insert(now);
            // 240 px/s.
            position.set((now - start) as f64 * 240.0 / 1_000_000.0);
            if clock.frame_counter() + 1 < ANIMATION_FRAMES {
                clock.request_phase(Phases::LAYOUT | Phases::PAINT);
            } else {
                clock.end_updating();
            }
        });
    }
    clock.connect(Phase::Layout, |clock| {
        clock.backend_mut().now += LAYOUT_COST;
    });
    clock.connect(Phase::Paint, |clock| {
        clock.backend_mut().now += PAINT_COST;
    });

    // -- simulated display loop -------------------------------------------
    tracing::info!(target: "cadence_demo", frames = ANIMATION_FRAMES, "animation started");
    clock.begin_updating();
    clock.request_phase(Phases::LAYOUT | Phases::PAINT);

    let mut vblank = clock.backend().now;
    let mut frames = 0;
    while clock.backend().wakeup_armed {
        vblank += REFRESH_INTERVAL;
        clock.backend_mut().now = vblank;

        // Feedback for the previous frame arrives with this vblank.
        let last = clock.frame_counter();
        if let Some(mut timings) = clock.timings_mut(last) {
            timings
                .set_refresh_interval(REFRESH_INTERVAL)
                .set_drawn_time(vblank - 2_000)
                .set_presentation_time(vblank);
        }
        clock.complete_timings(last);

        clock.backend_mut().wakeup_armed = false;
        if clock.dispatch() {
            frames += 1;
        }
    }

    // The final frame is presented one refresh later.
    let last = clock.frame_counter();
    vblank += REFRESH_INTERVAL;
    if let Some(mut timings) = clock.timings_mut(last) {
        timings
            .set_refresh_interval(REFRESH_INTERVAL)
            .set_presentation_time(vblank);
    }
    clock.complete_timings(last);

    let prediction = clock.refresh_info(vblank + 5_000);
    tracing::info!(
        target: "cadence_demo",
        frames,
        position = position.get(),
        fps = clock.fps(),
        refresh_interval = prediction.refresh_interval,
        next_presentation = prediction.presentation_time,
        "animation finished"
    );

    // -- export ------------------------------------------------------------
    let file = File::create(TRACE_PATH).with_context(|| format!("creating {TRACE_PATH}"))?;
    let mut writer = BufWriter::new(file);
    chrome::export(recorder.borrow().as_bytes(), &mut writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("writing {TRACE_PATH}"))?;
    tracing::info!(
        target: "cadence_demo",
        events = recorder.borrow().len(),
        path = TRACE_PATH,
        "trace written"
    );
    Ok(())
}
