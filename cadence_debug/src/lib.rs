// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for cadence profiler
//! output.
//!
//! This crate provides [`ProfilerSink`](cadence_core::ProfilerSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! A clock owns its sink, so share a recorder through
//! `Rc<RefCell<RecorderSink>>` to read it back while the clock is alive.

pub mod chrome;
pub mod pretty;
pub mod recorder;
