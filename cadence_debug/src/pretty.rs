// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable profiler output.
//!
//! [`PrettyPrintSink`] implements [`ProfilerSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr). Times
//! are printed in milliseconds.

use std::io::Write;

use cadence_core::ProfilerSink;

/// Writes human-readable profiler lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(micros: i64) -> f64 {
    micros as f64 / 1000.0
}

impl<W: Write> ProfilerSink for PrettyPrintSink<W> {
    fn add_mark(&mut self, start: i64, duration: i64, name: &'static str, message: &str) {
        let _ = if duration == 0 {
            write!(self.writer, "[{name}] at {:.3}ms", ms(start))
        } else {
            write!(
                self.writer,
                "[{name}] {:.3}ms +{:.3}ms",
                ms(start),
                ms(duration)
            )
        };
        let _ = if message.is_empty() {
            writeln!(self.writer)
        } else {
            writeln!(self.writer, " {message}")
        };
    }

    fn set_counter(&mut self, name: &'static str, time: i64, value: f64) {
        let _ = writeln!(self.writer, "[{name}] {value:.2} at {:.3}ms", ms(time));
    }
}
