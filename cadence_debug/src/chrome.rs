// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][trace-format] JSON to the given writer.
//! Marks with a duration become complete (`"X"`) events, zero-length marks
//! become instant (`"i"`) events and counter samples become `"C"` events.
//!
//! [trace-format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are already microseconds and are written unchanged.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Mark {
                start,
                duration,
                name,
                message,
            } if duration > 0 => {
                events.push(json!({
                    "ph": "X",
                    "name": name,
                    "cat": "Frame",
                    "ts": start,
                    "dur": duration,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "message": message,
                    }
                }));
            }
            RecordedEvent::Mark {
                start,
                name,
                message,
                ..
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Frame",
                    "ts": start,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "message": message,
                    }
                }));
            }
            RecordedEvent::Counter { name, time, value } => {
                events.push(json!({
                    "ph": "C",
                    "name": name,
                    "cat": "Clock",
                    "ts": time,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "value": value,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
