// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`ProfilerSink`] and encodes marks and counter
//! samples into a `Vec<u8>` as little-endian records with length-prefixed
//! strings. [`decode`] reads them back as an iterator of [`RecordedEvent`];
//! a truncated tail ends the iteration.

use cadence_core::ProfilerSink;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_MARK: u8 = 1;
const TAG_COUNTER: u8 = 2;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`ProfilerSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
    events: usize,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Number of events recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events == 0
    }

    /// Decodes the recorded events.
    pub fn events(&self) -> DecodeIter<'_> {
        decode(&self.buf)
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_bits().to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "strings longer than u32::MAX are cut at that length"
        )]
        let len = s.len().min(u32::MAX as usize) as u32;
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }
}

impl ProfilerSink for RecorderSink {
    fn add_mark(&mut self, start: i64, duration: i64, name: &'static str, message: &str) {
        self.write_u8(TAG_MARK);
        self.write_i64(start);
        self.write_i64(duration);
        self.write_str(name);
        self.write_str(message);
        self.events += 1;
    }

    fn set_counter(&mut self, name: &'static str, time: i64, value: f64) {
        self.write_u8(TAG_COUNTER);
        self.write_str(name);
        self.write_i64(time);
        self.write_f64(value);
        self.events += 1;
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A span (or an instant, when `duration` is zero).
    Mark {
        /// Start time in microseconds.
        start: i64,
        /// Duration in microseconds.
        duration: i64,
        /// Mark name, e.g. `"frame"`.
        name: String,
        /// Free-form detail.
        message: String,
    },
    /// A counter sample.
    Counter {
        /// Counter name, e.g. `"fps"`.
        name: String,
        /// Sample time in microseconds.
        time: i64,
        /// Sampled value.
        value: f64,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecodeIter<'a> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_bytes(4)?.try_into().ok()?))
    }

    fn read_i64(&mut self) -> Option<i64> {
        Some(i64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(u64::from_le_bytes(
            self.read_bytes(8)?.try_into().ok()?,
        )))
    }

    fn read_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn decode_mark(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Mark {
            start: self.read_i64()?,
            duration: self.read_i64()?,
            name: self.read_string()?,
            message: self.read_string()?,
        })
    }

    fn decode_counter(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Counter {
            name: self.read_string()?,
            time: self.read_i64()?,
            value: self.read_f64()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_MARK => self.decode_mark(),
            TAG_COUNTER => self.decode_counter(),
            _ => {
                // Unknown tag: the rest of the buffer cannot be framed.
                self.pos = self.data.len();
                None
            }
        }
    }
}
