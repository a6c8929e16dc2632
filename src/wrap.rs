//! Fixed-width line wrapping around the ISO 2709 byte stream.
//!
//! ISO files are conventionally split into fixed-width lines: a newline is
//! inserted after every `line_len` content bytes and after the last partial
//! chunk of each record. The newline bytes are framing only — they are not
//! counted by `total_len`, `base_addr` or any directory field, and they are
//! invisible to the record codec.
//!
//! Unwrapping is positional: a newline is consumed only at a `line_len`
//! boundary (or once at the end of a record). A newline byte that appears
//! *before* the next boundary is field content — record data may freely
//! contain `\n`, `\r` or `\r\n` — so the two framings never collide.

use crate::error::{IsisError, Result};
use serde::{Deserialize, Serialize};

/// Default wrap width in bytes.
pub const DEFAULT_LINE_LEN: usize = 80;
/// Default newline sequence.
pub const DEFAULT_NEWLINE: &[u8] = b"\n";

/// Line wrapping configuration.
///
/// A `line_len` of zero disables wrapping entirely: [`LineSpec::wrap`] and
/// [`LineSpec::unwrap`] become pass-throughs and no trailing newline is
/// expected or produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpec {
    /// Content bytes per line; 0 disables wrapping.
    pub line_len: usize,
    /// Newline byte sequence (may be multi-byte, e.g. `\r\n`).
    pub newline: Vec<u8>,
}

impl Default for LineSpec {
    fn default() -> Self {
        LineSpec {
            line_len: DEFAULT_LINE_LEN,
            newline: DEFAULT_NEWLINE.to_vec(),
        }
    }
}

impl LineSpec {
    /// A pass-through configuration (no wrapping).
    #[must_use]
    pub fn none() -> Self {
        LineSpec {
            line_len: 0,
            newline: DEFAULT_NEWLINE.to_vec(),
        }
    }

    /// Whether this configuration performs no wrapping.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.line_len == 0
    }

    /// Wrap one record's bytes into fixed-width lines.
    ///
    /// Inserts the newline after every full `line_len` chunk and after a
    /// trailing partial chunk; a record whose length is an exact multiple
    /// of `line_len` gets no extra empty line. Grows the input by exactly
    /// `ceil(len / line_len)` newlines.
    #[must_use]
    pub fn wrap(&self, bytes: &[u8]) -> Vec<u8> {
        if self.is_passthrough() {
            return bytes.to_vec();
        }
        let lines = bytes.len().div_ceil(self.line_len);
        let mut out = Vec::with_capacity(bytes.len() + lines * self.newline.len());
        for chunk in bytes.chunks(self.line_len) {
            out.extend_from_slice(chunk);
            out.extend_from_slice(&self.newline);
        }
        out
    }

    /// Undo [`LineSpec::wrap`] on a complete record buffer.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Format`] when a `line_len` boundary is not
    /// followed by the newline sequence, or when the buffer does not end
    /// with one.
    pub fn unwrap(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        if self.is_passthrough() {
            return Ok(bytes.to_vec());
        }
        let stride = self.line_len + self.newline.len();
        let mut out = Vec::with_capacity(bytes.len());
        for (idx, segment) in bytes.chunks(stride).enumerate() {
            if segment.len() <= self.newline.len() {
                return Err(IsisError::format_at(
                    (idx * stride) as u64,
                    "wrapped line shorter than its newline".to_string(),
                ));
            }
            let (content, newline) = segment.split_at(segment.len() - self.newline.len());
            if newline != self.newline.as_slice() {
                return Err(IsisError::format_at(
                    (idx * stride + content.len()) as u64,
                    format!("expected line break after {} content bytes", self.line_len),
                ));
            }
            out.extend_from_slice(content);
        }
        Ok(out)
    }
}

/// Boundary tracking for incremental unwrapping inside a stream reader.
///
/// Mirrors the counter the wrap side keeps: `until_eol` content bytes
/// remain before the next newline is due.
#[derive(Debug)]
pub(crate) struct LineState {
    until_eol: usize,
}

impl LineState {
    pub(crate) fn new(spec: &LineSpec) -> Self {
        LineState {
            until_eol: spec.line_len,
        }
    }

    /// Restart the line counter at a record boundary.
    pub(crate) fn reset(&mut self, spec: &LineSpec) {
        self.until_eol = spec.line_len;
    }

    /// Whether the next byte due from the stream is a newline.
    pub(crate) fn at_boundary(&self) -> bool {
        self.until_eol == 0
    }

    /// Whether a record-final newline is still owed.
    pub(crate) fn mid_line(&self, spec: &LineSpec) -> bool {
        self.until_eol != spec.line_len
    }

    /// How many content bytes may be read before the next boundary.
    pub(crate) fn budget(&self, want: usize) -> usize {
        want.min(self.until_eol)
    }

    pub(crate) fn consumed(&mut self, count: usize) {
        self.until_eol -= count;
    }

    pub(crate) fn line_done(&mut self, spec: &LineSpec) {
        self.until_eol = spec.line_len;
    }
}
