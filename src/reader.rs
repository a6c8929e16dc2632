//! Parsing ISO 2709 records from byte buffers and streams.
//!
//! [`parse_record`] is the pure parse half of the codec: given a buffer
//! positioned at a record start it returns the structured record and the
//! number of bytes consumed, verifying the structural invariants of the
//! format (length accounting, directory positions, terminators) and citing
//! the byte offset of any violation.
//!
//! [`IsoReader`] reads records lazily from any [`std::io::Read`] source,
//! undoing the fixed-width line wrapping on the way. Records are separated
//! only by their own framing, so concatenated files parse as the
//! concatenation of their records.
//!
//! # Examples
//!
//! ```
//! use isisio::IsoReader;
//! use std::io::Cursor;
//!
//! let data = b"000610000000000490004500001000800000008000300008#testing#it##\n";
//! let mut reader = IsoReader::new(Cursor::new(data.to_vec()));
//! let record = reader.read_record()?.expect("one record");
//! assert_eq!(record.fields[0].value, b"testing");
//! assert!(reader.read_record()?.is_none());
//! # Ok::<(), isisio::IsisError>(())
//! ```

use crate::error::{IsisError, Result};
use crate::leader::{parse_digits, Geometry, Leader, LEADER_LEN};
use crate::record::{RawField, RawRecord};
use crate::wrap::{LineSpec, LineState};
use log::trace;
use std::io::Read;

/// Parse one record from a buffer positioned at its first byte.
///
/// Returns the record and the number of bytes consumed (always the
/// leader's `total_len`). Input beyond the record is ignored, so buffers
/// holding concatenated records can be parsed by advancing the slice.
///
/// # Errors
///
/// Returns [`IsisError::Truncated`] when the buffer is shorter than the
/// leader announces, and [`IsisError::Format`] with a record-relative byte
/// offset for any structural violation: non-digit numeric fields, a
/// directory size that is not a multiple of the entry size, out-of-order
/// directory positions, missing terminators, or length mismatches.
pub fn parse_record(geom: &Geometry, bytes: &[u8]) -> Result<(RawRecord, usize)> {
    let leader = Leader::from_bytes(bytes)?;
    let total_len = leader.total_len as usize;
    let base_addr = leader.base_addr as usize;
    let entry_len = leader.entry_len(geom);

    if base_addr < LEADER_LEN + 1 {
        return Err(IsisError::format_at(
            12,
            format!("base_addr {base_addr} overlaps the leader"),
        ));
    }
    if total_len < base_addr + 1 {
        return Err(IsisError::format_at(
            0,
            format!("total_len {total_len} is smaller than base_addr {base_addr} plus terminator"),
        ));
    }
    if bytes.len() < total_len {
        return Err(IsisError::Truncated(format!(
            "record announces {total_len} bytes, only {} available",
            bytes.len()
        )));
    }

    let dir_len = base_addr - LEADER_LEN - 1;
    if entry_len == 0 || dir_len % entry_len != 0 {
        return Err(IsisError::format_at(
            12,
            format!("directory size {dir_len} is not a multiple of the {entry_len}-byte entry"),
        ));
    }
    let num_fields = dir_len / entry_len;

    let mut fields = Vec::with_capacity(num_fields);
    let mut entries = Vec::with_capacity(num_fields);
    for idx in 0..num_fields {
        let at = LEADER_LEN + idx * entry_len;
        let entry = &bytes[at..at + entry_len];
        let (tag, rest) = entry.split_at(geom.tag_len);
        let (len_bytes, rest) = rest.split_at(leader.len_len as usize);
        let (pos_bytes, custom) = rest.split_at(leader.pos_len as usize);
        let len = parse_digits(len_bytes, "len", (at + geom.tag_len) as u64)? as usize;
        let pos = parse_digits(
            pos_bytes,
            "pos",
            (at + geom.tag_len + leader.len_len as usize) as u64,
        )? as usize;
        entries.push((tag, len, pos, custom, at));
    }

    let dir_term_at = base_addr - 1;
    if bytes[dir_term_at] != geom.field_terminator {
        return Err(IsisError::format_at(
            dir_term_at as u64,
            format!(
                "expected field terminator 0x{:02x} after directory, got 0x{:02x}",
                geom.field_terminator, bytes[dir_term_at]
            ),
        ));
    }

    let data = &bytes[base_addr..total_len - 1];
    let mut expected_pos = 0usize;
    for (tag, len, pos, custom, at) in entries {
        let tag_text = String::from_utf8_lossy(tag);
        if pos != expected_pos {
            return Err(IsisError::format_at(
                (at + geom.tag_len + leader.len_len as usize) as u64,
                format!("field {tag_text} position {pos}, expected {expected_pos}"),
            ));
        }
        if len == 0 {
            return Err(IsisError::format_at(
                (at + geom.tag_len) as u64,
                format!("field {tag_text} length 0 cannot hold its terminator"),
            ));
        }
        let end = pos + len;
        if end > data.len() {
            return Err(IsisError::format_at(
                (at + geom.tag_len) as u64,
                format!("field {tag_text} extends {end} bytes into a {}-byte data region", data.len()),
            ));
        }
        let value = &data[pos..end - 1];
        if data[end - 1] != geom.field_terminator {
            return Err(IsisError::format_at(
                (base_addr + end - 1) as u64,
                format!("field {tag_text} is not closed by the field terminator"),
            ));
        }
        if value.contains(&geom.field_terminator) {
            return Err(IsisError::format_at(
                (base_addr + pos) as u64,
                format!("field {tag_text} contains the field terminator byte"),
            ));
        }
        fields.push(RawField {
            tag: tag.to_vec(),
            value: value.to_vec(),
            custom: custom.to_vec(),
        });
        expected_pos = end;
    }

    if expected_pos != data.len() {
        return Err(IsisError::format_at(
            (base_addr + expected_pos) as u64,
            format!(
                "directory covers {expected_pos} bytes of a {}-byte data region",
                data.len()
            ),
        ));
    }
    let record_term_at = total_len - 1;
    if bytes[record_term_at] != geom.record_terminator {
        return Err(IsisError::format_at(
            record_term_at as u64,
            format!(
                "expected record terminator 0x{:02x}, got 0x{:02x}",
                geom.record_terminator, bytes[record_term_at]
            ),
        ));
    }

    Ok((RawRecord { leader, fields }, total_len))
}

/// Reader for ISO 2709 byte streams.
///
/// Produces records lazily from any source implementing [`std::io::Read`],
/// transparently unwrapping the fixed-width line framing. A clean EOF at a
/// record boundary ends the stream; EOF inside a record is a
/// [`IsisError::Truncated`] error. Stray CR/LF bytes between records
/// (trailing blank lines) are tolerated.
#[derive(Debug)]
pub struct IsoReader<R: Read> {
    reader: R,
    geometry: Geometry,
    lines: LineSpec,
    state: LineState,
    peeked: Option<u8>,
    content_offset: u64,
    records_read: usize,
}

impl<R: Read> IsoReader<R> {
    /// Create a reader with the default geometry and 80-column unwrapping.
    pub fn new(reader: R) -> Self {
        let lines = LineSpec::default();
        let state = LineState::new(&lines);
        IsoReader {
            reader,
            geometry: Geometry::default(),
            lines,
            state,
            peeked: None,
            content_offset: 0,
            records_read: 0,
        }
    }

    /// Replace the directory geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Replace the line wrapping configuration. Use [`LineSpec::none`] for
    /// raw unwrapped input.
    #[must_use]
    pub fn with_lines(mut self, lines: LineSpec) -> Self {
        self.state = LineState::new(&lines);
        self.lines = lines;
        self
    }

    /// Number of records read so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` on a clean EOF at a record boundary.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Truncated`] on EOF inside a record,
    /// [`IsisError::Format`] for structural violations (offsets are in
    /// unwrapped content bytes from the start of the stream), and
    /// [`IsisError::Io`] for stream failures.
    pub fn read_record(&mut self) -> Result<Option<RawRecord>> {
        // Tolerate blank lines between records, then detect a clean EOF.
        loop {
            match self.next_raw_byte()? {
                None => return Ok(None),
                Some(b'\r' | b'\n') => continue,
                Some(byte) => {
                    self.peeked = Some(byte);
                    break;
                }
            }
        }

        self.state.reset(&self.lines);
        let record_start = self.content_offset;

        let mut buf = vec![0u8; LEADER_LEN];
        self.read_content(&mut buf)?;
        let leader =
            Leader::from_bytes(&buf).map_err(|err| err.offset_by(record_start))?;
        let total_len = leader.total_len as usize;
        if total_len < LEADER_LEN + 2 {
            return Err(IsisError::format_at(
                record_start,
                format!("total_len {total_len} is too small for a record"),
            ));
        }

        buf.resize(total_len, 0);
        self.read_content(&mut buf[LEADER_LEN..])?;
        self.finish_record_line()?;

        let (record, consumed) =
            parse_record(&self.geometry, &buf).map_err(|err| err.offset_by(record_start))?;
        debug_assert_eq!(consumed, total_len);
        self.records_read += 1;
        trace!(
            "read record {} ({} fields, {} bytes)",
            self.records_read,
            record.fields.len(),
            total_len
        );
        Ok(Some(record))
    }

    /// Iterate over the remaining records.
    ///
    /// The iterator is fail-fast: after yielding an `Err` it fuses and
    /// yields nothing further.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: self,
            done: false,
        }
    }

    /// Read content bytes through the line unwrapping layer.
    fn read_content(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            if !self.lines.is_passthrough() && self.state.at_boundary() {
                self.expect_newline()?;
                self.state.line_done(&self.lines);
            }
            let take = if self.lines.is_passthrough() {
                buf.len() - filled
            } else {
                self.state.budget(buf.len() - filled)
            };
            self.read_raw_exact(&mut buf[filled..filled + take])?;
            if !self.lines.is_passthrough() {
                self.state.consumed(take);
            }
            filled += take;
            self.content_offset += take as u64;
        }
        Ok(())
    }

    /// Consume the newline that closes the record's last line.
    fn finish_record_line(&mut self) -> Result<()> {
        if !self.lines.is_passthrough() && self.state.mid_line(&self.lines) {
            self.expect_newline()?;
            self.state.line_done(&self.lines);
        }
        Ok(())
    }

    fn expect_newline(&mut self) -> Result<()> {
        let newline = self.lines.newline.clone();
        let mut buf = vec![0u8; newline.len()];
        self.read_raw_exact(&mut buf)?;
        if buf != newline {
            return Err(IsisError::format_at(
                self.content_offset,
                format!(
                    "expected line break after {} content bytes",
                    self.lines.line_len
                ),
            ));
        }
        Ok(())
    }

    /// Read exactly `buf.len()` raw stream bytes, honoring the peeked byte.
    fn read_raw_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let mut filled = 0;
        if let Some(byte) = self.peeked.take() {
            buf[0] = byte;
            filled = 1;
        }
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(IsisError::Truncated(format!(
                        "EOF after {} of {} expected bytes",
                        filled,
                        buf.len()
                    )))
                }
                Ok(count) => filled += count,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(IsisError::Io(err)),
            }
        }
        Ok(())
    }

    /// Read one raw byte, or `None` on EOF.
    fn next_raw_byte(&mut self) -> Result<Option<u8>> {
        if let Some(byte) = self.peeked.take() {
            return Ok(Some(byte));
        }
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(IsisError::Io(err)),
            }
        }
    }
}

/// Fail-fast record iterator returned by [`IsoReader::records`].
#[derive(Debug)]
pub struct Records<'a, R: Read> {
    reader: &'a mut IsoReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::build_record;
    use std::io::Cursor;

    const SAMPLE: &[u8] = b"000610000000000490004500001000800000008000300008#testing#it##";

    #[test]
    fn parse_sample_record() {
        let geom = Geometry::default();
        let (record, consumed) = parse_record(&geom, SAMPLE).unwrap();
        assert_eq!(consumed, 61);
        assert_eq!(record.leader.total_len, 61);
        assert_eq!(record.leader.base_addr, 49);
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[0].tag, b"001");
        assert_eq!(record.fields[0].value, b"testing");
        assert_eq!(record.fields[1].tag, b"008");
        assert_eq!(record.fields[1].value, b"it");
    }

    #[test]
    fn parse_build_is_identity() {
        let geom = Geometry::default();
        let (record, _) = parse_record(&geom, SAMPLE).unwrap();
        assert_eq!(build_record(&geom, &record).unwrap(), SAMPLE);
    }

    #[test]
    fn parse_empty_record() {
        let geom = Geometry::default();
        let record = RawRecord::new(&geom);
        let bytes = build_record(&geom, &record).unwrap();
        let (parsed, consumed) = parse_record(&geom, &bytes).unwrap();
        assert_eq!(consumed, 26);
        assert!(parsed.fields.is_empty());
        assert_eq!(parsed.leader.base_addr, 25);
    }

    #[test]
    fn bad_position_reports_offset() {
        let mut bytes = SAMPLE.to_vec();
        // Corrupt the second entry's position field (00008 -> 00009).
        bytes[47] = b'9';
        let err = parse_record(&Geometry::default(), &bytes).unwrap_err();
        match err {
            IsisError::Format { offset, message } => {
                assert_eq!(offset, 43);
                assert!(message.contains("position"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_record_terminator_fails() {
        let mut bytes = SAMPLE.to_vec();
        *bytes.last_mut().unwrap() = b'!';
        let err = parse_record(&Geometry::default(), &bytes).unwrap_err();
        assert!(matches!(err, IsisError::Format { offset: 60, .. }), "got: {err}");
    }

    #[test]
    fn short_buffer_is_truncated() {
        let err = parse_record(&Geometry::default(), &SAMPLE[..40]).unwrap_err();
        assert!(matches!(err, IsisError::Truncated(_)));
    }

    #[test]
    fn reads_wrapped_stream() {
        let mut data = SAMPLE.to_vec();
        data.push(b'\n');
        let mut reader = IsoReader::new(Cursor::new(data));
        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.fields.len(), 2);
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn reads_concatenated_records() {
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend_from_slice(SAMPLE);
            data.push(b'\n');
        }
        let mut reader = IsoReader::new(Cursor::new(data));
        let records: Vec<_> = reader.records().collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(reader.records_read(), 3);
    }

    #[test]
    fn tolerates_trailing_blank_lines() {
        let mut data = SAMPLE.to_vec();
        data.extend_from_slice(b"\n\r\n\n");
        let mut reader = IsoReader::new(Cursor::new(data));
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn truncated_stream_fails() {
        let data = SAMPLE[..50].to_vec();
        let mut reader = IsoReader::new(Cursor::new(data));
        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, IsisError::Truncated(_)), "got: {err}");
    }

    #[test]
    fn unwrapped_stream_with_line_len_zero() {
        let mut data = Vec::new();
        data.extend_from_slice(SAMPLE);
        data.extend_from_slice(SAMPLE);
        let mut reader = IsoReader::new(Cursor::new(data)).with_lines(LineSpec::none());
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn iterator_fuses_after_error() {
        let mut data = SAMPLE.to_vec();
        data.push(b'\n');
        data.extend_from_slice(&SAMPLE[..30]);
        let mut reader = IsoReader::new(Cursor::new(data));
        let mut iter = reader.records();
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
