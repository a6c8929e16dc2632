//! Building ISO 2709 records and writing them to byte streams.
//!
//! [`build_record`] is the pure build half of the codec: it serializes a
//! [`RawRecord`] to the exact record byte string under a [`Geometry`],
//! computing the directory positions, `base_addr` and `total_len` on the
//! way. [`IsoWriter`] layers per-record line wrapping and an output stream
//! on top.
//!
//! # Examples
//!
//! ```
//! use isisio::{Geometry, IsoWriter, RawRecord};
//!
//! let geom = Geometry::default();
//! let mut record = RawRecord::new(&geom);
//! record.push_str("001", "testing");
//! record.push_str("008", "it");
//!
//! let mut out = Vec::new();
//! {
//!     let mut writer = IsoWriter::new(&mut out);
//!     writer.write_record(&record)?;
//!     writer.finish()?;
//! }
//! assert_eq!(
//!     out,
//!     b"000610000000000490004500001000800000008000300008#testing#it##\n"
//! );
//! # Ok::<(), isisio::IsisError>(())
//! ```

use crate::error::{IsisError, Result};
use crate::leader::{write_digits, Geometry, LEADER_LEN};
use crate::record::RawRecord;
use crate::wrap::LineSpec;
use std::io::Write;

/// Build the exact (unwrapped) byte string of one record.
///
/// The directory widths come from the record's leader; `tag_len` and the
/// terminators come from the geometry. `total_len` and `base_addr` are
/// recomputed, every other leader byte is emitted as stored.
///
/// # Errors
///
/// Returns [`IsisError::Overflow`] when:
/// - a field value contains the field terminator byte,
/// - a tag or custom byte string does not match its configured width,
/// - a computed length or position does not fit its digit slot.
pub fn build_record(geom: &Geometry, record: &RawRecord) -> Result<Vec<u8>> {
    let len_len = record.leader.len_len as usize;
    let pos_len = record.leader.pos_len as usize;
    let custom_len = record.leader.custom_len as usize;
    let entry_len = geom.tag_len + len_len + pos_len + custom_len;

    let mut directory = Vec::with_capacity(record.fields.len() * entry_len + 1);
    let mut data = Vec::new();
    let mut position: u64 = 0;

    for field in &record.fields {
        let tag = display_tag(&field.tag);
        if field.tag.len() != geom.tag_len {
            return Err(IsisError::Overflow(format!(
                "tag {tag} is {} bytes, geometry wants {}",
                field.tag.len(),
                geom.tag_len
            )));
        }
        if field.value.contains(&geom.field_terminator) {
            return Err(IsisError::Overflow(format!(
                "field {tag} contains the field terminator byte 0x{:02x}",
                geom.field_terminator
            )));
        }

        let field_len = field.value.len() as u64 + 1;
        directory.extend_from_slice(&field.tag);

        let digits_start = directory.len();
        directory.resize(digits_start + len_len, 0);
        write_digits(
            &mut directory[digits_start..digits_start + len_len],
            field_len,
            "len",
        )?;
        let digits_start = directory.len();
        directory.resize(digits_start + pos_len, 0);
        write_digits(
            &mut directory[digits_start..digits_start + pos_len],
            position,
            "pos",
        )?;

        if custom_len > 0 && field.custom.is_empty() {
            directory.resize(directory.len() + custom_len, b'0');
        } else {
            if field.custom.len() != custom_len {
                return Err(IsisError::Overflow(format!(
                    "custom bytes of field {tag} are {} bytes, entry map wants {custom_len}",
                    field.custom.len()
                )));
            }
            directory.extend_from_slice(&field.custom);
        }

        data.extend_from_slice(&field.value);
        data.push(geom.field_terminator);
        position += field_len;
    }

    directory.push(geom.field_terminator);

    let base_addr = LEADER_LEN + directory.len();
    let total_len = base_addr + data.len() + 1;

    let mut leader = record.leader.clone();
    leader.base_addr = base_addr as u32;
    leader.total_len = total_len as u32;

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&leader.to_bytes()?);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&data);
    out.push(geom.record_terminator);
    Ok(out)
}

fn display_tag(tag: &[u8]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

/// Writer for ISO 2709 byte streams.
///
/// Serializes records one at a time to any destination implementing
/// [`std::io::Write`], wrapping each record into fixed-width lines per the
/// configured [`LineSpec`].
#[derive(Debug)]
pub struct IsoWriter<W: Write> {
    writer: W,
    geometry: Geometry,
    lines: LineSpec,
    records_written: usize,
    finished: bool,
}

impl<W: Write> IsoWriter<W> {
    /// Create a writer with the default geometry and 80-column wrapping.
    pub fn new(writer: W) -> Self {
        IsoWriter {
            writer,
            geometry: Geometry::default(),
            lines: LineSpec::default(),
            records_written: 0,
            finished: false,
        }
    }

    /// Replace the directory geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Replace the line wrapping configuration. Use [`LineSpec::none`] to
    /// emit raw unwrapped records.
    #[must_use]
    pub fn with_lines(mut self, lines: LineSpec) -> Self {
        self.lines = lines;
        self
    }

    /// Serialize one record and write it, wrapped, to the stream.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Overflow`] for inputs that do not fit the
    /// geometry and [`IsisError::Io`] for stream failures. Writing after
    /// [`IsoWriter::finish`] is an error.
    pub fn write_record(&mut self, record: &RawRecord) -> Result<()> {
        if self.finished {
            return Err(IsisError::Overflow(
                "cannot write to a finished writer".to_string(),
            ));
        }
        let bytes = build_record(&self.geometry, record)?;
        self.writer.write_all(&self.lines.wrap(&bytes))?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the stream and refuse further writes.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Io`] if flushing fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}
