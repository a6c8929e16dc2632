//! Reading CDS/ISIS master files.
//!
//! A master file base is a pair of files: `<name>.mst` holding the records
//! in 512-byte blocks, and `<name>.xrf` holding one packed pointer per MFN
//! (see [`crate::xrf`]). The MST starts with a control record carrying the
//! file geometry (`next_mfn`, the XRF shift, the record alignment modulus),
//! followed by the records themselves: a fixed leader, a directory of
//! `(tag, pos, len)` entries and the concatenated field bytes. A record may
//! span block boundaries; the continuation is plain contiguous bytes.
//!
//! The format exists in two widths: the classic "ISIS" mode with 16-bit
//! record length, base address and directory fields, and the "FFI" mode
//! that widens those to 32 bits for large records. The variant cannot be
//! detected reliably, so it is an explicit [`MstConfig`] parameter.
//!
//! Only reading is supported.
//!
//! # Examples
//!
//! ```no_run
//! use isisio::MstReader;
//!
//! let mut reader = MstReader::open("base.mst")?;
//! for record in reader.records(true) {
//!     let record = record?;
//!     println!("mfn {}: {} fields", record.mfn, record.fields.len());
//! }
//! # Ok::<(), isisio::IsisError>(())
//! ```

use crate::error::{IsisError, Result};
use crate::xrf::XrfFile;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use log::{debug, info, trace};
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// MST block size in bytes.
pub const MST_BLOCK_LEN: u64 = 512;

/// Smallest control record size the format allows.
const CONTROL_RECORD_FIELDS_LEN: u32 = 32;

/// Byte order of the integer fields in an MST/XRF pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Little endian, known as "swapped" in CISIS. The common case.
    #[default]
    Little,
    /// Big endian.
    Big,
}

impl Endianness {
    pub(crate) fn read_u16(self, reader: &mut impl Read) -> io::Result<u16> {
        match self {
            Endianness::Little => reader.read_u16::<LittleEndian>(),
            Endianness::Big => reader.read_u16::<BigEndian>(),
        }
    }

    pub(crate) fn read_i16(self, reader: &mut impl Read) -> io::Result<i16> {
        match self {
            Endianness::Little => reader.read_i16::<LittleEndian>(),
            Endianness::Big => reader.read_i16::<BigEndian>(),
        }
    }

    pub(crate) fn read_u32(self, reader: &mut impl Read) -> io::Result<u32> {
        match self {
            Endianness::Little => reader.read_u32::<LittleEndian>(),
            Endianness::Big => reader.read_u32::<BigEndian>(),
        }
    }

    pub(crate) fn read_i32(self, reader: &mut impl Read) -> io::Result<i32> {
        match self {
            Endianness::Little => reader.read_i32::<LittleEndian>(),
            Endianness::Big => reader.read_i32::<BigEndian>(),
        }
    }
}

/// Width variant of the master file leader and directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MstFormat {
    /// 16-bit record length, base address and directory fields.
    #[default]
    Isis,
    /// 32-bit record length, base address and directory fields, for
    /// records larger than 32767 bytes.
    Ffi,
}

/// Master file reading parameters.
///
/// The defaults describe the common case: ISIS widths, little endian,
/// lockable, unpacked (4-byte aligned) leader and directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MstConfig {
    /// Leader/directory width variant.
    pub format: MstFormat,
    /// Integer byte order.
    pub endianness: Endianness,
    /// Multi-user locking: when set, the sign of the stored record length
    /// is a per-record write lock flag.
    pub lockable: bool,
    /// When false (the default), the leader and FFI directory carry two
    /// slack bytes for 4-byte field alignment, as CISIS-written files do.
    pub packed: bool,
    /// Smallest record alignment modulus; the effective modulus is
    /// `max(min_modulus, 1 << shift)`. Must be a power of two.
    pub min_modulus: u32,
    /// Control record length in bytes; records start at this offset.
    pub control_len: u32,
}

impl Default for MstConfig {
    fn default() -> Self {
        MstConfig {
            format: MstFormat::default(),
            endianness: Endianness::default(),
            lockable: true,
            packed: false,
            min_modulus: 2,
            control_len: 64,
        }
    }
}

impl MstConfig {
    /// Record leader size in bytes under this configuration.
    #[must_use]
    pub fn leader_len(&self) -> u64 {
        let ffi = matches!(self.format, MstFormat::Ffi);
        18 + if ffi { 4 } else { 0 } + if self.packed { 0 } else { 2 }
    }

    /// Directory entry size in bytes under this configuration.
    #[must_use]
    pub fn dir_entry_len(&self) -> u64 {
        let ffi = matches!(self.format, MstFormat::Ffi);
        6 + if ffi { 4 } else { 0 } + if ffi && !self.packed { 2 } else { 0 }
    }

    fn validate(&self) -> Result<()> {
        if self.min_modulus == 0 || !self.min_modulus.is_power_of_two() {
            return Err(IsisError::Format {
                offset: 0,
                message: format!("min_modulus {} is not a power of two", self.min_modulus),
            });
        }
        if self.control_len < CONTROL_RECORD_FIELDS_LEN {
            return Err(IsisError::Format {
                offset: 0,
                message: format!(
                    "control_len {} is smaller than the {CONTROL_RECORD_FIELDS_LEN}-byte control record",
                    self.control_len
                ),
            });
        }
        Ok(())
    }
}

/// Parsed MST control record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRecord {
    /// One past the highest MFN ever assigned in this base.
    pub next_mfn: u32,
    /// 1-based block where the next record would be written.
    pub next_block: i32,
    /// 1-based offset inside that block.
    pub next_offset: u16,
    /// Legacy MFTYPE byte.
    pub mftype: u8,
    /// XRF pointer shift (MSTXL).
    pub shift: u8,
    /// Effective record alignment modulus.
    pub modulus: u32,
    /// Record count kept during backup/restore.
    pub reccnt: i32,
    /// Statistics field.
    pub mfcxx1: i32,
    /// Statistics field; data-entry lock counter on lockable bases.
    pub mfcxx2: i32,
    /// Statistics field; exclusive-write lock on lockable bases.
    pub mfcxx3: i32,
}

impl ControlRecord {
    fn parse(bytes: &[u8], config: &MstConfig) -> Result<Self> {
        let endianness = config.endianness;
        let mut cursor = Cursor::new(bytes);

        let ctl_mfn = endianness.read_i32(&mut cursor)?;
        if ctl_mfn != 0 {
            return Err(IsisError::format_at(
                0,
                format!("control record MFN is {ctl_mfn}, expected 0"),
            ));
        }
        let next_mfn = endianness.read_i32(&mut cursor)?;
        if next_mfn < 1 {
            return Err(IsisError::format_at(
                4,
                format!("control record next_mfn is {next_mfn}"),
            ));
        }
        let next_block = endianness.read_i32(&mut cursor)?;
        let next_offset = endianness.read_u16(&mut cursor)?;

        // The legacy 16-bit MFTYPE slot holds MFTYPE and MSTXL, ordered by
        // the file's endianness.
        let mut pair = [0u8; 2];
        cursor.read_exact(&mut pair)?;
        let (mftype, mstxl) = match endianness {
            Endianness::Little => (pair[0], pair[1]),
            Endianness::Big => (pair[1], pair[0]),
        };
        if mstxl > 9 {
            return Err(IsisError::format_at(
                14,
                format!("XRF shift {mstxl} out of range"),
            ));
        }

        let modulus = config.min_modulus.max(1 << mstxl);
        if config.control_len % modulus != 0 {
            return Err(IsisError::format_at(
                14,
                format!(
                    "control_len {} is not a multiple of the modulus {modulus}",
                    config.control_len
                ),
            ));
        }

        Ok(ControlRecord {
            next_mfn: next_mfn as u32,
            next_block,
            next_offset,
            mftype,
            shift: mstxl,
            modulus,
            reccnt: endianness.read_i32(&mut cursor)?,
            mfcxx1: endianness.read_i32(&mut cursor)?,
            mfcxx2: endianness.read_i32(&mut cursor)?,
            mfcxx3: endianness.read_i32(&mut cursor)?,
        })
    }
}

/// One master file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MstRecord {
    /// Master file number, 1-based.
    pub mfn: u32,
    /// Raw status word from the leader: 0 active, 1 logically deleted.
    pub status: u16,
    /// False when the XRF pointer or the leader status flags the record as
    /// logically deleted.
    pub active: bool,
    /// Record write lock (the sign of the stored record length on
    /// lockable bases).
    pub locked: bool,
    /// `(tag, value)` pairs in record order. Tags are numeric in master
    /// files.
    pub fields: Vec<(u32, Vec<u8>)>,
}

/// Reader for an MST+XRF master file pair.
///
/// Holds exclusive read handles to both files; lookups seek each file
/// independently and records are materialized one at a time. Handles are
/// released on drop.
#[derive(Debug)]
pub struct MstReader {
    mst: File,
    mst_len: u64,
    xrf: XrfFile,
    config: MstConfig,
    control: ControlRecord,
}

impl MstReader {
    /// Open `<name>.mst` and its companion `<name>.xrf` with the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// See [`MstReader::open_with`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        MstReader::open_with(path, MstConfig::default())
    }

    /// Open a master file pair with an explicit configuration.
    ///
    /// The XRF path is derived from the MST path by swapping the extension,
    /// matching its case (`base.mst` → `base.xrf`, `BASE.MST` → `BASE.XRF`).
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Io`] when either file cannot be opened,
    /// [`IsisError::Format`] when the control record is malformed, and
    /// [`IsisError::Xrf`] when the XRF is too short for the control
    /// record's `next_mfn`.
    pub fn open_with(path: impl AsRef<Path>, config: MstConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let mut mst = File::open(path)?;
        let mst_len = mst.metadata()?.len();

        let mut control_bytes = vec![0u8; config.control_len as usize];
        mst.read_exact(&mut control_bytes).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                IsisError::Truncated(format!(
                    "{} is shorter than its {}-byte control record",
                    path.display(),
                    config.control_len
                ))
            } else {
                IsisError::Io(err)
            }
        })?;
        let control = ControlRecord::parse(&control_bytes, &config)?;
        debug!(
            "control record: next_mfn={} next_block={} shift={} modulus={}",
            control.next_mfn, control.next_block, control.shift, control.modulus
        );

        let xrf_path = companion_xrf_path(path);
        let xrf = XrfFile::open(&xrf_path, config.endianness, control.shift)?;
        if u64::from(control.next_mfn - 1) > u64::from(xrf.capacity()) {
            return Err(IsisError::Xrf(format!(
                "{} holds {} pointers, control record expects {}",
                xrf_path.display(),
                xrf.capacity(),
                control.next_mfn - 1
            )));
        }

        info!(
            "opened {} ({} bytes, {} records)",
            path.display(),
            mst_len,
            control.next_mfn - 1
        );
        Ok(MstReader {
            mst,
            mst_len,
            xrf,
            config,
            control,
        })
    }

    /// The parsed control record.
    #[must_use]
    pub fn control(&self) -> &ControlRecord {
        &self.control
    }

    /// The configuration this reader was opened with.
    #[must_use]
    pub fn config(&self) -> &MstConfig {
        &self.config
    }

    /// Read the record stored under an MFN.
    ///
    /// Returns `Ok(None)` when the XRF slot was never written. Logically
    /// deleted records are returned with `active == false`.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Xrf`] for out-of-range MFNs and pointers
    /// outside the master file, [`IsisError::Format`] for malformed record
    /// leaders or directories (offsets are absolute MST file positions),
    /// and [`IsisError::Truncated`] when the file ends inside a record.
    pub fn record(&mut self, mfn: u32) -> Result<Option<MstRecord>> {
        if mfn == 0 || mfn >= self.control.next_mfn {
            return Err(IsisError::Xrf(format!(
                "MFN {mfn} out of range, next_mfn is {}",
                self.control.next_mfn
            )));
        }
        let entry = self.xrf.entry(mfn)?;
        if entry.is_empty() {
            trace!("mfn {mfn}: never written");
            return Ok(None);
        }
        let block = u64::from(entry.block.unsigned_abs());
        if block == 0 {
            return Err(IsisError::Xrf(format!(
                "XRF pointer for MFN {mfn} has offset {} in block 0",
                entry.offset
            )));
        }

        let start = (block - 1) * MST_BLOCK_LEN + u64::from(entry.offset);
        let leader_len = self.config.leader_len();
        if start + leader_len > self.mst_len {
            return Err(IsisError::Xrf(format!(
                "XRF pointer for MFN {mfn} points at byte {start}, past the {}-byte master file",
                self.mst_len
            )));
        }

        self.mst.seek(SeekFrom::Start(start))?;
        let leader = self.read_leader(start)?;
        if leader.mfn != mfn as i32 {
            return Err(IsisError::format_at(
                start,
                format!("record leader carries MFN {}, expected {mfn}", leader.mfn),
            ));
        }
        if leader.old_block != 0 || leader.old_offset != 0 {
            return Err(IsisError::format_at(
                start,
                format!(
                    "MFN {mfn} has a pending master file reorganization (backward pointer {}:{})",
                    leader.old_block, leader.old_offset
                ),
            ));
        }
        if leader.total_len % self.control.modulus != 0 {
            return Err(IsisError::format_at(
                start,
                format!(
                    "MFN {mfn} record length {} is not aligned to modulus {}",
                    leader.total_len, self.control.modulus
                ),
            ));
        }

        let entry_len = self.config.dir_entry_len();
        let expected_base = leader_len + entry_len * u64::from(leader.num_fields);
        if u64::from(leader.base_addr) != expected_base {
            return Err(IsisError::format_at(
                start,
                format!(
                    "MFN {mfn} base address {} does not match {} directory entries",
                    leader.base_addr, leader.num_fields
                ),
            ));
        }

        let directory = self.read_directory(leader.num_fields)?;
        let mut fields = Vec::with_capacity(directory.len());
        let mut expected_pos = 0u32;
        for (tag, pos, len) in directory {
            if pos != expected_pos {
                return Err(IsisError::format_at(
                    start,
                    format!("MFN {mfn} field {tag} at position {pos}, expected {expected_pos}"),
                ));
            }
            let mut value = vec![0u8; len as usize];
            self.read_exact_or_truncated(&mut value)?;
            fields.push((tag, value));
            expected_pos += len;
        }
        if u64::from(leader.base_addr) + u64::from(expected_pos) > u64::from(leader.total_len) {
            return Err(IsisError::format_at(
                start,
                format!(
                    "MFN {mfn} fields overrun the stored record length {}",
                    leader.total_len
                ),
            ));
        }

        let active = !entry.is_deleted() && leader.status == 0;
        trace!(
            "mfn {mfn}: {} fields, {} bytes, active={active}",
            fields.len(),
            leader.total_len
        );
        Ok(Some(MstRecord {
            mfn,
            status: leader.status,
            active,
            locked: leader.locked,
            fields,
        }))
    }

    /// Iterate over all records in ascending MFN order.
    ///
    /// Never-written MFNs are skipped. With `only_active`, logically
    /// deleted records are skipped as well.
    pub fn records(&mut self, only_active: bool) -> MstRecords<'_> {
        MstRecords {
            next_mfn: 1,
            only_active,
            done: false,
            reader: self,
        }
    }

    fn read_leader(&mut self, start: u64) -> Result<RecordLeader> {
        let endianness = self.config.endianness;
        let ffi = matches!(self.config.format, MstFormat::Ffi);

        let mfn = endianness.read_i32(&mut self.mst)?;
        let (total_len, locked) = if self.config.lockable {
            let raw = if ffi {
                endianness.read_i32(&mut self.mst)?
            } else {
                i32::from(endianness.read_i16(&mut self.mst)?)
            };
            (raw.unsigned_abs(), raw < 0)
        } else {
            let raw = if ffi {
                endianness.read_u32(&mut self.mst)?
            } else {
                u32::from(endianness.read_u16(&mut self.mst)?)
            };
            (raw, false)
        };
        if !ffi && !self.config.packed {
            self.skip_slack()?;
        }
        let old_block = endianness.read_i32(&mut self.mst)?;
        let old_offset = endianness.read_u16(&mut self.mst)?;
        if ffi && !self.config.packed {
            self.skip_slack()?;
        }
        let base_addr = if ffi {
            endianness.read_u32(&mut self.mst)?
        } else {
            u32::from(endianness.read_u16(&mut self.mst)?)
        };
        let num_fields = endianness.read_u16(&mut self.mst)?;
        let status = endianness.read_u16(&mut self.mst)?;

        if mfn == 0 {
            return Err(IsisError::format_at(
                start,
                "record leader carries MFN 0 (control record)".to_string(),
            ));
        }
        Ok(RecordLeader {
            mfn,
            total_len,
            locked,
            old_block,
            old_offset,
            base_addr,
            num_fields,
            status,
        })
    }

    fn read_directory(&mut self, num_fields: u16) -> Result<Vec<(u32, u32, u32)>> {
        let endianness = self.config.endianness;
        let ffi = matches!(self.config.format, MstFormat::Ffi);
        let entry_len = self.config.dir_entry_len() as usize;

        let mut buf = vec![0u8; entry_len * usize::from(num_fields)];
        self.read_exact_or_truncated(&mut buf)?;
        let mut cursor = Cursor::new(buf.as_slice());

        let mut entries = Vec::with_capacity(usize::from(num_fields));
        for _ in 0..num_fields {
            let tag = u32::from(endianness.read_u16(&mut cursor)?);
            if ffi && !self.config.packed {
                cursor.seek(SeekFrom::Current(2))?;
            }
            let (pos, len) = if ffi {
                (
                    endianness.read_u32(&mut cursor)?,
                    endianness.read_u32(&mut cursor)?,
                )
            } else {
                (
                    u32::from(endianness.read_u16(&mut cursor)?),
                    u32::from(endianness.read_u16(&mut cursor)?),
                )
            };
            entries.push((tag, pos, len));
        }
        Ok(entries)
    }

    fn skip_slack(&mut self) -> Result<()> {
        let mut slack = [0u8; 2];
        self.read_exact_or_truncated(&mut slack)
    }

    fn read_exact_or_truncated(&mut self, buf: &mut [u8]) -> Result<()> {
        self.mst.read_exact(buf).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                IsisError::Truncated(format!(
                    "master file ends inside a record ({} bytes missing)",
                    buf.len()
                ))
            } else {
                IsisError::Io(err)
            }
        })
    }
}

#[derive(Debug)]
struct RecordLeader {
    mfn: i32,
    total_len: u32,
    locked: bool,
    old_block: i32,
    old_offset: u16,
    base_addr: u32,
    num_fields: u16,
    status: u16,
}

/// Ascending-MFN record iterator returned by [`MstReader::records`].
#[derive(Debug)]
pub struct MstRecords<'a> {
    reader: &'a mut MstReader,
    next_mfn: u32,
    only_active: bool,
    done: bool,
}

impl Iterator for MstRecords<'_> {
    type Item = Result<MstRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && self.next_mfn < self.reader.control.next_mfn {
            let mfn = self.next_mfn;
            self.next_mfn += 1;
            match self.reader.record(mfn) {
                Ok(None) => continue,
                Ok(Some(record)) => {
                    if self.only_active && !record.active {
                        continue;
                    }
                    return Some(Ok(record));
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

/// Derive the XRF path from the MST path, matching the extension's case.
fn companion_xrf_path(path: &Path) -> PathBuf {
    let upper = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| !ext.is_empty() && !ext.chars().any(|c| c.is_ascii_lowercase()));
    path.with_extension(if upper { "XRF" } else { "xrf" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control_bytes_le(next_mfn: i32, shift: u8) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&next_mfn.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&64u16.to_le_bytes());
        bytes.push(0); // mftype
        bytes.push(shift);
        bytes.extend_from_slice(&0i32.to_le_bytes()); // reccnt
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.resize(64, 0);
        bytes
    }

    #[test]
    fn parses_little_endian_control_record() {
        let config = MstConfig::default();
        let control = ControlRecord::parse(&control_bytes_le(5, 0), &config).unwrap();
        assert_eq!(control.next_mfn, 5);
        assert_eq!(control.next_block, 1);
        assert_eq!(control.next_offset, 64);
        assert_eq!(control.shift, 0);
        assert_eq!(control.modulus, 2);
    }

    #[test]
    fn shift_raises_modulus() {
        let config = MstConfig::default();
        let control = ControlRecord::parse(&control_bytes_le(2, 6), &config).unwrap();
        assert_eq!(control.shift, 6);
        assert_eq!(control.modulus, 64);
    }

    #[test]
    fn nonzero_control_mfn_fails() {
        let mut bytes = control_bytes_le(2, 0);
        bytes[0] = 7;
        let err = ControlRecord::parse(&bytes, &MstConfig::default()).unwrap_err();
        assert!(matches!(err, IsisError::Format { offset: 0, .. }), "got: {err}");
    }

    #[test]
    fn big_endian_swaps_the_mftype_pair() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&3i32.to_be_bytes());
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&64u16.to_be_bytes());
        bytes.push(6); // mstxl comes first on big endian
        bytes.push(0); // mftype
        bytes.resize(64, 0);
        let config = MstConfig {
            endianness: Endianness::Big,
            ..MstConfig::default()
        };
        let control = ControlRecord::parse(&bytes, &config).unwrap();
        assert_eq!(control.next_mfn, 3);
        assert_eq!(control.shift, 6);
        assert_eq!(control.mftype, 0);
    }

    #[test]
    fn isis_unpacked_sizes() {
        let config = MstConfig::default();
        assert_eq!(config.leader_len(), 20);
        assert_eq!(config.dir_entry_len(), 6);
    }

    #[test]
    fn ffi_unpacked_sizes() {
        let config = MstConfig {
            format: MstFormat::Ffi,
            ..MstConfig::default()
        };
        assert_eq!(config.leader_len(), 24);
        assert_eq!(config.dir_entry_len(), 12);
    }

    #[test]
    fn packed_sizes() {
        let isis = MstConfig {
            packed: true,
            ..MstConfig::default()
        };
        assert_eq!(isis.leader_len(), 18);
        assert_eq!(isis.dir_entry_len(), 6);
        let ffi = MstConfig {
            format: MstFormat::Ffi,
            packed: true,
            ..MstConfig::default()
        };
        assert_eq!(ffi.leader_len(), 22);
        assert_eq!(ffi.dir_entry_len(), 10);
    }

    #[test]
    fn xrf_path_matches_extension_case() {
        assert_eq!(
            companion_xrf_path(Path::new("data/base.mst")),
            PathBuf::from("data/base.xrf")
        );
        assert_eq!(
            companion_xrf_path(Path::new("DATA/BASE.MST")),
            PathBuf::from("DATA/BASE.XRF")
        );
    }

    #[test]
    fn bad_min_modulus_is_rejected() {
        let config = MstConfig {
            min_modulus: 3,
            ..MstConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
