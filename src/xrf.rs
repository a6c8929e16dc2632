//! Cross-reference (XRF) file access.
//!
//! The XRF is the index companion of an ISIS master file: an array of
//! packed 4-byte pointers, one per MFN, telling where in the MST each
//! record begins. The file is organized in 512-byte blocks, each holding a
//! 1-based `i32` block index (negative on the last block) followed by 127
//! pointers.
//!
//! A pointer word, read in the file's endianness, packs MSB-first:
//!
//! - `block` — `21 + shift` bits, signed. Positive is a 1-based MST block
//!   number; zero (with a zero offset and no flags) means never written;
//!   negative marks a logically deleted record.
//! - `is_new`, `is_updated` — one flag bit each.
//! - `offset` — `9 - shift` bits, scaled by `1 << shift`, the byte offset
//!   of the record inside its MST block.
//!
//! The `shift` comes from the control record's MSTXL field.

use crate::error::{IsisError, Result};
use crate::mst::Endianness;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;

/// XRF block size in bytes.
pub const XRF_BLOCK_LEN: u64 = 512;
/// Pointers per XRF block (not counting the block index).
pub const XRF_ENTRIES_PER_BLOCK: u64 = 127;

/// One unpacked XRF pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrfEntry {
    /// 1-based MST block number; negative when logically deleted.
    pub block: i32,
    /// Byte offset of the record inside the block.
    pub offset: u32,
    /// "New record" flag.
    pub is_new: bool,
    /// "Updated record" flag.
    pub is_updated: bool,
}

impl XrfEntry {
    /// Unpack a pointer word under the given XRF shift.
    #[must_use]
    pub fn unpack(word: u32, shift: u8) -> Self {
        let shift = u32::from(shift);
        let block_width = 21 + shift;
        let raw_block = word >> (32 - block_width);
        let block = ((raw_block << (32 - block_width)) as i32) >> (32 - block_width);
        let is_new = (word >> (10 - shift)) & 1 != 0;
        let is_updated = (word >> (9 - shift)) & 1 != 0;
        let offset_mask = (1u32 << (9 - shift)) - 1;
        let offset = (word & offset_mask) << shift;
        XrfEntry {
            block,
            offset,
            is_new,
            is_updated,
        }
    }

    /// Whether this slot was never written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.block == 0 && self.offset == 0 && !self.is_new && !self.is_updated
    }

    /// Whether the record is flagged as logically deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.block < 0
    }
}

/// Random-access reader over an open XRF file.
#[derive(Debug)]
pub struct XrfFile {
    file: File,
    len: u64,
    endianness: Endianness,
    shift: u8,
}

impl XrfFile {
    /// Open an XRF file with the endianness and shift of its master file.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Io`] when the file cannot be opened and
    /// [`IsisError::Xrf`] when its size is not a whole number of blocks.
    pub fn open(path: &Path, endianness: Endianness, shift: u8) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len == 0 || len % XRF_BLOCK_LEN != 0 {
            return Err(IsisError::Xrf(format!(
                "{} is {len} bytes, not a whole number of {XRF_BLOCK_LEN}-byte blocks",
                path.display()
            )));
        }
        Ok(XrfFile {
            file,
            len,
            endianness,
            shift,
        })
    }

    /// File length in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the file holds no blocks. An open XRF always has at least
    /// one, so this is only ever false.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest MFN this file has a slot for.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        ((self.len / XRF_BLOCK_LEN) * XRF_ENTRIES_PER_BLOCK) as u32
    }

    /// Look up the pointer for an MFN (1-based).
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Xrf`] when the MFN is zero, past the end of the
    /// file, or the containing block carries a wrong block index.
    pub fn entry(&mut self, mfn: u32) -> Result<XrfEntry> {
        if mfn == 0 {
            return Err(IsisError::Xrf("MFN 0 has no XRF slot".to_string()));
        }
        let block = u64::from(mfn - 1) / XRF_ENTRIES_PER_BLOCK;
        let slot = u64::from(mfn - 1) % XRF_ENTRIES_PER_BLOCK;
        let block_start = block * XRF_BLOCK_LEN;
        if block_start + XRF_BLOCK_LEN > self.len {
            return Err(IsisError::Xrf(format!(
                "XRF has no block for MFN {mfn} ({} bytes)",
                self.len
            )));
        }

        self.file.seek(SeekFrom::Start(block_start))?;
        let index = self.endianness.read_i32(&mut self.file)?;
        if index.unsigned_abs() as u64 != block + 1 {
            return Err(IsisError::Xrf(format!(
                "XRF block {} carries index {index}",
                block + 1
            )));
        }

        self.file.seek(SeekFrom::Start(block_start + 4 + slot * 4))?;
        let word = self.endianness.read_u32(&mut self.file)?;
        Ok(XrfEntry::unpack(word, self.shift))
    }
}
