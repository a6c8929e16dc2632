//! ISO 2709 record leader and directory geometry.
//!
//! The leader is a 24-byte fixed header at the start of every ISO 2709
//! record. Its layout:
//!
//! - Positions 0-4: total record length (5 digits)
//! - Position 5: record status
//! - Position 6: record type
//! - Positions 7-8: custom metadata (2 bytes)
//! - Position 9: character coding
//! - Position 10: indicator count (1 digit)
//! - Position 11: identifier length (1 digit)
//! - Positions 12-16: base address of field data (5 digits)
//! - Positions 17-19: custom metadata (3 bytes)
//! - Positions 20-22: directory entry map — length-of-length,
//!   length-of-position and length-of-custom widths (1 digit each)
//! - Position 23: reserved (opaque, round-tripped verbatim)
//!
//! The single-byte metadata positions are opaque to the codec: they are
//! preserved on parse and rebuild but never interpreted.

use crate::error::{IsisError, Result};
use serde::{Deserialize, Serialize};

/// Length of the ISO 2709 leader in bytes.
pub const LEADER_LEN: usize = 24;

/// Default directory tag width in bytes.
pub const DEFAULT_TAG_LEN: usize = 3;
/// Default width of the per-entry field length, in digits.
pub const DEFAULT_LEN_LEN: usize = 4;
/// Default width of the per-entry field position, in digits.
pub const DEFAULT_POS_LEN: usize = 5;
/// Default width of the per-entry custom bytes.
pub const DEFAULT_CUSTOM_LEN: usize = 0;
/// Default field terminator byte (`#`).
pub const DEFAULT_FIELD_TERMINATOR: u8 = b'#';
/// Default record terminator byte (`#`).
pub const DEFAULT_RECORD_TERMINATOR: u8 = b'#';

/// Directory geometry and terminators for the ISO 2709 codec.
///
/// The directory widths here are *build-time* defaults: when parsing, the
/// per-entry widths come from the leader's entry map instead, and only
/// `tag_len` and the terminators are taken from the geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    /// Directory tag width in bytes.
    pub tag_len: usize,
    /// Width of the per-entry field length, in digits (0-9).
    pub len_len: usize,
    /// Width of the per-entry field position, in digits (0-9).
    pub pos_len: usize,
    /// Width of the per-entry custom bytes (0-9).
    pub custom_len: usize,
    /// Byte terminating each field and the directory.
    pub field_terminator: u8,
    /// Byte terminating the whole record.
    pub record_terminator: u8,
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            tag_len: DEFAULT_TAG_LEN,
            len_len: DEFAULT_LEN_LEN,
            pos_len: DEFAULT_POS_LEN,
            custom_len: DEFAULT_CUSTOM_LEN,
            field_terminator: DEFAULT_FIELD_TERMINATOR,
            record_terminator: DEFAULT_RECORD_TERMINATOR,
        }
    }
}

/// ISO 2709 record leader.
///
/// `total_len` and `base_addr` are recomputed on every build; the remaining
/// fields are opaque metadata with conventional defaults, preserved verbatim
/// across a parse/build round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    /// Total record length in bytes, including the record terminator and
    /// not counting line-wrap inserts.
    pub total_len: u32,
    /// Record status byte.
    pub status: u8,
    /// Record type byte.
    pub record_type: u8,
    /// Custom metadata, positions 7-8.
    pub custom_2: [u8; 2],
    /// Character coding byte.
    pub coding: u8,
    /// Indicator count (0-9).
    pub indicator_count: u8,
    /// Identifier length (0-9).
    pub identifier_len: u8,
    /// Offset from record start to the field data region.
    pub base_addr: u32,
    /// Custom metadata, positions 17-19.
    pub custom_3: [u8; 3],
    /// Directory width of the field length, in digits (0-9).
    pub len_len: u8,
    /// Directory width of the field position, in digits (0-9).
    pub pos_len: u8,
    /// Directory width of the custom bytes (0-9).
    pub custom_len: u8,
    /// Reserved byte of the entry map, round-tripped verbatim.
    pub reserved: u8,
}

impl Leader {
    /// Create a leader with conventional defaults and the directory widths
    /// of the given geometry.
    #[must_use]
    pub fn with_geometry(geom: &Geometry) -> Self {
        Leader {
            total_len: 0,
            status: b'0',
            record_type: b'0',
            custom_2: [b'0'; 2],
            coding: b'0',
            indicator_count: 0,
            identifier_len: 0,
            base_addr: 0,
            custom_3: [b'0'; 3],
            len_len: geom.len_len as u8,
            pos_len: geom.pos_len as u8,
            custom_len: geom.custom_len as u8,
            reserved: b'0',
        }
    }

    /// Parse a leader from the first 24 bytes of a record.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Truncated`] on short input and
    /// [`IsisError::Format`] (with a record-relative offset) when a numeric
    /// position holds a non-digit byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(IsisError::Truncated(format!(
                "leader needs {LEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Leader {
            total_len: parse_digits(&bytes[0..5], "total_len", 0)?,
            status: bytes[5],
            record_type: bytes[6],
            custom_2: [bytes[7], bytes[8]],
            coding: bytes[9],
            indicator_count: parse_digit(bytes[10], "indicator_count", 10)?,
            identifier_len: parse_digit(bytes[11], "identifier_len", 11)?,
            base_addr: parse_digits(&bytes[12..17], "base_addr", 12)?,
            custom_3: [bytes[17], bytes[18], bytes[19]],
            len_len: parse_digit(bytes[20], "len_len", 20)?,
            pos_len: parse_digit(bytes[21], "pos_len", 21)?,
            custom_len: parse_digit(bytes[22], "custom_len", 22)?,
            reserved: bytes[23],
        })
    }

    /// Serialize the leader to its 24-byte form.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Overflow`] when `total_len` or `base_addr` does
    /// not fit its 5-digit slot.
    pub fn to_bytes(&self) -> Result<[u8; LEADER_LEN]> {
        let mut bytes = [0u8; LEADER_LEN];
        write_digits(&mut bytes[0..5], u64::from(self.total_len), "total_len")?;
        bytes[5] = self.status;
        bytes[6] = self.record_type;
        bytes[7..9].copy_from_slice(&self.custom_2);
        bytes[9] = self.coding;
        bytes[10] = digit_byte(self.indicator_count, "indicator_count")?;
        bytes[11] = digit_byte(self.identifier_len, "identifier_len")?;
        write_digits(&mut bytes[12..17], u64::from(self.base_addr), "base_addr")?;
        bytes[17..20].copy_from_slice(&self.custom_3);
        bytes[20] = digit_byte(self.len_len, "len_len")?;
        bytes[21] = digit_byte(self.pos_len, "pos_len")?;
        bytes[22] = digit_byte(self.custom_len, "custom_len")?;
        bytes[23] = self.reserved;
        Ok(bytes)
    }

    /// Directory entry size in bytes under this leader's entry map.
    #[must_use]
    pub fn entry_len(&self, geom: &Geometry) -> usize {
        geom.tag_len + self.len_len as usize + self.pos_len as usize + self.custom_len as usize
    }
}

/// Parse a zero-padded ASCII decimal field.
///
/// `at` is the record-relative offset of the first byte, used for error
/// reporting.
pub(crate) fn parse_digits(bytes: &[u8], what: &str, at: u64) -> Result<u32> {
    let mut value: u32 = 0;
    for (idx, &byte) in bytes.iter().enumerate() {
        if !byte.is_ascii_digit() {
            return Err(IsisError::format_at(
                at + idx as u64,
                format!("{what}: expected ASCII digit, got 0x{byte:02x}"),
            ));
        }
        value = value * 10 + u32::from(byte - b'0');
    }
    Ok(value)
}

pub(crate) fn parse_digit(byte: u8, what: &str, at: u64) -> Result<u8> {
    if !byte.is_ascii_digit() {
        return Err(IsisError::format_at(
            at,
            format!("{what}: expected ASCII digit, got 0x{byte:02x}"),
        ));
    }
    Ok(byte - b'0')
}

/// Render `value` as zero-padded ASCII decimal into `slot`.
///
/// Fails with [`IsisError::Overflow`] naming the field when the value does
/// not fit the slot width.
pub(crate) fn write_digits(slot: &mut [u8], value: u64, what: &str) -> Result<()> {
    let width = slot.len();
    let limit = 10u64.pow(width as u32);
    if value >= limit {
        return Err(IsisError::Overflow(format!(
            "{what} value {value} does not fit in {width} digits"
        )));
    }
    let mut rest = value;
    for byte in slot.iter_mut().rev() {
        *byte = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    Ok(())
}

fn digit_byte(value: u8, what: &str) -> Result<u8> {
    if value > 9 {
        return Err(IsisError::Overflow(format!(
            "{what} value {value} does not fit in 1 digit"
        )));
    }
    Ok(b'0' + value)
}
