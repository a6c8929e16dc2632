//! In-memory record model shared by all codecs.
//!
//! A record is an ordered sequence of `(tag, value)` byte-string pairs. The
//! codecs treat both sides as opaque bytes: tags are fixed-width (three
//! ASCII digits in standard use, but any bytes are accepted) and values may
//! hold anything except the active field terminator. The same tag may
//! repeat; order is preserved on read and on round trip.

use crate::leader::{Geometry, Leader};
use serde::{Deserialize, Serialize};

/// One field of a record: tag, value and optional per-entry custom bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Directory tag bytes (fixed width per the geometry).
    pub tag: Vec<u8>,
    /// Field value bytes, excluding the trailing field terminator.
    pub value: Vec<u8>,
    /// Custom directory bytes; empty means "use the default filler" when
    /// the geometry has a non-zero custom width.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<u8>,
}

impl RawField {
    /// Create a field with no custom bytes.
    #[must_use]
    pub fn new(tag: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        RawField {
            tag: tag.into(),
            value: value.into(),
            custom: Vec::new(),
        }
    }
}

/// An ISO 2709 record: leader metadata plus ordered fields.
///
/// The leader's `total_len` and `base_addr` are recomputed on every build,
/// so they may be left at zero when constructing records by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Leader metadata; opaque bytes survive a parse/build round trip.
    pub leader: Leader,
    /// Fields in record order.
    pub fields: Vec<RawField>,
}

impl RawRecord {
    /// Create an empty record whose leader carries the geometry's
    /// directory widths and conventional defaults elsewhere.
    #[must_use]
    pub fn new(geom: &Geometry) -> Self {
        RawRecord {
            leader: Leader::with_geometry(geom),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn push(&mut self, tag: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.fields.push(RawField::new(tag, value));
    }

    /// Append a field from string slices.
    pub fn push_str(&mut self, tag: &str, value: &str) {
        self.push(tag.as_bytes().to_vec(), value.as_bytes().to_vec());
    }

    /// Iterate over the fields carrying a given tag, in record order.
    pub fn fields_by_tag<'a>(&'a self, tag: &'a [u8]) -> impl Iterator<Item = &'a RawField> {
        self.fields.iter().filter(move |field| field.tag == tag)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields. Empty records are legal in
    /// ISO 2709 and still carry a leader and a record terminator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
