#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! ## Modules
//!
//! - [`record`] — the in-memory record model ([`RawRecord`], [`RawField`])
//! - [`leader`] — the 24-byte ISO 2709 leader and directory [`Geometry`]
//! - [`reader`] — parsing ISO 2709 records from buffers and streams
//! - [`writer`] — building ISO 2709 records and writing streams
//! - [`wrap`] — fixed-width line wrapping around the ISO byte stream
//! - [`mst`] — reading CDS/ISIS master files by MFN
//! - [`xrf`] — the packed cross-reference pointer file
//! - [`subfield`] — the `^k` subfield mini-language
//! - [`jsonl`] — the `{tag: [value, …]}` dictionary view
//! - [`encoding`] — character set conversion (`encoding_rs` labels)
//! - [`error`] — error types and the [`Result`] alias

pub mod encoding;
pub mod error;
pub mod jsonl;
pub mod leader;
pub mod mst;
pub mod reader;
pub mod record;
pub mod subfield;
pub mod wrap;
pub mod writer;
pub mod xrf;

pub use encoding::ByteEncoding;
pub use error::{IsisError, Result};
pub use jsonl::{FieldMode, Mapper};
pub use leader::{Geometry, Leader};
pub use mst::{ControlRecord, Endianness, MstConfig, MstFormat, MstReader, MstRecord};
pub use reader::{parse_record, IsoReader};
pub use record::{RawField, RawRecord};
pub use subfield::SubfieldParser;
pub use wrap::LineSpec;
pub use writer::{build_record, IsoWriter};
pub use xrf::{XrfEntry, XrfFile};
