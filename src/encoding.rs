//! Character encoding support for ISIS data.
//!
//! Field values in ISO 2709 and master files are byte strings in some legacy
//! character set, most commonly Windows code page 1252. This module adapts
//! [`encoding_rs`] to the strict semantics the codecs need: any malformed or
//! unmappable input is an error, never replaced silently.

use crate::error::{IsisError, Result};
use encoding_rs::Encoding;

/// Default encoding for ISO 2709 payload bytes.
pub const DEFAULT_ISO_ENCODING: &str = "cp1252";
/// Default encoding for master file payload bytes.
pub const DEFAULT_MST_ENCODING: &str = "cp1252";
/// Default encoding for JSONL text.
pub const DEFAULT_JSONL_ENCODING: &str = "utf-8";

/// A named byte encoding used to transcode field payloads.
///
/// Thin wrapper over an [`encoding_rs::Encoding`], resolved by WHATWG label
/// (`"cp1252"`, `"utf-8"`, `"ibm866"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteEncoding {
    inner: &'static Encoding,
}

impl ByteEncoding {
    /// Resolve an encoding by label.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Encoding`] if the label names no known encoding.
    pub fn for_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.as_bytes())
            .map(|inner| ByteEncoding { inner })
            .ok_or_else(|| IsisError::Encoding(format!("unknown encoding label {label:?}")))
    }

    /// Canonical name of the underlying encoding.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Decode a byte string to text.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Encoding`] when the bytes are malformed under
    /// this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let (text, had_errors) = self.inner.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(IsisError::Encoding(format!(
                "malformed {} byte sequence",
                self.name()
            )));
        }
        Ok(text.into_owned())
    }

    /// Encode text to a byte string.
    ///
    /// # Errors
    ///
    /// Returns [`IsisError::Encoding`] when a character has no representation
    /// in this encoding.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let (bytes, _, had_errors) = self.inner.encode(text);
        if had_errors {
            return Err(IsisError::Encoding(format!(
                "text not representable in {}",
                self.name()
            )));
        }
        Ok(bytes.into_owned())
    }
}

impl Default for ByteEncoding {
    fn default() -> Self {
        ByteEncoding {
            inner: encoding_rs::WINDOWS_1252,
        }
    }
}
