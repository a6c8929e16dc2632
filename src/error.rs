//! Error types for ISIS data conversion.
//!
//! This module provides the [`IsisError`] type shared by all codecs in the
//! crate and the [`Result`] convenience alias.

use thiserror::Error;

/// Error type for all ISIS codec operations.
///
/// Parse-side errors ([`IsisError::Format`]) carry the byte offset where the
/// violation was detected. For records read through [`crate::IsoReader`] with
/// line wrapping active, the offset is expressed in unwrapped content bytes.
#[derive(Error, Debug)]
pub enum IsisError {
    /// A parsed byte stream violates a structural invariant of the format.
    #[error("format error at byte {offset}: {message}")]
    Format {
        /// Byte offset where the violation was detected.
        offset: u64,
        /// Description of the violated invariant.
        message: String,
    },

    /// End of input reached in the middle of a record.
    #[error("truncated record: {0}")]
    Truncated(String),

    /// A build input does not fit the configured geometry.
    #[error("overflow: {0}")]
    Overflow(String),

    /// Transcoding failed under the configured character set.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The cross-reference file is inconsistent with the master file.
    #[error("XRF error: {0}")]
    Xrf(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IsisError {
    /// Build a [`IsisError::Format`] at the given byte offset.
    pub(crate) fn format_at(offset: u64, message: impl Into<String>) -> Self {
        IsisError::Format {
            offset,
            message: message.into(),
        }
    }

    /// Shift the offset of a [`IsisError::Format`] by `base` bytes.
    ///
    /// Used to turn record-relative offsets into stream offsets.
    pub(crate) fn offset_by(self, base: u64) -> Self {
        match self {
            IsisError::Format { offset, message } => IsisError::Format {
                offset: offset + base,
                message,
            },
            other => other,
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`IsisError`].
pub type Result<T> = std::result::Result<T, IsisError>;
