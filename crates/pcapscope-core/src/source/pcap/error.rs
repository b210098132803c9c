use thiserror::Error;

/// Fatal problems with the 24-byte global header.
///
/// # Examples
/// ```
/// use pcapscope_core::{FormatError, parse_header};
///
/// let err = parse_header(&[0u8; 4]).unwrap_err();
/// assert!(matches!(err, FormatError::HeaderTooShort { actual: 4, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("capture header too short: need {needed} bytes, got {actual}")]
    HeaderTooShort { needed: usize, actual: usize },
    #[error("unrecognized capture magic number: {magic:#010x}")]
    UnknownMagic { magic: u32 },
}

/// A frame record whose header or payload runs past the end of the buffer.
///
/// Frame iteration stops after yielding this error; records decoded before it
/// remain valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "truncated record {index} at offset {offset}: need {needed} bytes, {available} available"
)]
pub struct TruncatedRecordError {
    /// Zero-based index of the record that could not be read.
    pub index: u64,
    /// Byte offset of the record header within the capture buffer.
    pub offset: usize,
    /// Bytes required from `offset` to complete the record.
    pub needed: usize,
    /// Bytes remaining from `offset`.
    pub available: usize,
}
