use thiserror::Error;

use crate::protocols::common::OutOfBounds;

/// Internally inconsistent or out-of-bounds TCP headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TcpError {
    #[error("TCP header too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid TCP data offset: {data_offset} bytes")]
    InvalidDataOffset { data_offset: usize },
    #[error("TCP header of {data_offset} bytes at offset {offset} exceeds {available} available bytes")]
    HeaderOutOfBounds {
        offset: usize,
        data_offset: usize,
        available: usize,
    },
    #[error("invalid TCP option kind {kind} at option byte {position}")]
    InvalidOption { kind: u8, position: usize },
}

impl From<OutOfBounds> for TcpError {
    fn from(err: OutOfBounds) -> Self {
        TcpError::TooShort {
            needed: err.needed,
            actual: err.actual,
        }
    }
}
