use thiserror::Error;

use crate::protocols::common::OutOfBounds;

/// Internally inconsistent or out-of-bounds IPv4 headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ipv4Error {
    #[error("IPv4 header too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid IPv4 version: {version}")]
    InvalidVersion { version: u8 },
    #[error("invalid IPv4 header length: {header_length} bytes")]
    InvalidHeaderLength { header_length: usize },
    #[error("IPv4 header of {header_length} bytes at offset {offset} exceeds frame of {frame_len} bytes")]
    HeaderOutOfBounds {
        offset: usize,
        header_length: usize,
        frame_len: usize,
    },
    #[error(
        "invalid IPv4 total length {total_length}: header is {header_length} bytes, {available} bytes available"
    )]
    InvalidTotalLength {
        total_length: u16,
        header_length: usize,
        available: usize,
    },
}

impl From<OutOfBounds> for Ipv4Error {
    fn from(err: OutOfBounds) -> Self {
        Ipv4Error::TooShort {
            needed: err.needed,
            actual: err.actual,
        }
    }
}
