//! Capture sources.
//!
//! Everything here works on a fully materialized byte buffer; reading the
//! file into memory happens in the analysis entry points.

pub mod pcap;

pub use pcap::{
    ByteOrder, CaptureFileHeader, FormatError, FrameRecord, Frames, TimestampPrecision,
    TruncatedRecordError, classify_magic, frames, parse_header,
};
