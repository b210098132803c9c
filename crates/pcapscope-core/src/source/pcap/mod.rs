//! libpcap capture file decoding.
//!
//! `parse_header` reads the 24-byte global header and fixes the byte order
//! for everything that follows; `frames` walks the record sequence lazily,
//! borrowing each payload from the caller's buffer. Offsets live in `layout`,
//! byte-order aware reads in `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::{FormatError, TruncatedRecordError};
pub use parser::{CaptureFileHeader, FrameRecord, Frames, frames, parse_header};
pub use reader::{ByteOrder, TimestampPrecision, classify_magic};
