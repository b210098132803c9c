//! HTTP/1.x application-layer decoding.
//!
//! Shares the TCP decoder's contract: a frame plus the offset where the
//! layer starts. Only the message head carried by a single segment is
//! decoded.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::HttpError;
pub use parser::{HeaderField, HttpMessage, StartLine, decode_http};
