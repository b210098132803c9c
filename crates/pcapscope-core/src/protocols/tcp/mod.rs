//! TCP transport-layer decoding.
//!
//! Decodes the fixed header, the control flags and the variable-length
//! options so callers get the true payload offset. The segment slice should
//! be bounded by the IPv4 total length.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::TcpError;
pub use parser::{TcpFlags, TcpHeader, decode_tcp};
pub use reader::TcpOption;
