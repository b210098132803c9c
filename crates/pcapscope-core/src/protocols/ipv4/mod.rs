//! IPv4 network-layer decoding.
//!
//! The decoder takes the frame and the offset where the IPv4 header starts,
//! validates the version, header length and total length against the frame
//! bounds, and resolves the protocol number through the registry. Options are
//! exposed raw.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::Ipv4Error;
pub use parser::{IpProtocol, Ipv4Header, decode_ipv4};
