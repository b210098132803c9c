//! Ethernet II link-layer decoding.
//!
//! Only the 14-byte Ethernet II header is decoded; 802.1Q tags are reported
//! through their EtherType as `Unknown`.

pub mod error;
pub mod layout;
pub mod parser;

pub use error::EthernetError;
pub use parser::{EtherType, EthernetHeader, MacAddr, decode_ethernet};
