use std::fmt;

use serde::{Serialize, Serializer};

use crate::protocols::common::ByteView;

use super::error::EthernetError;
use super::layout;

/// 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(pub [u8; layout::MAC_LEN]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Network-layer protocol announced by the Ethernet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EtherType {
    Ipv4,
    Ipv6,
    Unknown(u16),
}

impl EtherType {
    pub fn from_code(code: u16) -> Self {
        match code {
            layout::ETHER_TYPE_IPV4 => EtherType::Ipv4,
            layout::ETHER_TYPE_IPV6 => EtherType::Ipv6,
            other => EtherType::Unknown(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            EtherType::Ipv4 => layout::ETHER_TYPE_IPV4,
            EtherType::Ipv6 => layout::ETHER_TYPE_IPV6,
            EtherType::Unknown(code) => code,
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::Ipv4 => f.write_str("IPv4"),
            EtherType::Ipv6 => f.write_str("IPv6"),
            EtherType::Unknown(code) => write!(f, "Unknown({code:#06x})"),
        }
    }
}

/// Ethernet II header sliced from a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader<'a> {
    pub destination: MacAddr,
    pub source: MacAddr,
    pub ether_type: EtherType,
    /// Bytes following the header, up to the end of the captured frame.
    pub payload: &'a [u8],
}

/// Decode the Ethernet II header at the start of `frame`.
///
/// The destination address sits at offset 0, the source at 6 and the
/// big-endian EtherType at 12; no preamble is expected in libpcap frames.
///
/// # Examples
/// ```
/// use pcapscope_core::{EtherType, decode_ethernet};
///
/// let mut frame = [0u8; 14];
/// frame[12..14].copy_from_slice(&0x86ddu16.to_be_bytes());
/// let header = decode_ethernet(&frame)?;
/// assert_eq!(header.ether_type, EtherType::Ipv6);
/// assert!(header.payload.is_empty());
/// # Ok::<(), pcapscope_core::EthernetError>(())
/// ```
///
/// # Errors
/// [`EthernetError::Truncated`] when `frame` is shorter than 14 bytes.
pub fn decode_ethernet(frame: &[u8]) -> Result<EthernetHeader<'_>, EthernetError> {
    let view = ByteView::new(frame);
    view.require_len(layout::HEADER_LEN)?;

    let destination = MacAddr(view.read_array(layout::DESTINATION_RANGE.start)?);
    let source = MacAddr(view.read_array(layout::SOURCE_RANGE.start)?);
    let ether_type = EtherType::from_code(view.read_u16_be(layout::ETHER_TYPE_RANGE.start)?);
    let payload = view.read_slice(layout::HEADER_LEN..view.len())?;

    Ok(EthernetHeader {
        destination,
        source,
        ether_type,
        payload,
    })
}
