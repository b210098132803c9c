//! IP protocol number lookup.
//!
//! Unknown codes are expected in real traffic, so resolution never fails: it
//! yields [`ProtocolName::Unknown`] carrying the raw code.

use std::fmt;

/// Result of resolving an IP protocol number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolName {
    Known(&'static str),
    Unknown(u8),
}

impl fmt::Display for ProtocolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolName::Known(name) => f.write_str(name),
            ProtocolName::Unknown(code) => write!(f, "Unknown({code})"),
        }
    }
}

pub const IP_PROTO_ICMP: u8 = 1;
pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;

// IANA "Assigned Internet Protocol Numbers", keyword column.
const NAMES: &[(u8, &str)] = &[
    (0, "HOPOPT"),
    (IP_PROTO_ICMP, "ICMP"),
    (2, "IGMP"),
    (3, "GGP"),
    (4, "IPv4"),
    (5, "ST"),
    (IP_PROTO_TCP, "TCP"),
    (8, "EGP"),
    (9, "IGP"),
    (IP_PROTO_UDP, "UDP"),
    (27, "RDP"),
    (33, "DCCP"),
    (41, "IPv6"),
    (43, "IPv6-Route"),
    (44, "IPv6-Frag"),
    (46, "RSVP"),
    (47, "GRE"),
    (50, "ESP"),
    (51, "AH"),
    (58, "IPv6-ICMP"),
    (59, "IPv6-NoNxt"),
    (60, "IPv6-Opts"),
    (88, "EIGRP"),
    (89, "OSPFIGP"),
    (94, "IPIP"),
    (97, "ETHERIP"),
    (103, "PIM"),
    (108, "IPComp"),
    (112, "VRRP"),
    (115, "L2TP"),
    (132, "SCTP"),
    (136, "UDPLite"),
    (137, "MPLS-in-IP"),
];

/// Resolve an IP protocol number to its IANA keyword.
///
/// # Examples
/// ```
/// use pcapscope_core::{ProtocolName, protocol_name};
///
/// assert_eq!(protocol_name(6), ProtocolName::Known("TCP"));
/// assert_eq!(protocol_name(253).to_string(), "Unknown(253)");
/// ```
pub fn protocol_name(code: u8) -> ProtocolName {
    NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| ProtocolName::Known(*name))
        .unwrap_or(ProtocolName::Unknown(code))
}
