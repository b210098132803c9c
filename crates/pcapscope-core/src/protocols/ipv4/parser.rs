use std::net::Ipv4Addr;
use std::ops::Range;

use crate::protocols::registry::{ProtocolName, protocol_name};

use super::error::Ipv4Error;
use super::layout;
use super::reader::{Ipv4Reader, internet_checksum};

/// Transport protocol carried by an IPv4 datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpProtocol {
    pub code: u8,
    pub name: ProtocolName,
}

/// Decoded IPv4 header borrowing from its frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header<'a> {
    pub version: u8,
    /// Header length in bytes (IHL × 4).
    pub header_length: usize,
    pub type_of_service: u8,
    pub total_length: u16,
    pub identification: u16,
    /// Reserved, DF and MF bits.
    pub flags: u8,
    /// Fragment offset in 8-byte units.
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: IpProtocol,
    pub header_checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub options: &'a [u8],
    /// The whole header, checksum included.
    pub header: &'a [u8],
    /// Datagram payload bounds within the frame, as declared by `total_length`.
    pub payload_range: Range<usize>,
}

impl Ipv4Header<'_> {
    pub fn dont_fragment(&self) -> bool {
        self.flags & layout::FLAG_DONT_FRAGMENT != 0
    }

    pub fn more_fragments(&self) -> bool {
        self.flags & layout::FLAG_MORE_FRAGMENTS != 0
    }

    /// True when the header checksum verifies.
    pub fn checksum_valid(&self) -> bool {
        internet_checksum(self.header) == 0
    }
}

/// Decode the IPv4 header that starts at `offset` within `frame`.
///
/// # Examples
/// ```
/// use pcapscope_core::{ProtocolName, decode_ipv4};
///
/// let mut frame = vec![0u8; 14 + 20];
/// frame[14] = 0x45;
/// frame[16..18].copy_from_slice(&20u16.to_be_bytes());
/// frame[23] = 17;
/// frame[26..30].copy_from_slice(&[10, 0, 0, 1]);
/// let header = decode_ipv4(&frame, 14)?;
/// assert_eq!(header.header_length, 20);
/// assert_eq!(header.protocol.name, ProtocolName::Known("UDP"));
/// assert_eq!(header.source.to_string(), "10.0.0.1");
/// # Ok::<(), pcapscope_core::Ipv4Error>(())
/// ```
///
/// # Errors
/// Returns [`Ipv4Error`] when the version is not 4, the header length is
/// below 20 bytes or runs past the frame, or `total_length` is smaller than
/// the header or larger than the bytes remaining in the frame.
pub fn decode_ipv4(frame: &[u8], offset: usize) -> Result<Ipv4Header<'_>, Ipv4Error> {
    let reader = Ipv4Reader::new(frame, offset);
    let (version, header_length) = reader.version_and_header_len()?;

    if version != layout::VERSION {
        return Err(Ipv4Error::InvalidVersion { version });
    }
    if header_length < layout::MIN_HEADER_LEN {
        return Err(Ipv4Error::InvalidHeaderLength { header_length });
    }
    if header_length > reader.available() {
        return Err(Ipv4Error::HeaderOutOfBounds {
            offset,
            header_length,
            frame_len: reader.frame_len(),
        });
    }

    let total_length = reader.read_u16(layout::TOTAL_LENGTH_RANGE)?;
    let available = reader.available();
    if (total_length as usize) < header_length || total_length as usize > available {
        return Err(Ipv4Error::InvalidTotalLength {
            total_length,
            header_length,
            available,
        });
    }

    let flags_fragment = reader.read_u16(layout::FLAGS_FRAGMENT_RANGE)?;
    let code = reader.read_u8(layout::PROTOCOL_OFFSET)?;

    let header = Ipv4Header {
        version,
        header_length,
        type_of_service: reader.read_u8(layout::TOS_OFFSET)?,
        total_length,
        identification: reader.read_u16(layout::IDENTIFICATION_RANGE)?,
        flags: (flags_fragment >> 13) as u8,
        fragment_offset: flags_fragment & layout::FRAGMENT_OFFSET_MASK,
        ttl: reader.read_u8(layout::TTL_OFFSET)?,
        protocol: IpProtocol {
            code,
            name: protocol_name(code),
        },
        header_checksum: reader.read_u16(layout::CHECKSUM_RANGE)?,
        source: reader.read_addr(layout::SOURCE_RANGE)?,
        destination: reader.read_addr(layout::DESTINATION_RANGE)?,
        options: reader.read_slice(layout::MIN_HEADER_LEN..header_length)?,
        header: reader.read_slice(0..header_length)?,
        payload_range: offset + header_length..offset + total_length as usize,
    };

    tracing::trace!(
        source = %header.source,
        destination = %header.destination,
        protocol = %header.protocol.name,
        "decoded IPv4 header"
    );
    Ok(header)
}
