use std::fmt;

use crate::protocols::common::ByteView;

use super::error::TcpError;
use super::layout;
use super::reader::{TcpOption, read_options};

/// The nine TCP control bits (NS through FIN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpFlags(pub u16);

impl TcpFlags {
    pub const FIN: u16 = 0x001;
    pub const SYN: u16 = 0x002;
    pub const RST: u16 = 0x004;
    pub const PSH: u16 = 0x008;
    pub const ACK: u16 = 0x010;
    pub const URG: u16 = 0x020;
    pub const ECE: u16 = 0x040;
    pub const CWR: u16 = 0x080;
    pub const NS: u16 = 0x100;

    const NAMES: [(u16, &'static str); 9] = [
        (Self::NS, "NS"),
        (Self::CWR, "CWR"),
        (Self::ECE, "ECE"),
        (Self::URG, "URG"),
        (Self::ACK, "ACK"),
        (Self::PSH, "PSH"),
        (Self::RST, "RST"),
        (Self::SYN, "SYN"),
        (Self::FIN, "FIN"),
    ];

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join(","))
    }
}

/// Decoded TCP header borrowing from its frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpHeader<'a> {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_number: u32,
    pub acknowledgment_number: u32,
    /// Header length in bytes (data offset × 4), options included.
    pub data_offset: usize,
    pub flags: TcpFlags,
    pub window_size: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
    pub options: Vec<TcpOption>,
    /// Offset of the first payload byte within the frame.
    pub payload_offset: usize,
    pub payload: &'a [u8],
}

/// Decode the TCP header that starts at `offset` within `frame`.
///
/// `frame` should end where the enclosing IP datagram ends so that Ethernet
/// padding is not mistaken for payload.
///
/// # Examples
/// ```
/// use pcapscope_core::decode_tcp;
///
/// let mut segment = [0u8; 20];
/// segment[0..2].copy_from_slice(&443u16.to_be_bytes());
/// segment[12] = 0x50;
/// let header = decode_tcp(&segment, 0)?;
/// assert_eq!(header.source_port, 443);
/// assert_eq!(header.data_offset, 20);
/// # Ok::<(), pcapscope_core::TcpError>(())
/// ```
///
/// # Errors
/// Returns [`TcpError`] when the data offset is outside 20..=60 bytes, the
/// declared header does not fit in the remaining bytes, or an option is
/// malformed.
pub fn decode_tcp(frame: &[u8], offset: usize) -> Result<TcpHeader<'_>, TcpError> {
    let view = ByteView::new(frame);
    let at = |relative: usize| offset.saturating_add(relative);

    let data_offset_byte = view.read_u8(at(layout::DATA_OFFSET_OFFSET))?;
    let data_offset = (data_offset_byte >> 4) as usize * layout::DATA_OFFSET_UNIT;
    if !(layout::MIN_HEADER_LEN..=layout::MAX_HEADER_LEN).contains(&data_offset) {
        return Err(TcpError::InvalidDataOffset { data_offset });
    }
    let available = view.remaining(offset);
    if data_offset > available {
        return Err(TcpError::HeaderOutOfBounds {
            offset,
            data_offset,
            available,
        });
    }

    let options = read_options(view.read_slice(at(layout::MIN_HEADER_LEN)..at(data_offset))?)?;
    let payload_offset = at(data_offset);

    let header = TcpHeader {
        source_port: view.read_u16_be(at(layout::SOURCE_PORT_RANGE.start))?,
        destination_port: view.read_u16_be(at(layout::DESTINATION_PORT_RANGE.start))?,
        sequence_number: view.read_u32_be(at(layout::SEQUENCE_RANGE.start))?,
        acknowledgment_number: view.read_u32_be(at(layout::ACKNOWLEDGMENT_RANGE.start))?,
        data_offset,
        flags: TcpFlags(view.read_u16_be(at(layout::FLAGS_RANGE.start))? & layout::FLAGS_MASK),
        window_size: view.read_u16_be(at(layout::WINDOW_RANGE.start))?,
        checksum: view.read_u16_be(at(layout::CHECKSUM_RANGE.start))?,
        urgent_pointer: view.read_u16_be(at(layout::URGENT_POINTER_RANGE.start))?,
        options,
        payload_offset,
        payload: view.read_slice(payload_offset..view.len())?,
    };

    tracing::trace!(
        source_port = header.source_port,
        destination_port = header.destination_port,
        flags = %header.flags,
        "decoded TCP header"
    );
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::{TcpFlags, decode_tcp};
    use crate::protocols::tcp::error::TcpError;
    use crate::protocols::tcp::reader::TcpOption;
    use etherparse::PacketBuilder;

    const TCP_OFFSET: usize = 14 + 20;

    fn frame_with_payload(payload: &[u8]) -> Vec<u8> {
        let builder = PacketBuilder::ethernet2([1, 1, 1, 1, 1, 1], [2, 2, 2, 2, 2, 2])
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .tcp(51000, 8080, 0xDEAD_BEEF, 4096)
            .syn();
        let mut frame = Vec::<u8>::with_capacity(builder.size(payload.len()));
        builder.write(&mut frame, payload).unwrap();
        frame
    }

    fn bare_header(data_offset_byte: u8, len: usize) -> Vec<u8> {
        let mut segment = vec![0u8; len];
        segment[12] = data_offset_byte;
        segment
    }

    #[test]
    fn decodes_builder_segment() {
        let frame = frame_with_payload(b"hello");
        let header = decode_tcp(&frame, TCP_OFFSET).unwrap();
        assert_eq!(header.source_port, 51000);
        assert_eq!(header.destination_port, 8080);
        assert_eq!(header.sequence_number, 0xDEAD_BEEF);
        assert_eq!(header.window_size, 4096);
        assert_eq!(header.data_offset, 20);
        assert!(header.flags.contains(TcpFlags::SYN));
        assert!(!header.flags.contains(TcpFlags::ACK));
        assert!(header.options.is_empty());
        assert_eq!(header.payload_offset, TCP_OFFSET + 20);
        assert_eq!(header.payload, b"hello");
    }

    #[test]
    fn data_offset_byte_0x50_is_twenty_bytes() {
        let segment = bare_header(0x50, 20);
        assert_eq!(decode_tcp(&segment, 0).unwrap().data_offset, 20);
    }

    #[test]
    fn data_offset_below_minimum_is_rejected() {
        let segment = bare_header(0x40, 20);
        assert_eq!(
            decode_tcp(&segment, 0).unwrap_err(),
            TcpError::InvalidDataOffset { data_offset: 16 }
        );
    }

    #[test]
    fn header_longer_than_segment_is_rejected() {
        let segment = bare_header(0xF0, 40);
        assert_eq!(
            decode_tcp(&segment, 0).unwrap_err(),
            TcpError::HeaderOutOfBounds {
                offset: 0,
                data_offset: 60,
                available: 40
            }
        );
    }

    #[test]
    fn missing_data_offset_byte_is_too_short() {
        let segment = [0u8; 8];
        assert!(matches!(
            decode_tcp(&segment, 0).unwrap_err(),
            TcpError::TooShort { needed: 13, .. }
        ));
    }

    #[test]
    fn options_move_the_payload_offset() {
        let mut segment = bare_header(0x60, 24);
        segment[13] = (TcpFlags::SYN | TcpFlags::ACK) as u8;
        segment[20..24].copy_from_slice(&[0x02, 0x04, 0x05, 0xb4]);
        segment.extend_from_slice(b"GET");

        let header = decode_tcp(&segment, 0).unwrap();
        assert_eq!(header.data_offset, 24);
        assert_eq!(header.options, vec![TcpOption::MaximumSegmentSize(1460)]);
        assert_eq!(header.payload_offset, 24);
        assert_eq!(header.payload, b"GET");
        assert_eq!(header.flags.to_string(), "ACK,SYN");
    }

    #[test]
    fn ns_flag_comes_from_the_data_offset_byte() {
        let segment = bare_header(0x51, 20);
        let header = decode_tcp(&segment, 0).unwrap();
        assert!(header.flags.contains(TcpFlags::NS));
    }
}
