use std::net::Ipv4Addr;
use std::ops::Range;

use crate::protocols::common::{ByteView, OutOfBounds};

use super::layout;

/// Reads IPv4 fields at a fixed header offset within a frame.
pub struct Ipv4Reader<'a> {
    view: ByteView<'a>,
    base: usize,
}

impl<'a> Ipv4Reader<'a> {
    pub fn new(frame: &'a [u8], base: usize) -> Self {
        Self {
            view: ByteView::new(frame),
            base,
        }
    }

    pub fn frame_len(&self) -> usize {
        self.view.len()
    }

    /// Bytes from the start of the header to the end of the frame.
    pub fn available(&self) -> usize {
        self.view.remaining(self.base)
    }

    fn at(&self, relative: usize) -> usize {
        self.base.saturating_add(relative)
    }

    pub fn read_u8(&self, relative: usize) -> Result<u8, OutOfBounds> {
        self.view.read_u8(self.at(relative))
    }

    pub fn read_u16(&self, range: Range<usize>) -> Result<u16, OutOfBounds> {
        self.view.read_u16_be(self.at(range.start))
    }

    pub fn read_addr(&self, range: Range<usize>) -> Result<Ipv4Addr, OutOfBounds> {
        self.view
            .read_array::<4>(self.at(range.start))
            .map(Ipv4Addr::from)
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], OutOfBounds> {
        self.view.read_slice(self.at(range.start)..self.at(range.end))
    }

    /// Version nibble and header length in bytes from the first header byte.
    pub fn version_and_header_len(&self) -> Result<(u8, usize), OutOfBounds> {
        let byte = self.read_u8(layout::VERSION_IHL_OFFSET)?;
        Ok((byte >> 4, (byte & 0x0F) as usize * layout::IHL_UNIT))
    }
}

/// RFC 1071 ones' complement sum over `bytes`; zero means the checksum holds.
pub fn internet_checksum(bytes: &[u8]) -> u16 {
    let mut sum: u32 = bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]) as u32,
            [hi] => u16::from_be_bytes([*hi, 0]) as u32,
            _ => 0,
        })
        .sum();
    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

#[cfg(test)]
mod tests {
    use super::{Ipv4Reader, internet_checksum};

    #[test]
    fn reads_relative_to_base() {
        let frame = [0xFF, 0xFF, 0x45, 0x00, 0x00, 0x28];
        let reader = Ipv4Reader::new(&frame, 2);
        assert_eq!(reader.version_and_header_len().unwrap(), (4, 20));
        assert_eq!(reader.read_u16(2..4).unwrap(), 40);
        assert_eq!(reader.available(), 4);
    }

    #[test]
    fn base_past_end_is_out_of_bounds() {
        let frame = [0x45];
        let reader = Ipv4Reader::new(&frame, 5);
        assert!(reader.version_and_header_len().is_err());
        assert_eq!(reader.available(), 0);
    }

    #[test]
    fn checksum_of_valid_header_is_zero() {
        // 192.168.0.1 -> 192.168.0.199 UDP header, checksum 0xb861.
        let header = [
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0xb8, 0x61, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ];
        assert_eq!(internet_checksum(&header), 0);
    }
}
