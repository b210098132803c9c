use std::iter::FusedIterator;

use pcap_parser::Linktype;
use serde::Serialize;

use super::error::{FormatError, TruncatedRecordError};
use super::layout;
use super::reader::{ByteOrder, PcapReader, TimestampPrecision, classify_magic};

/// Decoded libpcap global header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureFileHeader {
    /// Canonical magic (`0xA1B2C3D4` or `0xA1B23C4D`), independent of byte order.
    pub magic_number: u32,
    pub byte_order: ByteOrder,
    pub timestamp_precision: TimestampPrecision,
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT to local correction in seconds.
    pub timezone_offset: i32,
    pub timestamp_accuracy: u32,
    /// Maximum bytes captured per frame.
    pub snapshot_length: u32,
    pub link_type: u32,
}

impl CaptureFileHeader {
    pub fn linktype(&self) -> Linktype {
        Linktype(self.link_type as i32)
    }

    pub fn is_ethernet(&self) -> bool {
        self.linktype() == Linktype::ETHERNET
    }
}

/// One captured frame, borrowing its payload from the capture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRecord<'a> {
    /// Zero-based position of the record in the capture.
    pub index: u64,
    /// Byte offset of the record header within the capture buffer.
    pub offset: usize,
    pub timestamp_seconds: u32,
    /// Microseconds or nanoseconds, see `precision`.
    pub timestamp_fraction: u32,
    pub precision: TimestampPrecision,
    pub captured_length: u32,
    pub original_length: u32,
    pub payload: &'a [u8],
}

impl FrameRecord<'_> {
    /// Capture timestamp as nanoseconds since the Unix epoch.
    pub fn timestamp_nanos(&self) -> i128 {
        let seconds = self.timestamp_seconds as i128 * 1_000_000_000;
        let fraction = self.timestamp_fraction as i128 * self.precision.nanos_per_unit() as i128;
        seconds + fraction
    }

    /// True when fewer bytes were captured than were on the wire.
    pub fn is_partial(&self) -> bool {
        self.captured_length < self.original_length
    }

    /// True when the record respects `captured <= original` and
    /// `captured <= snapshot_length` (a zero snapshot length means unlimited).
    pub fn lengths_consistent(&self, snapshot_length: u32) -> bool {
        let within_original = self.captured_length <= self.original_length;
        let within_snapshot = snapshot_length == 0 || self.captured_length <= snapshot_length;
        within_original && within_snapshot
    }
}

/// Parse the 24-byte global header.
///
/// The byte order of every later field, in this header and in every frame
/// record, is fixed by which magic constant matched.
///
/// # Examples
/// ```
/// use pcapscope_core::parse_header;
///
/// let bytes = [
///     0xd4, 0xc3, 0xb2, 0xa1, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
///     0x00, 0xff, 0xff, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
/// ];
/// let header = parse_header(&bytes)?;
/// assert_eq!(header.magic_number, 0xa1b2c3d4);
/// assert_eq!((header.version_major, header.version_minor), (2, 4));
/// assert_eq!(header.snapshot_length, 0xffff);
/// assert_eq!(header.link_type, 1);
/// # Ok::<(), pcapscope_core::FormatError>(())
/// ```
///
/// # Errors
/// [`FormatError::HeaderTooShort`] when fewer than 24 bytes are present,
/// [`FormatError::UnknownMagic`] when the magic is not a libpcap constant.
pub fn parse_header(bytes: &[u8]) -> Result<CaptureFileHeader, FormatError> {
    if bytes.len() < layout::GLOBAL_HEADER_LEN {
        return Err(FormatError::HeaderTooShort {
            needed: layout::GLOBAL_HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    let (byte_order, timestamp_precision) =
        classify_magic(magic).ok_or(FormatError::UnknownMagic {
            magic: u32::from_be_bytes(magic),
        })?;

    let reader = PcapReader::new(&bytes[..layout::GLOBAL_HEADER_LEN], byte_order);
    let short = |_| FormatError::HeaderTooShort {
        needed: layout::GLOBAL_HEADER_LEN,
        actual: bytes.len(),
    };

    let header = CaptureFileHeader {
        magic_number: timestamp_precision.canonical_magic(),
        byte_order,
        timestamp_precision,
        version_major: reader
            .read_u16(layout::VERSION_MAJOR_RANGE.start)
            .map_err(short)?,
        version_minor: reader
            .read_u16(layout::VERSION_MINOR_RANGE.start)
            .map_err(short)?,
        timezone_offset: reader
            .read_i32(layout::TIMEZONE_OFFSET_RANGE.start)
            .map_err(short)?,
        timestamp_accuracy: reader
            .read_u32(layout::TIMESTAMP_ACCURACY_RANGE.start)
            .map_err(short)?,
        snapshot_length: reader
            .read_u32(layout::SNAPSHOT_LENGTH_RANGE.start)
            .map_err(short)?,
        link_type: reader
            .read_u32(layout::LINK_TYPE_RANGE.start)
            .map_err(short)?,
    };

    tracing::debug!(
        ?byte_order,
        ?timestamp_precision,
        snapshot_length = header.snapshot_length,
        link_type = header.link_type,
        "parsed capture header"
    );
    Ok(header)
}

/// Lazily iterate the frame records that follow the global header.
///
/// Each call starts again from the first record, so the sequence can be
/// restarted by calling `frames` again with the same buffer.
pub fn frames<'a>(bytes: &'a [u8], header: &CaptureFileHeader) -> Frames<'a> {
    Frames {
        reader: PcapReader::new(bytes, header.byte_order),
        precision: header.timestamp_precision,
        offset: layout::GLOBAL_HEADER_LEN,
        index: 0,
        done: false,
    }
}

/// Iterator returned by [`frames`].
pub struct Frames<'a> {
    reader: PcapReader<'a>,
    precision: TimestampPrecision,
    offset: usize,
    index: u64,
    done: bool,
}

impl<'a> Frames<'a> {
    fn truncated(&self, needed: usize) -> TruncatedRecordError {
        TruncatedRecordError {
            index: self.index,
            offset: self.offset,
            needed,
            available: self.reader.remaining(self.offset),
        }
    }

    fn read_record(&self) -> Result<(FrameRecord<'a>, usize), TruncatedRecordError> {
        let base = self.offset;
        let header_missing = |_| self.truncated(layout::RECORD_HEADER_LEN);

        let timestamp_seconds = self
            .reader
            .read_u32(base + layout::TS_SECONDS_RANGE.start)
            .map_err(header_missing)?;
        let timestamp_fraction = self
            .reader
            .read_u32(base + layout::TS_FRACTION_RANGE.start)
            .map_err(header_missing)?;
        let captured_length = self
            .reader
            .read_u32(base + layout::CAPTURED_LENGTH_RANGE.start)
            .map_err(header_missing)?;
        let original_length = self
            .reader
            .read_u32(base + layout::ORIGINAL_LENGTH_RANGE.start)
            .map_err(header_missing)?;

        let record_len = layout::RECORD_HEADER_LEN.saturating_add(captured_length as usize);
        let payload_start = base + layout::RECORD_HEADER_LEN;
        let payload_end = base.saturating_add(record_len);
        let payload = self
            .reader
            .read_slice(payload_start..payload_end)
            .map_err(|_| self.truncated(record_len))?;

        let record = FrameRecord {
            index: self.index,
            offset: base,
            timestamp_seconds,
            timestamp_fraction,
            precision: self.precision,
            captured_length,
            original_length,
            payload,
        };
        Ok((record, payload_end))
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<FrameRecord<'a>, TruncatedRecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.reader.remaining(self.offset) == 0 {
            self.done = true;
            return None;
        }

        match self.read_record() {
            Ok((record, next_offset)) => {
                self.offset = next_offset;
                self.index += 1;
                Some(Ok(record))
            }
            Err(err) => {
                self.done = true;
                tracing::warn!(
                    index = err.index,
                    offset = err.offset,
                    needed = err.needed,
                    available = err.available,
                    "truncated frame record"
                );
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Frames<'_> {}

#[cfg(test)]
mod tests {
    use super::{frames, parse_header};
    use crate::source::pcap::error::FormatError;
    use crate::source::pcap::layout;
    use crate::source::pcap::reader::{ByteOrder, TimestampPrecision};

    fn global_header(magic: [u8; 4], little: bool) -> Vec<u8> {
        let mut bytes = magic.to_vec();
        let put16 = |v: u16| if little { v.to_le_bytes() } else { v.to_be_bytes() };
        let put32 = |v: u32| if little { v.to_le_bytes() } else { v.to_be_bytes() };
        bytes.extend_from_slice(&put16(2));
        bytes.extend_from_slice(&put16(4));
        bytes.extend_from_slice(&put32(0));
        bytes.extend_from_slice(&put32(0));
        bytes.extend_from_slice(&put32(65535));
        bytes.extend_from_slice(&put32(1));
        bytes
    }

    fn record(little: bool, ts: (u32, u32), captured: &[u8], original: u32) -> Vec<u8> {
        let put32 = |v: u32| if little { v.to_le_bytes() } else { v.to_be_bytes() };
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&put32(ts.0));
        bytes.extend_from_slice(&put32(ts.1));
        bytes.extend_from_slice(&put32(captured.len() as u32));
        bytes.extend_from_slice(&put32(original));
        bytes.extend_from_slice(captured);
        bytes
    }

    #[test]
    fn parses_swapped_microsecond_header() {
        let bytes = [
            0xD4, 0xC3, 0xB2, 0xA1, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        ];
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.magic_number, 0xA1B2_C3D4);
        assert_eq!(header.byte_order, ByteOrder::Little);
        assert_eq!(header.timestamp_precision, TimestampPrecision::Micro);
        assert_eq!(header.version_major, 2);
        assert_eq!(header.version_minor, 4);
        assert_eq!(header.snapshot_length, 0xFFFF);
        assert_eq!(header.link_type, 1);
        assert!(header.is_ethernet());
    }

    #[test]
    fn parses_big_endian_nanosecond_header() {
        let bytes = global_header([0xA1, 0xB2, 0x3C, 0x4D], false);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.magic_number, layout::MAGIC_NANOS);
        assert_eq!(header.byte_order, ByteOrder::Big);
        assert_eq!(header.timestamp_precision, TimestampPrecision::Nano);
        assert_eq!(header.version_major, 2);
        assert_eq!(header.snapshot_length, 65535);
    }

    #[test]
    fn short_header_is_format_error() {
        let err = parse_header(&[0xD4, 0xC3, 0xB2, 0xA1]).unwrap_err();
        assert_eq!(
            err,
            FormatError::HeaderTooShort {
                needed: 24,
                actual: 4
            }
        );
    }

    #[test]
    fn unknown_magic_is_format_error() {
        let mut bytes = global_header([0xA1, 0xB2, 0xC3, 0xD4], false);
        bytes[0] = 0x0A;
        let err = parse_header(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::UnknownMagic { magic: 0x0AB2_C3D4 }));
    }

    #[test]
    fn frames_follow_header_byte_order() {
        let mut bytes = global_header([0xA1, 0xB2, 0xC3, 0xD4], false);
        bytes.extend(record(false, (10, 500), &[1, 2, 3], 60));
        let header = parse_header(&bytes).unwrap();

        let records: Vec<_> = frames(&bytes, &header).collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        let frame = records[0];
        assert_eq!(frame.timestamp_seconds, 10);
        assert_eq!(frame.timestamp_fraction, 500);
        assert_eq!(frame.captured_length, 3);
        assert_eq!(frame.original_length, 60);
        assert_eq!(frame.payload, &[1, 2, 3]);
        assert_eq!(frame.offset, layout::GLOBAL_HEADER_LEN);
        assert_eq!(frame.timestamp_nanos(), 10_000_500_000);
        assert!(frame.is_partial());
    }

    #[test]
    fn zero_length_record_has_empty_payload() {
        let mut bytes = global_header([0xD4, 0xC3, 0xB2, 0xA1], true);
        bytes.extend(record(true, (1, 0), &[], 0));
        bytes.extend(record(true, (2, 0), &[9], 1));
        let header = parse_header(&bytes).unwrap();

        let mut iter = frames(&bytes, &header);
        let first = iter.next().unwrap().unwrap();
        assert!(first.payload.is_empty());
        assert_eq!(first.captured_length, 0);
        let second = iter.next().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.payload, &[9]);
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn empty_capture_yields_no_frames() {
        let bytes = global_header([0xD4, 0xC3, 0xB2, 0xA1], true);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(frames(&bytes, &header).count(), 0);
    }

    #[test]
    fn truncated_payload_ends_iteration_after_error() {
        let mut bytes = global_header([0xD4, 0xC3, 0xB2, 0xA1], true);
        bytes.extend(record(true, (1, 0), &[1, 2], 2));
        let mut broken = record(true, (2, 0), &[1, 2, 3, 4], 4);
        broken.truncate(broken.len() - 2);
        bytes.extend(broken);
        let header = parse_header(&bytes).unwrap();

        let mut iter = frames(&bytes, &header);
        assert!(iter.next().unwrap().is_ok());
        let err = iter.next().unwrap().unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.offset, 24 + 16 + 2);
        assert_eq!(err.needed, 20);
        assert_eq!(err.available, 18);
        assert!(iter.next().is_none());
    }

    #[test]
    fn partial_record_header_is_truncation() {
        let mut bytes = global_header([0xD4, 0xC3, 0xB2, 0xA1], true);
        bytes.extend_from_slice(&[0u8; 7]);
        let header = parse_header(&bytes).unwrap();

        let results: Vec<_> = frames(&bytes, &header).collect();
        assert_eq!(results.len(), 1);
        let err = results[0].clone().unwrap_err();
        assert_eq!(err.needed, layout::RECORD_HEADER_LEN);
        assert_eq!(err.available, 7);
    }

    #[test]
    fn frames_restart_from_the_beginning() {
        let mut bytes = global_header([0xD4, 0xC3, 0xB2, 0xA1], true);
        bytes.extend(record(true, (1, 0), &[1], 1));
        bytes.extend(record(true, (2, 0), &[2], 1));
        let header = parse_header(&bytes).unwrap();

        let first_pass: Vec<_> = frames(&bytes, &header).take(1).collect();
        let second_pass: Vec<_> = frames(&bytes, &header).collect();
        assert_eq!(first_pass.len(), 1);
        assert_eq!(second_pass.len(), 2);
        assert_eq!(first_pass[0], second_pass[0]);
    }

    #[test]
    fn nanosecond_fraction_is_not_scaled() {
        let mut bytes = global_header([0x4D, 0x3C, 0xB2, 0xA1], true);
        bytes.extend(record(true, (1, 5), &[], 0));
        let header = parse_header(&bytes).unwrap();
        let frame = frames(&bytes, &header).next().unwrap().unwrap();
        assert_eq!(frame.timestamp_nanos(), 1_000_000_005);
    }

    #[test]
    fn length_consistency_checks_snapshot_and_original() {
        let mut bytes = global_header([0xD4, 0xC3, 0xB2, 0xA1], true);
        bytes.extend(record(true, (1, 0), &[0; 4], 2));
        let header = parse_header(&bytes).unwrap();
        let frame = frames(&bytes, &header).next().unwrap().unwrap();
        assert!(!frame.lengths_consistent(header.snapshot_length));
        assert!(!frame.lengths_consistent(0));
    }
}
