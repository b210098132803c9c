//! Field offsets relative to the start of the TCP header.

use std::ops::Range;

pub const SOURCE_PORT_RANGE: Range<usize> = 0..2;
pub const DESTINATION_PORT_RANGE: Range<usize> = SOURCE_PORT_RANGE.end..SOURCE_PORT_RANGE.end + 2;
pub const SEQUENCE_RANGE: Range<usize> =
    DESTINATION_PORT_RANGE.end..DESTINATION_PORT_RANGE.end + 4;
pub const ACKNOWLEDGMENT_RANGE: Range<usize> = SEQUENCE_RANGE.end..SEQUENCE_RANGE.end + 4;
/// Data offset nibble, reserved bits and the NS flag share this byte.
pub const DATA_OFFSET_OFFSET: usize = ACKNOWLEDGMENT_RANGE.end;
pub const FLAGS_RANGE: Range<usize> = DATA_OFFSET_OFFSET..DATA_OFFSET_OFFSET + 2;
pub const WINDOW_RANGE: Range<usize> = FLAGS_RANGE.end..FLAGS_RANGE.end + 2;
pub const CHECKSUM_RANGE: Range<usize> = WINDOW_RANGE.end..WINDOW_RANGE.end + 2;
pub const URGENT_POINTER_RANGE: Range<usize> = CHECKSUM_RANGE.end..CHECKSUM_RANGE.end + 2;

pub const MIN_HEADER_LEN: usize = URGENT_POINTER_RANGE.end;
pub const MAX_HEADER_LEN: usize = 60;
pub const DATA_OFFSET_UNIT: usize = 4;
pub const FLAGS_MASK: u16 = 0x01FF;

/// TCP option kinds.
pub mod option_kind {
    pub const END_OF_LIST: u8 = 0;
    pub const NOP: u8 = 1;
    pub const MSS: u8 = 2;
    pub const WINDOW_SCALE: u8 = 3;
    pub const SACK_PERMITTED: u8 = 4;
    pub const SACK: u8 = 5;
    pub const TIMESTAMP: u8 = 8;
}

pub const MSS_OPTION_LEN: usize = 4;
pub const WINDOW_SCALE_OPTION_LEN: usize = 3;
pub const SACK_PERMITTED_OPTION_LEN: usize = 2;
pub const SACK_BLOCK_LEN: usize = 8;
pub const TIMESTAMP_OPTION_LEN: usize = 10;
