//! Field offsets relative to the start of the IPv4 header.

use std::ops::Range;

pub const VERSION_IHL_OFFSET: usize = 0;
pub const TOS_OFFSET: usize = VERSION_IHL_OFFSET + 1;
pub const TOTAL_LENGTH_RANGE: Range<usize> = TOS_OFFSET + 1..TOS_OFFSET + 3;
pub const IDENTIFICATION_RANGE: Range<usize> =
    TOTAL_LENGTH_RANGE.end..TOTAL_LENGTH_RANGE.end + 2;
pub const FLAGS_FRAGMENT_RANGE: Range<usize> =
    IDENTIFICATION_RANGE.end..IDENTIFICATION_RANGE.end + 2;
pub const TTL_OFFSET: usize = FLAGS_FRAGMENT_RANGE.end;
pub const PROTOCOL_OFFSET: usize = TTL_OFFSET + 1;
pub const CHECKSUM_RANGE: Range<usize> = PROTOCOL_OFFSET + 1..PROTOCOL_OFFSET + 3;
pub const SOURCE_RANGE: Range<usize> = CHECKSUM_RANGE.end..CHECKSUM_RANGE.end + 4;
pub const DESTINATION_RANGE: Range<usize> = SOURCE_RANGE.end..SOURCE_RANGE.end + 4;

pub const MIN_HEADER_LEN: usize = DESTINATION_RANGE.end;
/// The IHL and total-length fields count 32-bit words and bytes respectively.
pub const IHL_UNIT: usize = 4;

pub const VERSION: u8 = 4;
pub const FLAG_DONT_FRAGMENT: u8 = 0b010;
pub const FLAG_MORE_FRAGMENTS: u8 = 0b001;
pub const FRAGMENT_OFFSET_MASK: u16 = 0x1FFF;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_match_rfc791() {
        assert_eq!(TOTAL_LENGTH_RANGE, 2..4);
        assert_eq!(PROTOCOL_OFFSET, 9);
        assert_eq!(SOURCE_RANGE, 12..16);
        assert_eq!(DESTINATION_RANGE, 16..20);
        assert_eq!(MIN_HEADER_LEN, 20);
    }
}
