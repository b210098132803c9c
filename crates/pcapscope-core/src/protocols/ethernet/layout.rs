use std::ops::Range;

pub const MAC_LEN: usize = 6;
pub const DESTINATION_RANGE: Range<usize> = 0..MAC_LEN;
pub const SOURCE_RANGE: Range<usize> = DESTINATION_RANGE.end..DESTINATION_RANGE.end + MAC_LEN;
pub const ETHER_TYPE_RANGE: Range<usize> = SOURCE_RANGE.end..SOURCE_RANGE.end + 2;
pub const HEADER_LEN: usize = ETHER_TYPE_RANGE.end;

pub const ETHER_TYPE_IPV4: u16 = 0x0800;
pub const ETHER_TYPE_IPV6: u16 = 0x86DD;
