use std::ops::Range;

/// Microsecond-resolution magic as written by the capturing host.
pub const MAGIC_MICROS: u32 = 0xA1B2_C3D4;
/// Microsecond-resolution magic seen from a host of the opposite byte order.
pub const MAGIC_MICROS_SWAPPED: u32 = 0xD4C3_B2A1;
/// Nanosecond-resolution magic as written by the capturing host.
pub const MAGIC_NANOS: u32 = 0xA1B2_3C4D;
/// Nanosecond-resolution magic seen from a host of the opposite byte order.
pub const MAGIC_NANOS_SWAPPED: u32 = 0x4D3C_B2A1;

// Global header: each field starts where the previous one ends.
pub const MAGIC_RANGE: Range<usize> = 0..4;
pub const VERSION_MAJOR_RANGE: Range<usize> = MAGIC_RANGE.end..MAGIC_RANGE.end + 2;
pub const VERSION_MINOR_RANGE: Range<usize> = VERSION_MAJOR_RANGE.end..VERSION_MAJOR_RANGE.end + 2;
pub const TIMEZONE_OFFSET_RANGE: Range<usize> =
    VERSION_MINOR_RANGE.end..VERSION_MINOR_RANGE.end + 4;
pub const TIMESTAMP_ACCURACY_RANGE: Range<usize> =
    TIMEZONE_OFFSET_RANGE.end..TIMEZONE_OFFSET_RANGE.end + 4;
pub const SNAPSHOT_LENGTH_RANGE: Range<usize> =
    TIMESTAMP_ACCURACY_RANGE.end..TIMESTAMP_ACCURACY_RANGE.end + 4;
pub const LINK_TYPE_RANGE: Range<usize> =
    SNAPSHOT_LENGTH_RANGE.end..SNAPSHOT_LENGTH_RANGE.end + 4;
pub const GLOBAL_HEADER_LEN: usize = LINK_TYPE_RANGE.end;

// Record header, relative to the start of each record.
pub const TS_SECONDS_RANGE: Range<usize> = 0..4;
pub const TS_FRACTION_RANGE: Range<usize> = TS_SECONDS_RANGE.end..TS_SECONDS_RANGE.end + 4;
pub const CAPTURED_LENGTH_RANGE: Range<usize> = TS_FRACTION_RANGE.end..TS_FRACTION_RANGE.end + 4;
pub const ORIGINAL_LENGTH_RANGE: Range<usize> =
    CAPTURED_LENGTH_RANGE.end..CAPTURED_LENGTH_RANGE.end + 4;
pub const RECORD_HEADER_LEN: usize = ORIGINAL_LENGTH_RANGE.end;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_lengths_match_libpcap() {
        assert_eq!(GLOBAL_HEADER_LEN, 24);
        assert_eq!(SNAPSHOT_LENGTH_RANGE, 16..20);
        assert_eq!(RECORD_HEADER_LEN, 16);
        assert_eq!(CAPTURED_LENGTH_RANGE, 8..12);
    }
}
