use serde::{Deserialize, Serialize};

use crate::protocols::common::{ByteView, OutOfBounds};

use super::layout;

/// Byte order of every multi-byte field after the magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    Big,
    Little,
}

/// Resolution of the `timestamp_fraction` field of each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPrecision {
    Micro,
    Nano,
}

impl TimestampPrecision {
    /// Nanoseconds represented by one unit of the fraction field.
    pub fn nanos_per_unit(self) -> u32 {
        match self {
            TimestampPrecision::Micro => 1_000,
            TimestampPrecision::Nano => 1,
        }
    }

    /// Canonical (host-order) magic number for this precision.
    pub fn canonical_magic(self) -> u32 {
        match self {
            TimestampPrecision::Micro => layout::MAGIC_MICROS,
            TimestampPrecision::Nano => layout::MAGIC_NANOS,
        }
    }
}

/// Classify the first four bytes of a capture.
///
/// The magic is read big-endian: a match on the canonical constant means the
/// file was written big-endian, a match on the swapped constant means
/// little-endian.
///
/// # Examples
/// ```
/// use pcapscope_core::{ByteOrder, classify_magic};
///
/// let (order, _) = classify_magic([0xd4, 0xc3, 0xb2, 0xa1]).unwrap();
/// assert_eq!(order, ByteOrder::Little);
/// ```
pub fn classify_magic(bytes: [u8; 4]) -> Option<(ByteOrder, TimestampPrecision)> {
    match u32::from_be_bytes(bytes) {
        layout::MAGIC_MICROS => Some((ByteOrder::Big, TimestampPrecision::Micro)),
        layout::MAGIC_MICROS_SWAPPED => Some((ByteOrder::Little, TimestampPrecision::Micro)),
        layout::MAGIC_NANOS => Some((ByteOrder::Big, TimestampPrecision::Nano)),
        layout::MAGIC_NANOS_SWAPPED => Some((ByteOrder::Little, TimestampPrecision::Nano)),
        _ => None,
    }
}

/// Byte-order aware reads over a capture buffer.
pub(crate) struct PcapReader<'a> {
    view: ByteView<'a>,
    order: ByteOrder,
}

impl<'a> PcapReader<'a> {
    pub(crate) fn new(bytes: &'a [u8], order: ByteOrder) -> Self {
        Self {
            view: ByteView::new(bytes),
            order,
        }
    }

    pub(crate) fn remaining(&self, offset: usize) -> usize {
        self.view.remaining(offset)
    }

    pub(crate) fn read_u16(&self, offset: usize) -> Result<u16, OutOfBounds> {
        match self.order {
            ByteOrder::Big => self.view.read_u16_be(offset),
            ByteOrder::Little => self.view.read_u16_le(offset),
        }
    }

    pub(crate) fn read_u32(&self, offset: usize) -> Result<u32, OutOfBounds> {
        match self.order {
            ByteOrder::Big => self.view.read_u32_be(offset),
            ByteOrder::Little => self.view.read_u32_le(offset),
        }
    }

    pub(crate) fn read_i32(&self, offset: usize) -> Result<i32, OutOfBounds> {
        self.read_u32(offset).map(|value| value as i32)
    }

    pub(crate) fn read_slice(
        &self,
        range: std::ops::Range<usize>,
    ) -> Result<&'a [u8], OutOfBounds> {
        self.view.read_slice(range)
    }
}
