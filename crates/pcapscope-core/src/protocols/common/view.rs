use std::ops::Range;

use thiserror::Error;

/// A read past the end of a [`ByteView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("need {needed} bytes, got {actual}")]
pub(crate) struct OutOfBounds {
    pub needed: usize,
    pub actual: usize,
}

/// Immutable, bounds-checked window over a byte buffer.
///
/// Every read takes an explicit offset relative to the start of the view;
/// there is no cursor. Reads never panic: anything past the end returns
/// [`OutOfBounds`] with the length that would have been required.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteView<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    pub(crate) fn require_len(&self, needed: usize) -> Result<(), OutOfBounds> {
        if self.bytes.len() < needed {
            return Err(OutOfBounds {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    /// Bytes remaining after `offset` (zero when `offset` is past the end).
    pub(crate) fn remaining(&self, offset: usize) -> usize {
        self.bytes.len().saturating_sub(offset)
    }

    pub(crate) fn read_u8(&self, offset: usize) -> Result<u8, OutOfBounds> {
        self.bytes.get(offset).copied().ok_or(OutOfBounds {
            needed: offset.saturating_add(1),
            actual: self.bytes.len(),
        })
    }

    pub(crate) fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], OutOfBounds> {
        self.bytes.get(range.clone()).ok_or(OutOfBounds {
            needed: range.end,
            actual: self.bytes.len(),
        })
    }

    pub(crate) fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], OutOfBounds> {
        let end = offset.checked_add(N).ok_or(OutOfBounds {
            needed: usize::MAX,
            actual: self.bytes.len(),
        })?;
        let slice = self.read_slice(offset..end)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub(crate) fn read_u16_be(&self, offset: usize) -> Result<u16, OutOfBounds> {
        self.read_array::<2>(offset).map(u16::from_be_bytes)
    }

    pub(crate) fn read_u16_le(&self, offset: usize) -> Result<u16, OutOfBounds> {
        self.read_array::<2>(offset).map(u16::from_le_bytes)
    }

    pub(crate) fn read_u32_be(&self, offset: usize) -> Result<u32, OutOfBounds> {
        self.read_array::<4>(offset).map(u32::from_be_bytes)
    }

    pub(crate) fn read_u32_le(&self, offset: usize) -> Result<u32, OutOfBounds> {
        self.read_array::<4>(offset).map(u32::from_le_bytes)
    }

    /// Narrow the view to `range`, keeping the same bounds guarantees.
    pub(crate) fn subview(&self, range: Range<usize>) -> Result<ByteView<'a>, OutOfBounds> {
        self.read_slice(range).map(ByteView::new)
    }
}
