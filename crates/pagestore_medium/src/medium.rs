//! Non-volatile medium trait definition.

use crate::error::{MediumError, MediumResult};

/// Content of a cell that has never been written, or has been erased.
pub const ERASED_BYTE: u8 = 0xFF;

/// A fixed-size, byte-addressable non-volatile memory.
///
/// Media are **opaque byte ranges**. Offsets are absolute addresses on the
/// medium, never relative to a slot or partition. The PageStore engine owns
/// all interpretation of the bytes.
///
/// # Invariants
///
/// - `read` and `write` fail with [`MediumError::OutOfBounds`] when the range
///   extends past `size()`, without touching the medium
/// - `read` returns exactly the bytes most recently written at that range
/// - once `write` returns `Ok`, the bytes are durable
/// - a `write` that fails may have written any prefix of the data
///
/// # Implementors
///
/// - [`super::InMemoryMedium`] - For testing
/// - [`super::FileMedium`] - For EEPROM image files
pub trait NonVolatileMedium {
    /// Returns the total addressable size in bytes.
    fn size(&self) -> u64;

    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or the medium fails.
    fn read(&self, offset: u64, len: usize) -> MediumResult<Vec<u8>>;

    /// Writes `data` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or the medium fails.
    fn write(&mut self, offset: u64, data: &[u8]) -> MediumResult<()>;
}

impl<M: NonVolatileMedium + ?Sized> NonVolatileMedium for &mut M {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read(&self, offset: u64, len: usize) -> MediumResult<Vec<u8>> {
        (**self).read(offset, len)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> MediumResult<()> {
        (**self).write(offset, data)
    }
}

impl<M: NonVolatileMedium + ?Sized> NonVolatileMedium for Box<M> {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read(&self, offset: u64, len: usize) -> MediumResult<Vec<u8>> {
        (**self).read(offset, len)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> MediumResult<()> {
        (**self).write(offset, data)
    }
}

/// Checks that `[offset, offset + len)` lies inside a medium of `size` bytes.
///
/// # Errors
///
/// Returns [`MediumError::OutOfBounds`] if it does not.
pub fn check_bounds(offset: u64, len: usize, size: u64) -> MediumResult<()> {
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= size => Ok(()),
        _ => Err(MediumError::OutOfBounds { offset, len, size }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_inside() {
        assert!(check_bounds(0, 16, 16).is_ok());
        assert!(check_bounds(16, 0, 16).is_ok());
        assert!(check_bounds(4, 8, 16).is_ok());
    }

    #[test]
    fn bounds_outside() {
        assert!(matches!(
            check_bounds(10, 8, 16),
            Err(MediumError::OutOfBounds {
                offset: 10,
                len: 8,
                size: 16
            })
        ));
        assert!(check_bounds(17, 0, 16).is_err());
        assert!(check_bounds(u64::MAX, 2, 16).is_err());
    }
}
