//! In-memory medium for testing and simulation.

use crate::error::MediumResult;
use crate::medium::{check_bounds, NonVolatileMedium, ERASED_BYTE};
use parking_lot::RwLock;
use std::sync::Arc;

/// An in-memory medium.
///
/// This medium keeps a fixed-size byte array in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Simulating an EEPROM across resets
///
/// # Shared Handles
///
/// Clones share the same bytes. Handing a clone to a storage engine and
/// keeping another one lets a test inspect or damage the "chip" while the
/// engine owns its handle, and building a fresh engine over a clone models
/// a device reset.
///
/// # Example
///
/// ```rust
/// use pagestore_medium::{InMemoryMedium, NonVolatileMedium};
///
/// let chip = InMemoryMedium::new(32);
/// let mut handle = chip.clone();
/// handle.write(0, &[1, 2, 3]).unwrap();
/// assert_eq!(chip.read(0, 3).unwrap(), vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryMedium {
    data: Arc<RwLock<Vec<u8>>>,
}

impl InMemoryMedium {
    /// Creates a new erased medium of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_data(vec![ERASED_BYTE; size])
    }

    /// Creates a medium with pre-existing contents.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Returns a copy of all bytes on the medium.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Returns the size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the medium has no bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Applies `f` to the raw bytes, bypassing bounds checks.
    ///
    /// Used by tests to inject corruption.
    pub fn modify<F: FnOnce(&mut [u8])>(&self, f: F) {
        f(&mut self.data.write());
    }
}

impl NonVolatileMedium for InMemoryMedium {
    fn size(&self) -> u64 {
        self.data.read().len() as u64
    }

    fn read(&self, offset: u64, len: usize) -> MediumResult<Vec<u8>> {
        let data = self.data.read();
        check_bounds(offset, len, data.len() as u64)?;
        let start = offset as usize;
        Ok(data[start..start + len].to_vec())
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> MediumResult<()> {
        let mut data = self.data.write();
        check_bounds(offset, bytes.len(), data.len() as u64)?;
        let start = offset as usize;
        data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}
