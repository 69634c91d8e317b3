//! Storage configuration.

/// Placement of a [`crate::PageStorage`] on its medium.
///
/// The range `[start, end)` is given in absolute medium addresses. The slot
/// size defaults to the slot header plus the record's encoded size; a larger
/// value can be set to align slots to a medium page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStorageConfig {
    /// First byte of the reserved range.
    pub start: u64,

    /// One past the last byte of the reserved range.
    pub end: u64,

    /// Explicit slot size in bytes, if any.
    pub slot_size: Option<usize>,
}

impl PageStorageConfig {
    /// Creates a configuration for the range `[start, end)`.
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            slot_size: None,
        }
    }

    /// Sets an explicit slot size.
    #[must_use]
    pub const fn slot_size(mut self, size: usize) -> Self {
        self.slot_size = Some(size);
        self
    }

    /// Returns the length of the range, or `None` if it is inverted.
    #[must_use]
    pub const fn range_len(&self) -> Option<u64> {
        self.end.checked_sub(self.start)
    }
}
