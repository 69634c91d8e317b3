//! Error types for PageStore core.

use pagestore_medium::MediumError;
use thiserror::Error;

/// Result type for storage engine operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage engine operations.
///
/// Corrupt slots and unknown schemas are not errors: they are skipped
/// during a scan and reported through [`crate::SlotState`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Medium access failed.
    #[error("medium error: {0}")]
    Medium(#[from] MediumError),

    /// The configured range is inverted.
    #[error("invalid range: start {start} is past end {end}")]
    InvalidRange {
        /// Start of the range.
        start: u64,
        /// End of the range (exclusive).
        end: u64,
    },

    /// The configured range extends past the medium.
    #[error("range end {end} is past medium size {size}")]
    RangeOutOfBounds {
        /// End of the range (exclusive).
        end: u64,
        /// Size of the medium.
        size: u64,
    },

    /// The configured range cannot hold two slots.
    #[error("range [{start}, {end}) holds {slots} slot(s) of {slot_size} bytes; at least 2 required")]
    RangeTooSmall {
        /// Start of the range.
        start: u64,
        /// End of the range (exclusive).
        end: u64,
        /// Size of one slot.
        slot_size: usize,
        /// Number of slots that fit.
        slots: u64,
    },

    /// The configured range holds more slots than this target can index.
    #[error("range holds {slots} slots, more than this target can address")]
    TooManySlots {
        /// Number of slots that fit.
        slots: u64,
    },

    /// The configured slot size cannot hold a header plus the record.
    #[error("slot size {slot_size} is below the required {required} bytes")]
    SlotTooSmall {
        /// Configured slot size.
        slot_size: usize,
        /// Header plus encoded record size.
        required: usize,
    },

    /// A record encoded to a different length than it declares.
    #[error("record encoded to {actual} bytes, expected {expected}")]
    RecordSize {
        /// Declared encoded size.
        expected: usize,
        /// Actual encoded size.
        actual: usize,
    },

    /// The sequence counter cannot advance any further.
    #[error("sequence number exhausted")]
    SequenceExhausted,

    /// A payload could not be decoded into a record.
    #[error("decode error: {message}")]
    Decode {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns true if the error came from the medium.
    #[must_use]
    pub fn is_medium(&self) -> bool {
        matches!(self, Self::Medium(_))
    }
}
