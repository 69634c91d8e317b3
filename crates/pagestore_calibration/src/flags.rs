//! Calibration flag bitfield.

use serde::{Deserialize, Serialize};

/// Boolean calibration settings packed into one word.
///
/// Each flag is set, cleared or toggled without touching the others.
/// Unknown bits are preserved so that settings written by newer firmware
/// survive a save by older firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalibrationFlags(u32);

impl CalibrationFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Front-panel encoders turn the other way.
    pub const ENCODERS_REVERSED: Self = Self(1 << 0);

    /// Creates flags from a raw word.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw word.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Sets `flag`.
    pub fn insert(&mut self, flag: Self) {
        self.0 |= flag.0;
    }

    /// Clears `flag`.
    pub fn remove(&mut self, flag: Self) {
        self.0 &= !flag.0;
    }

    /// Sets or clears `flag`.
    pub fn set(&mut self, flag: Self, value: bool) {
        if value {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
    }

    /// Flips `flag` and returns its new state.
    pub fn toggle(&mut self, flag: Self) -> bool {
        self.0 ^= flag.0;
        self.contains(flag)
    }
}
