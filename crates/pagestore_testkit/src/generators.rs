//! Property-based test generators using proptest.

use crate::fixtures::TestRecord;
use pagestore_calibration::{
    AdcCalibration, CalibrationData, CalibrationFlags, DacCalibration,
};
use proptest::prelude::*;

/// Strategy for test records.
pub fn test_record_strategy() -> impl Strategy<Value = TestRecord> {
    (any::<u32>(), any::<u8>()).prop_map(|(counter, flags)| TestRecord::new(counter, flags))
}

/// Strategy for slot counts worth testing.
pub fn slot_count_strategy() -> impl Strategy<Value = usize> {
    2usize..=8
}

/// Strategy for raw flag words.
pub fn flags_strategy() -> impl Strategy<Value = CalibrationFlags> {
    any::<u32>().prop_map(CalibrationFlags::from_bits)
}

/// Strategy for single-bit flags.
pub fn single_flag_strategy() -> impl Strategy<Value = CalibrationFlags> {
    (0u32..32).prop_map(|bit| CalibrationFlags::from_bits(1 << bit))
}

/// Strategy for arbitrary calibration records, reserved words included.
pub fn calibration_strategy() -> impl Strategy<Value = CalibrationData> {
    let dac = prop::array::uniform4(prop::array::uniform11(any::<u16>()))
        .prop_map(|octaves| DacCalibration { octaves });
    let adc = (
        prop::array::uniform4(any::<u16>()),
        any::<u32>(),
        any::<i16>(),
    )
        .prop_map(|(offsets, pitch_cv_scale, pitch_cv_low)| AdcCalibration {
            offsets,
            pitch_cv_scale,
            pitch_cv_low,
        });

    (dac, adc, any::<u8>(), flags_strategy(), any::<u32>(), any::<u32>()).prop_map(
        |(dac, adc, display_offset, flags, reserved0, reserved1)| {
            let mut data = CalibrationData::default().with_flags(flags);
            data.dac = dac;
            data.adc = adc;
            data.display_offset = display_offset;
            data.reserved0 = reserved0;
            data.reserved1 = reserved1;
            data
        },
    )
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
