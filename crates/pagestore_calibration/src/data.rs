//! Calibration record layout.

use crate::flags::CalibrationFlags;
use crate::schema::{self, CalibrationSchema};
use bytes::{Buf, BufMut};
use pagestore_core::{LegacySchema, Record, SchemaTag, StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Number of DAC output channels.
pub const DAC_CHANNELS: usize = 4;

/// Number of octave calibration points per DAC channel.
pub const OCTAVES: usize = 11;

/// Number of ADC input channels.
pub const ADC_CHANNELS: usize = 4;

/// DAC code distance between two octaves on an uncalibrated channel.
const DEFAULT_OCTAVE_STEP: u16 = 6_000;

/// ADC reading for 0 V on an uncalibrated 12-bit channel.
const DEFAULT_ADC_OFFSET: u16 = 2_048;

/// Unity pitch CV scale in Q16.16.
const UNITY_SCALE: u32 = 1 << 16;

/// Per-channel DAC octave tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DacCalibration {
    /// DAC code for each octave, per channel.
    pub octaves: [[u16; OCTAVES]; DAC_CHANNELS],
}

impl Default for DacCalibration {
    fn default() -> Self {
        let mut table = [0u16; OCTAVES];
        for (octave, code) in table.iter_mut().enumerate() {
            *code = DEFAULT_OCTAVE_STEP * octave as u16;
        }
        Self {
            octaves: [table; DAC_CHANNELS],
        }
    }
}

impl DacCalibration {
    pub(crate) const ENCODED_SIZE: usize = DAC_CHANNELS * OCTAVES * 2;

    pub(crate) fn encode<B: BufMut>(&self, buf: &mut B) {
        for channel in &self.octaves {
            for &code in channel {
                buf.put_u16_le(code);
            }
        }
    }

    pub(crate) fn decode<B: Buf>(buf: &mut B) -> Self {
        let mut octaves = [[0u16; OCTAVES]; DAC_CHANNELS];
        for channel in &mut octaves {
            for code in channel.iter_mut() {
                *code = buf.get_u16_le();
            }
        }
        Self { octaves }
    }
}

/// ADC trim values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdcCalibration {
    /// Reading at 0 V, per channel.
    pub offsets: [u16; ADC_CHANNELS],
    /// Pitch CV scale in Q16.16.
    pub pitch_cv_scale: u32,
    /// Pitch CV reading at the lowest calibrated voltage.
    pub pitch_cv_low: i16,
}

impl Default for AdcCalibration {
    fn default() -> Self {
        Self {
            offsets: [DEFAULT_ADC_OFFSET; ADC_CHANNELS],
            pitch_cv_scale: UNITY_SCALE,
            pitch_cv_low: 0,
        }
    }
}

impl AdcCalibration {
    pub(crate) const ENCODED_SIZE: usize = ADC_CHANNELS * 2 + 4 + 2;

    pub(crate) fn encode<B: BufMut>(&self, buf: &mut B) {
        for &offset in &self.offsets {
            buf.put_u16_le(offset);
        }
        buf.put_u32_le(self.pitch_cv_scale);
        buf.put_i16_le(self.pitch_cv_low);
    }

    pub(crate) fn decode<B: Buf>(buf: &mut B) -> Self {
        let mut offsets = [0u16; ADC_CHANNELS];
        for offset in &mut offsets {
            *offset = buf.get_u16_le();
        }
        Self {
            offsets,
            pitch_cv_scale: buf.get_u32_le(),
            pitch_cv_low: buf.get_i16_le(),
        }
    }
}

/// Device calibration, layout `CALI/2`.
///
/// The default value is the neutral calibration used when the device has
/// never been calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalibrationData {
    /// DAC octave tables.
    pub dac: DacCalibration,
    /// ADC trim.
    pub adc: AdcCalibration,
    /// Horizontal display offset in pixels.
    pub display_offset: u8,
    /// Boolean settings, reached through the flag accessors.
    pub(crate) flags: CalibrationFlags,
    /// Reserved for future use; zero when written by older layouts.
    #[serde(default)]
    pub reserved0: u32,
    /// Reserved for future use; zero when written by older layouts.
    #[serde(default)]
    pub reserved1: u32,
}

impl CalibrationData {
    /// Bytes used by fields; the rest of the payload is zero padding.
    pub(crate) const FIELDS_SIZE: usize =
        DacCalibration::ENCODED_SIZE + AdcCalibration::ENCODED_SIZE + 1 + 4 + 4 + 4;

    /// Returns the record with its flag word replaced.
    #[must_use]
    pub const fn with_flags(mut self, flags: CalibrationFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns the whole flag word.
    #[must_use]
    pub const fn flags(&self) -> CalibrationFlags {
        self.flags
    }

    /// Returns true if `flag` is set.
    #[must_use]
    pub const fn flag(&self, flag: CalibrationFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Sets or clears `flag` and returns its previous state.
    pub fn set_flag(&mut self, flag: CalibrationFlags, value: bool) -> bool {
        let previous = self.flag(flag);
        self.flags.set(flag, value);
        previous
    }

    /// Flips `flag` and returns its new state.
    pub fn toggle_flag(&mut self, flag: CalibrationFlags) -> bool {
        self.flags.toggle(flag)
    }

    /// Returns true if the front-panel encoders are reversed.
    #[must_use]
    pub const fn encoders_reversed(&self) -> bool {
        self.flag(CalibrationFlags::ENCODERS_REVERSED)
    }

    /// Flips the encoder direction, leaving other flags alone, and returns
    /// the new direction.
    pub fn reverse_encoders(&mut self) -> bool {
        self.toggle_flag(CalibrationFlags::ENCODERS_REVERSED)
    }

    /// Sets the encoder direction and returns the previous one.
    pub fn set_encoders_reversed(&mut self, reversed: bool) -> bool {
        self.set_flag(CalibrationFlags::ENCODERS_REVERSED, reversed)
    }
}

impl Record for CalibrationData {
    const SCHEMA: SchemaTag = CalibrationSchema::V2.tag();
    const ENCODED_SIZE: usize = 124;
    const LEGACY: &'static [LegacySchema<Self>] = schema::LEGACY;

    fn encode(&self, buf: &mut Vec<u8>) {
        let start = buf.len();
        self.dac.encode(buf);
        self.adc.encode(buf);
        buf.put_u8(self.display_offset);
        buf.put_u32_le(self.flags.bits());
        buf.put_u32_le(self.reserved0);
        buf.put_u32_le(self.reserved1);
        buf.resize(start + Self::ENCODED_SIZE, 0);
    }

    fn decode(payload: &[u8]) -> StoreResult<Self> {
        if payload.len() < Self::FIELDS_SIZE {
            return Err(StoreError::decode(format!(
                "calibration payload is {} bytes, need {}",
                payload.len(),
                Self::FIELDS_SIZE
            )));
        }

        let mut buf = payload;
        Ok(Self {
            dac: DacCalibration::decode(&mut buf),
            adc: AdcCalibration::decode(&mut buf),
            display_offset: buf.get_u8(),
            flags: CalibrationFlags::from_bits(buf.get_u32_le()),
            reserved0: buf.get_u32_le(),
            reserved1: buf.get_u32_le(),
        })
    }
}
