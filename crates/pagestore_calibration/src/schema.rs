//! Calibration layouts, current and legacy.
//!
//! | Tag      | Payload | Layout                                              |
//! |----------|---------|-----------------------------------------------------|
//! | `CALI/1` | 104     | dac, adc, display offset, flags as one byte         |
//! | `CALI/2` | 124     | dac, adc, display offset, flags word, two reserved words, zero padding |

use crate::data::{AdcCalibration, CalibrationData, DacCalibration};
use crate::flags::CalibrationFlags;
use bytes::Buf;
use pagestore_core::{LegacySchema, Record, SchemaTag, StoreError, StoreResult};

const CODE: [u8; 4] = *b"CALI";

/// Calibration layouts known to this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationSchema {
    /// First layout: no reserved words, flags stored in one byte.
    V1,
    /// Current layout.
    V2,
}

impl CalibrationSchema {
    /// All known layouts, oldest first.
    pub const ALL: [Self; 2] = [Self::V1, Self::V2];

    /// Returns the tag the layout is stored under.
    #[must_use]
    pub const fn tag(self) -> SchemaTag {
        match self {
            Self::V1 => SchemaTag::new(CODE, 1),
            Self::V2 => SchemaTag::new(CODE, 2),
        }
    }

    /// Returns the payload size of the layout.
    #[must_use]
    pub const fn encoded_size(self) -> usize {
        match self {
            Self::V1 => V1_ENCODED_SIZE,
            Self::V2 => CalibrationData::ENCODED_SIZE,
        }
    }

    /// Identifies a layout by its tag.
    #[must_use]
    pub fn from_tag(tag: SchemaTag) -> Option<Self> {
        Self::ALL.into_iter().find(|schema| schema.tag() == tag)
    }

    /// Returns the table entry the storage engine uses to read this layout.
    #[must_use]
    pub const fn layout(self) -> LegacySchema<CalibrationData> {
        LegacySchema {
            tag: self.tag(),
            encoded_size: self.encoded_size(),
            upgrade: match self {
                Self::V1 => decode_v1,
                Self::V2 => <CalibrationData as Record>::decode,
            },
        }
    }

    /// Decodes a payload of this layout into the current record.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload has the wrong size.
    pub fn decode(self, payload: &[u8]) -> StoreResult<CalibrationData> {
        (self.layout().upgrade)(payload)
    }
}

const V1_ENCODED_SIZE: usize = DacCalibration::ENCODED_SIZE + AdcCalibration::ENCODED_SIZE + 1 + 1;

fn decode_v1(payload: &[u8]) -> StoreResult<CalibrationData> {
    if payload.len() != V1_ENCODED_SIZE {
        return Err(StoreError::decode(format!(
            "CALI/1 payload is {} bytes, expected {V1_ENCODED_SIZE}",
            payload.len()
        )));
    }

    let mut buf = payload;
    Ok(CalibrationData {
        dac: DacCalibration::decode(&mut buf),
        adc: AdcCalibration::decode(&mut buf),
        display_offset: buf.get_u8(),
        flags: CalibrationFlags::from_bits(u32::from(buf.get_u8())),
        reserved0: 0,
        reserved1: 0,
    })
}

#[cfg(feature = "legacy")]
pub(crate) const LEGACY: &[LegacySchema<CalibrationData>] = &[CalibrationSchema::V1.layout()];

#[cfg(not(feature = "legacy"))]
pub(crate) const LEGACY: &[LegacySchema<CalibrationData>] = &[];

/// Encodes `data` in the `CALI/1` layout, dropping what it cannot hold.
#[cfg(test)]
pub(crate) fn encode_v1(data: &CalibrationData) -> Vec<u8> {
    use bytes::BufMut;

    let mut buf = Vec::with_capacity(V1_ENCODED_SIZE);
    data.dac.encode(&mut buf);
    data.adc.encode(&mut buf);
    buf.put_u8(data.display_offset);
    buf.put_u8(data.flags.bits() as u8);
    buf
}
