//! # PageStore Calibration
//!
//! Calibration record for the signal-processing module, persisted through
//! [`pagestore_core::PageStorage`].
//!
//! This crate provides:
//! - [`CalibrationData`], the current `CALI/2` record layout
//! - [`CalibrationFlags`], the boolean settings bitfield
//! - The `CALI/1` upgrade path (cargo feature `legacy`, on by default)
//! - [`Calibration`], the single owner of the in-memory record
//!
//! ## Usage
//!
//! ```rust
//! use pagestore_calibration::{Calibration, EEPROM_SIZE};
//! use pagestore_medium::InMemoryMedium;
//!
//! let chip = InMemoryMedium::new(EEPROM_SIZE);
//! let mut calibration = Calibration::init(chip).unwrap();
//! assert!(calibration.needs_calibration());
//!
//! calibration.data_mut().reverse_encoders();
//! calibration.save().unwrap();
//! assert!(!calibration.needs_calibration());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod data;
mod flags;
mod schema;
mod state;

pub use data::{
    AdcCalibration, CalibrationData, DacCalibration, ADC_CHANNELS, DAC_CHANNELS, OCTAVES,
};
pub use flags::CalibrationFlags;
pub use schema::CalibrationSchema;
pub use state::{calibration_config, Calibration, CalibrationStorage};

use pagestore_core::{Record, HEADER_SIZE};

/// Size of the device's non-volatile memory in bytes.
pub const EEPROM_SIZE: usize = 2048;

/// First byte reserved for calibration data.
pub const CALIBRATION_START: u64 = 0;

/// One past the last byte reserved for calibration data.
pub const CALIBRATION_END: u64 = 576;

/// Size of one calibration slot.
pub const CALIBRATION_SLOT_SIZE: usize = HEADER_SIZE + CalibrationData::ENCODED_SIZE;

const _: () = assert!(CALIBRATION_END <= EEPROM_SIZE as u64);
const _: () =
    assert!((CALIBRATION_END - CALIBRATION_START) / CALIBRATION_SLOT_SIZE as u64 >= 2);
