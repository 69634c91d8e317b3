//! Erase command implementation.

use super::open_image;
use pagestore_calibration::{calibration_config, CalibrationStorage};
use pagestore_medium::NonVolatileMedium;
use std::path::Path;
use tracing::info;

/// Erases every calibration slot on `medium`.
pub fn erase<M: NonVolatileMedium>(medium: M) -> Result<usize, Box<dyn std::error::Error>> {
    let mut storage = CalibrationStorage::new(medium, calibration_config())?;
    storage.erase()?;
    Ok(storage.slot_count())
}

/// Runs the erase command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Erasing calibration range in {:?}", path);
    let slots = erase(open_image(path)?)?;
    println!("✓ Erased {} calibration slots; the device will boot with defaults", slots);
    Ok(())
}
