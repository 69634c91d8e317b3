//! Import command implementation.

use super::open_image;
use pagestore_calibration::{Calibration, CalibrationData};
use pagestore_core::SaveReceipt;
use pagestore_medium::NonVolatileMedium;
use std::path::Path;
use tracing::info;

/// Parses a calibration record from JSON.
///
/// Accepts either a bare record or the output of `show --format json`.
pub fn parse(json: &str) -> Result<CalibrationData, Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let record = match value.get("calibration") {
        Some(inner) => inner.clone(),
        None => value,
    };
    Ok(serde_json::from_value(record)?)
}

/// Replaces the stored record with `data`.
pub fn import<M: NonVolatileMedium>(
    medium: M,
    data: CalibrationData,
) -> Result<SaveReceipt, Box<dyn std::error::Error>> {
    let mut calibration = Calibration::init(medium)?;
    *calibration.data_mut() = data;
    Ok(calibration.save()?)
}

/// Runs the import command.
pub fn run(path: &Path, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(file)?;
    let data = parse(&json)?;

    info!("Importing calibration from {:?}", file);
    let receipt = import(open_image(path)?, data)?;
    println!(
        "✓ Imported calibration into slot {} ({})",
        receipt.slot, receipt.sequence
    );
    Ok(())
}
