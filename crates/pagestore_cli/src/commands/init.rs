//! Init command implementation.

use pagestore_calibration::CALIBRATION_END;
use pagestore_medium::FileMedium;
use std::path::Path;
use tracing::info;

/// Runs the init command.
pub fn run(path: &Path, size: u64) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err(format!("Image {:?} already exists", path).into());
    }
    if size < CALIBRATION_END {
        return Err(format!(
            "Image size {size} is too small for the calibration range (needs {CALIBRATION_END})"
        )
        .into());
    }

    info!("Creating image {:?} ({} bytes)", path, size);
    FileMedium::open(path, size)?;
    println!("✓ Created erased image {:?} ({} bytes)", path, size);
    Ok(())
}
