//! CLI command implementations.

pub mod erase;
pub mod flag;
pub mod import;
pub mod init;
pub mod inspect;
pub mod show;
pub mod verify;

use clap::ValueEnum;
use pagestore_medium::FileMedium;
use std::path::Path;

/// Output format for commands that print reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// JSON.
    Json,
}

/// Opens an existing image file.
pub fn open_image(path: &Path) -> Result<FileMedium, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No image found at {:?} (create one with `init`)", path).into());
    }
    Ok(FileMedium::open_existing(path)?)
}
