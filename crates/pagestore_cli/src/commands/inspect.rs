//! Inspect command implementation.

use super::{open_image, OutputFormat};
use pagestore_calibration::{calibration_config, CalibrationData, CalibrationStorage};
use pagestore_core::{Record, SlotInfo, SlotState};
use pagestore_medium::NonVolatileMedium;
use serde::Serialize;
use std::path::Path;

/// One slot of the calibration range.
#[derive(Debug, Serialize)]
pub struct SlotReport {
    /// Slot index.
    pub index: usize,
    /// Absolute address.
    pub offset: u64,
    /// State summary: empty, corrupt, unknown, legacy or current.
    pub state: &'static str,
    /// Schema tag, if the slot is intact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Sequence number, if the slot is intact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    /// Details for corrupt slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl From<&SlotInfo> for SlotReport {
    fn from(info: &SlotInfo) -> Self {
        let (state, schema, fault) = match info.state {
            SlotState::Empty => ("empty", None, None),
            SlotState::Corrupt(fault) => ("corrupt", None, Some(fault.to_string())),
            SlotState::UnknownSchema { schema, .. } => ("unknown", Some(schema.to_string()), None),
            SlotState::Legacy { schema, .. } => ("legacy", Some(schema.to_string()), None),
            SlotState::Current { .. } => ("current", Some(CalibrationData::SCHEMA.to_string()), None),
        };
        Self {
            index: info.index,
            offset: info.offset,
            state,
            schema,
            sequence: info.state.sequence().map(|s| s.as_u64()),
            fault,
        }
    }
}

/// Classifies every calibration slot on `medium`.
pub fn slot_reports<M: NonVolatileMedium>(
    medium: M,
) -> Result<Vec<SlotReport>, Box<dyn std::error::Error>> {
    let storage = CalibrationStorage::new(medium, calibration_config())?;
    Ok(storage.scan()?.iter().map(SlotReport::from).collect())
}

/// Runs the inspect command.
pub fn run(path: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let reports = slot_reports(open_image(path)?)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Text => {
            println!("Calibration slots in {:?}", path);
            println!();
            println!("{:>4}  {:>6}  {:<8}  {:<8}  {:>8}", "slot", "offset", "state", "schema", "sequence");
            for report in &reports {
                println!(
                    "{:>4}  {:>6}  {:<8}  {:<8}  {:>8}",
                    report.index,
                    report.offset,
                    report.state,
                    report.schema.as_deref().unwrap_or("-"),
                    report
                        .sequence
                        .map_or_else(|| "-".to_string(), |s| s.to_string()),
                );
                if let Some(fault) = &report.fault {
                    println!("      {}", fault);
                }
            }
        }
    }

    Ok(())
}
