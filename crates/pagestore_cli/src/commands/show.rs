//! Show command implementation.

use super::{open_image, OutputFormat};
use pagestore_calibration::{Calibration, CalibrationData};
use pagestore_core::LoadSource;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ShowOutput<'a> {
    source: String,
    calibration: &'a CalibrationData,
}

/// Describes where a record was loaded from.
pub fn describe_source(source: LoadSource) -> String {
    match source {
        LoadSource::Current { slot, sequence } => format!("slot {slot}, {sequence}"),
        LoadSource::Legacy {
            slot,
            sequence,
            schema,
        } => format!("slot {slot}, {sequence}, upgraded from {schema}"),
        LoadSource::Default => "defaults (no valid record)".to_string(),
    }
}

/// Runs the show command.
pub fn run(path: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let calibration = Calibration::init(open_image(path)?)?;
    let data = calibration.data();
    let source = describe_source(calibration.source());

    match format {
        OutputFormat::Json => {
            let output = ShowOutput {
                source,
                calibration: data,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Calibration in {:?}", path);
            println!("  Source:            {}", source);
            println!("  Display offset:    {}", data.display_offset);
            println!("  Encoders reversed: {}", data.encoders_reversed());
            println!("  Flags:             {:#010x}", data.flags().bits());
            println!("  ADC offsets:       {:?}", data.adc.offsets);
            println!("  Pitch CV scale:    {:#x}", data.adc.pitch_cv_scale);
            println!("  Pitch CV low:      {}", data.adc.pitch_cv_low);
            for (channel, octaves) in data.dac.octaves.iter().enumerate() {
                println!("  DAC {}:             {:?}", channel, octaves);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestore_core::{SchemaTag, SequenceNumber};

    #[test]
    fn source_descriptions() {
        assert_eq!(
            describe_source(LoadSource::Current {
                slot: 2,
                sequence: SequenceNumber::new(9)
            }),
            "slot 2, seq:9"
        );
        assert_eq!(
            describe_source(LoadSource::Legacy {
                slot: 0,
                sequence: SequenceNumber::new(3),
                schema: SchemaTag::new(*b"CALI", 1),
            }),
            "slot 0, seq:3, upgraded from CALI/1"
        );
        assert!(describe_source(LoadSource::Default).starts_with("defaults"));
    }
}
