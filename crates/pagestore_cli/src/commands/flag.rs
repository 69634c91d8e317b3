//! Flag command implementation.

use super::open_image;
use clap::ValueEnum;
use pagestore_calibration::{Calibration, CalibrationFlags};
use pagestore_core::SaveReceipt;
use pagestore_medium::NonVolatileMedium;
use std::path::Path;
use tracing::info;

/// Calibration flags that can be changed from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagName {
    /// Front-panel encoder direction.
    EncodersReversed,
}

impl FlagName {
    fn flag(self) -> CalibrationFlags {
        match self {
            Self::EncodersReversed => CalibrationFlags::ENCODERS_REVERSED,
        }
    }
}

/// What to do with a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagAction {
    /// Set the flag.
    On,
    /// Clear the flag.
    Off,
    /// Flip the flag.
    Toggle,
}

/// Applies `action` to `name` and saves the record.
///
/// Returns the new flag state and where the record was written.
pub fn apply<M: NonVolatileMedium>(
    medium: M,
    name: FlagName,
    action: FlagAction,
) -> Result<(bool, SaveReceipt), Box<dyn std::error::Error>> {
    let mut calibration = Calibration::init(medium)?;
    let data = calibration.data_mut();
    let flag = name.flag();
    let state = match action {
        FlagAction::On => {
            data.set_flag(flag, true);
            true
        }
        FlagAction::Off => {
            data.set_flag(flag, false);
            false
        }
        FlagAction::Toggle => data.toggle_flag(flag),
    };

    let receipt = calibration.save()?;
    info!(?name, state, slot = receipt.slot, "flag saved");
    Ok((state, receipt))
}

/// Runs the flag command.
pub fn run(path: &Path, name: FlagName, action: FlagAction) -> Result<(), Box<dyn std::error::Error>> {
    let (state, receipt) = apply(open_image(path)?, name, action)?;
    let label = name
        .to_possible_value()
        .map_or_else(|| format!("{name:?}"), |v| v.get_name().to_string());
    println!(
        "✓ {} is now {} (slot {}, {})",
        label,
        if state { "on" } else { "off" },
        receipt.slot,
        receipt.sequence
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestore_calibration::{CalibrationData, EEPROM_SIZE};
    use pagestore_medium::InMemoryMedium;

    #[test]
    fn toggle_persists_and_flips_back() {
        let chip = InMemoryMedium::new(EEPROM_SIZE);

        let (state, first) = apply(chip.clone(), FlagName::EncodersReversed, FlagAction::Toggle).unwrap();
        assert!(state);
        assert!(Calibration::init(chip.clone()).unwrap().data().encoders_reversed());

        let (state, second) = apply(chip.clone(), FlagName::EncodersReversed, FlagAction::Toggle).unwrap();
        assert!(!state);
        assert_ne!(first.slot, second.slot);
        assert!(!Calibration::init(chip).unwrap().data().encoders_reversed());
    }

    #[test]
    fn on_and_off_are_idempotent() {
        let chip = InMemoryMedium::new(EEPROM_SIZE);
        for _ in 0..2 {
            let (state, _) = apply(chip.clone(), FlagName::EncodersReversed, FlagAction::On).unwrap();
            assert!(state);
        }
        let (state, _) = apply(chip.clone(), FlagName::EncodersReversed, FlagAction::Off).unwrap();
        assert!(!state);
        assert!(!Calibration::init(chip).unwrap().data().encoders_reversed());
    }

    #[test]
    fn other_bits_survive() {
        let chip = InMemoryMedium::new(EEPROM_SIZE);
        let mut calibration = Calibration::init(chip.clone()).unwrap();
        *calibration.data_mut() =
            CalibrationData::default().with_flags(CalibrationFlags::from_bits(0x0000_0100));
        calibration.save().unwrap();

        apply(chip.clone(), FlagName::EncodersReversed, FlagAction::On).unwrap();
        let flags = Calibration::init(chip).unwrap().data().flags();
        assert_eq!(flags.bits(), 0x0000_0101);
    }
}
