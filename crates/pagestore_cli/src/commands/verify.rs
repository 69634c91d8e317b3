//! Verify command implementation.

use super::open_image;
use pagestore_calibration::{calibration_config, CalibrationSchema, CalibrationStorage};
use pagestore_core::SlotState;
use pagestore_medium::NonVolatileMedium;
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of slots checked.
    pub slots_checked: usize,
    /// Slots holding a loadable record.
    pub valid_slots: usize,
    /// Slots never written or erased.
    pub empty_slots: usize,
    /// Slots failing their checksum or length check.
    pub corrupt_slots: usize,
    /// Intact slots in a layout this build cannot read.
    pub unknown_slots: usize,
    /// List of problems found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.valid_slots > 0 && self.corrupt_slots == 0
    }
}

/// Checks the calibration range on `medium`.
pub fn verify<M: NonVolatileMedium>(medium: M) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let storage = CalibrationStorage::new(medium, calibration_config())?;
    let mut result = VerifyResult::default();

    for slot in storage.scan()? {
        result.slots_checked += 1;
        match slot.state {
            SlotState::Current { .. } | SlotState::Legacy { .. } => result.valid_slots += 1,
            SlotState::Empty => result.empty_slots += 1,
            SlotState::Corrupt(fault) => {
                result.corrupt_slots += 1;
                result
                    .errors
                    .push(format!("slot {} at {}: {}", slot.index, slot.offset, fault));
            }
            SlotState::UnknownSchema { schema, .. } => {
                result.unknown_slots += 1;
                let reason = match CalibrationSchema::from_tag(schema) {
                    Some(_) => "legacy layout not supported by this build",
                    None => "unsupported schema",
                };
                result.errors.push(format!(
                    "slot {} at {}: {} {}",
                    slot.index, slot.offset, reason, schema
                ));
            }
        }
    }

    if result.valid_slots == 0 {
        result
            .errors
            .push("no valid calibration record; the device will boot with defaults".to_string());
    }

    Ok(result)
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying calibration in {:?}", path);
    println!();

    let result = verify(open_image(path)?)?;

    println!("  Slots checked: {}", result.slots_checked);
    println!("  Valid:         {}", result.valid_slots);
    println!("  Empty:         {}", result.empty_slots);
    println!("  Corrupt:       {}", result.corrupt_slots);
    println!("  Unknown:       {}", result.unknown_slots);
    for error in &result.errors {
        println!("    - {}", error);
    }

    println!();
    if result.is_ok() {
        println!("✓ Calibration verification passed");
        Ok(())
    } else {
        println!("✗ Calibration verification failed");
        Err("Verification failed".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestore_calibration::{Calibration, CALIBRATION_SLOT_SIZE, EEPROM_SIZE};
    use pagestore_core::{SchemaTag, SequenceNumber, SlotHeader, HEADER_SIZE};
    use pagestore_medium::InMemoryMedium;

    #[test]
    fn blank_image_fails() {
        let result = verify(InMemoryMedium::new(EEPROM_SIZE)).unwrap();
        assert_eq!(result.empty_slots, 4);
        assert!(!result.is_ok());
    }

    #[test]
    fn saved_image_passes() {
        let chip = InMemoryMedium::new(EEPROM_SIZE);
        Calibration::init(chip.clone()).unwrap().save().unwrap();

        let result = verify(chip).unwrap();
        assert_eq!(result.valid_slots, 1);
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_layout_is_reported() {
        let chip = InMemoryMedium::new(EEPROM_SIZE);
        Calibration::init(chip.clone()).unwrap().save().unwrap();

        let payload = [0u8; 8];
        let tag = SchemaTag::new(*b"CALI", 7);
        let header = SlotHeader::seal(tag, SequenceNumber::new(5), &payload).unwrap();
        chip.modify(|bytes| {
            let slot = &mut bytes[CALIBRATION_SLOT_SIZE..];
            slot[..HEADER_SIZE].copy_from_slice(&header.encode());
            slot[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(&payload);
        });

        let result = verify(chip).unwrap();
        assert_eq!(result.valid_slots, 1);
        assert_eq!(result.unknown_slots, 1);
        assert!(result.errors[0].contains("unsupported schema CALI/7"));
    }

    #[test]
    fn corruption_fails_even_with_valid_record() {
        let chip = InMemoryMedium::new(EEPROM_SIZE);
        let mut calibration = Calibration::init(chip.clone()).unwrap();
        calibration.save().unwrap();
        calibration.save().unwrap();
        chip.modify(|bytes| bytes[0] ^= 0x80);

        let result = verify(chip).unwrap();
        assert_eq!(result.valid_slots, 1);
        assert_eq!(result.corrupt_slots, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(!result.is_ok());
    }
}
