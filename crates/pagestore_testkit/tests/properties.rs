//! Property tests for slot rotation, recovery and flags.

use pagestore_calibration::{Calibration, CalibrationData, CalibrationFlags, EEPROM_SIZE};
use pagestore_core::{LoadSource, PageStorage, Record, SequenceNumber};
use pagestore_medium::InMemoryMedium;
use pagestore_testkit::prelude::*;
use proptest::prelude::*;

/// Slot written by the `n`th save (1-based) on a fresh storage.
fn slot_of_save(n: usize, slots: usize) -> usize {
    (n - 1) % slots
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn latest_save_wins_across_wraparound(
        slots in slot_count_strategy(),
        extra in 1usize..20,
        records in prop::collection::vec(test_record_strategy(), 40),
    ) {
        let (chip, mut storage) = test_storage(slots);
        let count = slots + extra;
        for record in records.iter().cycle().take(count) {
            storage.save(record).unwrap();
        }

        let expected = records.iter().cycle().nth(count - 1).copied().unwrap();
        let loaded = reopen(&chip, slots).load().unwrap();
        prop_assert_eq!(loaded.record, expected);
        prop_assert_eq!(loaded.source.sequence(), Some(SequenceNumber::new(count as u64)));
    }

    #[test]
    fn save_load_round_trip_is_bit_exact(data in calibration_strategy()) {
        let chip = InMemoryMedium::new(EEPROM_SIZE);
        let mut calibration = Calibration::init(chip.clone()).unwrap();
        *calibration.data_mut() = data;
        calibration.save().unwrap();

        let first = Calibration::init(chip.clone()).unwrap();
        prop_assert_eq!(*first.data(), data);

        let mut again = first;
        again.save().unwrap();
        let second = Calibration::init(chip).unwrap();
        prop_assert_eq!(*second.data(), data);

        let mut a = Vec::new();
        let mut b = Vec::new();
        data.encode(&mut a);
        second.data().encode(&mut b);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn identical_saves_still_rotate(slots in slot_count_strategy(), record in test_record_strategy()) {
        let (_chip, mut storage) = test_storage(slots);
        let first = storage.save(&record).unwrap();
        let second = storage.save(&record).unwrap();

        prop_assert_eq!(second.sequence.as_u64(), first.sequence.as_u64() + 1);
        prop_assert_ne!(first.slot, second.slot);
        prop_assert_eq!(storage.load().unwrap().record, record);
    }

    #[test]
    fn corrupt_slots_are_skipped(
        slots in slot_count_strategy(),
        extra in 0usize..16,
        damaged in prop::collection::vec(any::<bool>(), 8),
        positions in prop::collection::vec((any::<usize>(), 0u8..8), 8),
    ) {
        let (chip, mut storage) = test_storage(slots);
        let saves = slots + extra;
        for n in 1..=saves {
            storage.save(&TestRecord::new(n as u32, 0)).unwrap();
        }

        // Counter held by each slot: the last save that targeted it.
        let mut held = vec![0u32; slots];
        for n in 1..=saves {
            held[slot_of_save(n, slots)] = n as u32;
        }

        for slot in 0..slots {
            if damaged[slot] {
                let (position, bit) = positions[slot];
                corrupt_slot(&chip, slot, position, bit);
            }
        }

        let expected = (0..slots).filter(|&s| !damaged[s]).map(|s| held[s]).max();
        let loaded = storage.load().unwrap();
        match expected {
            Some(counter) => {
                prop_assert_eq!(loaded.record.counter, counter);
                prop_assert_eq!(loaded.source.sequence(), Some(SequenceNumber::new(u64::from(counter))));
            }
            None => {
                prop_assert_eq!(loaded.source, LoadSource::Default);
                prop_assert_eq!(loaded.record, TestRecord::default());
            }
        }

        let scan = storage.scan().unwrap();
        for slot in 0..slots {
            prop_assert_eq!(scan[slot].state.is_corrupt(), damaged[slot]);
        }
    }

    #[test]
    fn torn_save_keeps_previous_record(
        slots in slot_count_strategy(),
        before in 1usize..12,
        cut in 0usize..TEST_SLOT_SIZE,
    ) {
        let chip = InMemoryMedium::new(TEST_SLOT_SIZE * slots);
        let mut storage: PageStorage<_, TestRecord> =
            PageStorage::new(CrashableMedium::new(chip.clone()), test_config(slots)).unwrap();

        for n in 1..=before {
            storage.save(&TestRecord::new(n as u32, 0xA5)).unwrap();
        }
        let previous = TestRecord::new(before as u32, 0xA5);
        let interrupted = TestRecord::new(before as u32 + 1000, 0x5A);

        storage.medium().crash_after(cut);
        let result = storage.save(&interrupted);
        prop_assert!(result.is_err());
        prop_assert!(storage.medium().has_crashed());

        let recovered = reopen(&chip, slots).load().unwrap().record;
        if cut == 0 {
            prop_assert_eq!(recovered, previous);
        } else {
            prop_assert!(recovered == previous || recovered == interrupted);
        }
    }

    #[test]
    fn toggling_twice_restores_flags(flags in flags_strategy(), flag in single_flag_strategy()) {
        let mut toggled = flags;
        toggled.toggle(flag);
        prop_assert_ne!(toggled, flags);
        toggled.toggle(flag);
        prop_assert_eq!(toggled, flags);
    }

    #[test]
    fn flags_do_not_interfere(
        flags in flags_strategy(),
        a in single_flag_strategy(),
        b in single_flag_strategy(),
        value in any::<bool>(),
    ) {
        prop_assume!(a != b);
        let mut changed = flags;
        changed.set(a, value);
        prop_assert_eq!(changed.contains(b), flags.contains(b));
        prop_assert_eq!(changed.contains(a), value);
        prop_assert_eq!(changed.bits() & !a.bits(), flags.bits() & !a.bits());
    }
}

#[test]
fn wear_is_spread_over_every_slot() {
    for slots in 2..=8 {
        let (_chip, mut storage) = test_storage(slots);
        let saves = 100 * slots + 3;
        let mut hits = vec![0usize; slots];
        for n in 0..saves {
            let receipt = storage.save(&TestRecord::new(n as u32, 0)).unwrap();
            hits[receipt.slot] += 1;
        }
        for (slot, &count) in hits.iter().enumerate() {
            assert!(
                count >= saves / slots,
                "slot {slot} written {count} times out of {saves}"
            );
        }
    }
}

#[test]
fn encoder_flag_is_independent_of_raw_bits() {
    let mut data = CalibrationData::default().with_flags(CalibrationFlags::from_bits(0xF0F0_F0F0));
    assert!(data.reverse_encoders());
    assert_eq!(data.flags().bits(), 0xF0F0_F0F1);
    assert!(!data.reverse_encoders());
    assert_eq!(data.flags().bits(), 0xF0F0_F0F0);
}
