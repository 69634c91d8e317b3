//! Test fixtures: a tiny record type and storage helpers.

use pagestore_core::{
    PageStorage, PageStorageConfig, Record, SchemaTag, StoreError, StoreResult, HEADER_SIZE,
};
use pagestore_medium::{FileMedium, InMemoryMedium};
use tempfile::TempDir;

/// Slot size used by [`test_storage`].
pub const TEST_SLOT_SIZE: usize = 64;

/// A three-field record: the `TST1` tag, a counter and a flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TestRecord {
    /// Monotonic counter set by the test.
    pub counter: u32,
    /// Arbitrary flag bits.
    pub flags: u8,
}

impl TestRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(counter: u32, flags: u8) -> Self {
        Self { counter, flags }
    }
}

impl Record for TestRecord {
    const SCHEMA: SchemaTag = SchemaTag::new(*b"TST1", 1);
    const ENCODED_SIZE: usize = 5;

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.counter.to_le_bytes());
        buf.push(self.flags);
    }

    fn decode(payload: &[u8]) -> StoreResult<Self> {
        let [a, b, c, d, flags] = payload else {
            return Err(StoreError::decode("TST1 payload must be 5 bytes"));
        };
        Ok(Self {
            counter: u32::from_le_bytes([*a, *b, *c, *d]),
            flags: *flags,
        })
    }
}

/// Storage of [`TestRecord`] over an in-memory chip.
pub type TestStorage = PageStorage<InMemoryMedium, TestRecord>;

/// Builds a storage with `slots` slots of [`TEST_SLOT_SIZE`] bytes.
///
/// Returns a second handle to the chip, which shares its bytes with the
/// one the storage owns.
///
/// # Panics
///
/// Panics if `slots < 2`.
#[must_use]
pub fn test_storage(slots: usize) -> (InMemoryMedium, TestStorage) {
    let chip = InMemoryMedium::new(TEST_SLOT_SIZE * slots);
    let storage = reopen(&chip, slots);
    (chip, storage)
}

/// Builds a fresh storage over an existing chip, as after a device reset.
///
/// # Panics
///
/// Panics if the chip is too small for `slots` slots.
#[must_use]
pub fn reopen(chip: &InMemoryMedium, slots: usize) -> TestStorage {
    PageStorage::new(chip.clone(), test_config(slots)).expect("valid test storage")
}

/// Configuration for `slots` slots of [`TEST_SLOT_SIZE`] bytes at address 0.
#[must_use]
pub const fn test_config(slots: usize) -> PageStorageConfig {
    PageStorageConfig::new(0, (TEST_SLOT_SIZE * slots) as u64).slot_size(TEST_SLOT_SIZE)
}

/// Flips one bit on the chip.
pub fn flip_bit(chip: &InMemoryMedium, offset: usize, bit: u8) {
    chip.modify(|data| data[offset] ^= 1 << (bit % 8));
}

/// Damages slot `index` of a [`test_storage`] chip.
///
/// `position` selects a byte within the checksummed part of the slot
/// (header plus payload), so the damage is always detected.
pub fn corrupt_slot(chip: &InMemoryMedium, index: usize, position: usize, bit: u8) {
    let covered = HEADER_SIZE + TestRecord::ENCODED_SIZE;
    flip_bit(chip, index * TEST_SLOT_SIZE + position % covered, bit);
}

/// Creates an erased image file of `size` bytes in a temporary directory.
///
/// The directory is deleted when the returned [`TempDir`] is dropped.
///
/// # Panics
///
/// Panics if the directory or file cannot be created.
#[must_use]
pub fn temp_image(size: u64) -> (TempDir, FileMedium) {
    let dir = TempDir::new().expect("create temp dir");
    let medium = FileMedium::open(&dir.path().join("eeprom.bin"), size).expect("create image");
    (dir, medium)
}
