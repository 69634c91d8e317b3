//! Wear-leveled slot storage.
//!
//! A [`PageStorage`] owns a range `[start, end)` of a medium and divides it
//! into `N` equal slots. Each save writes the whole record, under a fresh
//! header, into the slot holding the oldest data, so writes rotate through
//! every slot in sequence order. Each load scans all slots and returns the
//! newest one whose header and checksum are intact.
//!
//! Because a save never touches the slot `load` would return, a save that is
//! torn by a power loss leaves the previous record recoverable.

use crate::config::PageStorageConfig;
use crate::error::{StoreError, StoreResult};
use crate::header::{SlotHeader, HEADER_SIZE};
use crate::schema::{Record, SchemaTag};
use crate::types::SequenceNumber;
use pagestore_medium::{NonVolatileMedium, ERASED_BYTE};
use std::cmp::Reverse;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// Why a slot was rejected as corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotFault {
    /// The header claims more payload than the slot can hold.
    LengthOutOfRange {
        /// Payload length from the header.
        payload_len: usize,
        /// Payload capacity of the slot.
        capacity: usize,
    },
    /// The checksum does not match header and payload.
    ChecksumMismatch {
        /// Checksum stored in the header.
        stored: u32,
        /// Checksum computed from the slot contents.
        computed: u32,
    },
}

impl fmt::Display for SlotFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthOutOfRange {
                payload_len,
                capacity,
            } => write!(f, "payload length {payload_len} exceeds capacity {capacity}"),
            Self::ChecksumMismatch { stored, computed } => {
                write!(f, "checksum mismatch: stored {stored:08x}, computed {computed:08x}")
            }
        }
    }
}

/// Classification of one slot after a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never written, or erased.
    Empty,
    /// Header or payload damaged.
    Corrupt(SlotFault),
    /// Intact, but written under a schema this build cannot read.
    UnknownSchema {
        /// Tag found in the header.
        schema: SchemaTag,
        /// Sequence number found in the header.
        sequence: SequenceNumber,
    },
    /// Intact record in a supported legacy schema.
    Legacy {
        /// Legacy tag found in the header.
        schema: SchemaTag,
        /// Sequence number found in the header.
        sequence: SequenceNumber,
    },
    /// Intact record in the current schema.
    Current {
        /// Sequence number found in the header.
        sequence: SequenceNumber,
    },
}

impl SlotState {
    /// Returns the sequence number of an intact slot.
    ///
    /// Empty and corrupt slots have none, which ranks them below every
    /// written slot when choosing the next write target.
    #[must_use]
    pub const fn sequence(&self) -> Option<SequenceNumber> {
        match self {
            Self::Empty | Self::Corrupt(_) => None,
            Self::UnknownSchema { sequence, .. }
            | Self::Legacy { sequence, .. }
            | Self::Current { sequence } => Some(*sequence),
        }
    }

    /// Returns true if the slot holds a record this build can load.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Current { .. } | Self::Legacy { .. })
    }

    /// Returns true if the slot is damaged.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Corrupt(fault) => write!(f, "corrupt ({fault})"),
            Self::UnknownSchema { schema, sequence } => {
                write!(f, "unknown schema {schema} {sequence}")
            }
            Self::Legacy { schema, sequence } => write!(f, "legacy {schema} {sequence}"),
            Self::Current { sequence } => write!(f, "current {sequence}"),
        }
    }
}

/// Scan result for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// Slot index within the range.
    pub index: usize,
    /// Absolute medium address of the slot.
    pub offset: u64,
    /// Classification of the slot contents.
    pub state: SlotState,
}

/// Where a loaded record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Newest slot in the current schema.
    Current {
        /// Slot index.
        slot: usize,
        /// Sequence number of the slot.
        sequence: SequenceNumber,
    },
    /// Newest slot in a legacy schema, upgraded on load.
    Legacy {
        /// Slot index.
        slot: usize,
        /// Sequence number of the slot.
        sequence: SequenceNumber,
        /// Legacy tag the slot was written under.
        schema: SchemaTag,
    },
    /// No valid slot; the record is the type's default.
    Default,
}

impl LoadSource {
    /// Returns true if no prior data was found.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Returns the sequence number of the slot the record came from.
    #[must_use]
    pub const fn sequence(&self) -> Option<SequenceNumber> {
        match self {
            Self::Current { sequence, .. } | Self::Legacy { sequence, .. } => Some(*sequence),
            Self::Default => None,
        }
    }

    /// Returns the slot the record came from.
    #[must_use]
    pub const fn slot(&self) -> Option<usize> {
        match self {
            Self::Current { slot, .. } | Self::Legacy { slot, .. } => Some(*slot),
            Self::Default => None,
        }
    }
}

/// Outcome of [`PageStorage::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<R> {
    /// The recovered (or default) record.
    pub record: R,
    /// Where the record came from.
    pub source: LoadSource,
}

/// Outcome of [`PageStorage::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Slot index written.
    pub slot: usize,
    /// Absolute medium address written.
    pub offset: u64,
    /// Sequence number stamped on the slot.
    pub sequence: SequenceNumber,
}

struct ScannedSlot {
    info: SlotInfo,
    bytes: Vec<u8>,
}

impl ScannedSlot {
    fn payload(&self) -> &[u8] {
        let len = SlotHeader::decode(&self.bytes)
            .map(|header| usize::from(header.payload_len))
            .unwrap_or(0);
        &self.bytes[HEADER_SIZE..HEADER_SIZE + len]
    }
}

/// Wear-leveled storage of one record type in a fixed medium range.
///
/// # Invariants
///
/// - the range holds at least two slots
/// - `load` never writes to the medium
/// - `save` writes exactly one slot, never the one `load` would return
///
/// # Example
///
/// See the crate-level documentation.
pub struct PageStorage<M, R> {
    medium: M,
    config: PageStorageConfig,
    slot_size: usize,
    slot_count: usize,
    _record: PhantomData<fn() -> R>,
}

impl<M: fmt::Debug, R> fmt::Debug for PageStorage<M, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageStorage")
            .field("medium", &self.medium)
            .field("config", &self.config)
            .field("slot_size", &self.slot_size)
            .field("slot_count", &self.slot_count)
            .finish()
    }
}

impl<M: NonVolatileMedium, R: Record> PageStorage<M, R> {
    /// Binds a storage engine to a range of `medium`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the range is inverted or extends past the medium
    /// - the slot size cannot hold a header plus the record
    /// - the range holds fewer than two slots
    pub fn new(medium: M, config: PageStorageConfig) -> StoreResult<Self> {
        let PageStorageConfig { start, end, .. } = config;
        let len = config
            .range_len()
            .ok_or(StoreError::InvalidRange { start, end })?;

        let size = medium.size();
        if end > size {
            return Err(StoreError::RangeOutOfBounds { end, size });
        }

        if R::ENCODED_SIZE > usize::from(u16::MAX) {
            return Err(StoreError::RecordSize {
                expected: usize::from(u16::MAX),
                actual: R::ENCODED_SIZE,
            });
        }

        let required = HEADER_SIZE + R::ENCODED_SIZE;
        let slot_size = config.slot_size.unwrap_or(required);
        if slot_size < required {
            return Err(StoreError::SlotTooSmall {
                slot_size,
                required,
            });
        }

        let slots = len / slot_size as u64;
        let slot_count = usize::try_from(slots).map_err(|_| StoreError::TooManySlots { slots })?;
        if slot_count < 2 {
            return Err(StoreError::RangeTooSmall {
                start,
                end,
                slot_size,
                slots,
            });
        }

        debug!(
            schema = %R::SCHEMA,
            start,
            end,
            slot_size,
            slots,
            "page storage bound"
        );

        Ok(Self {
            medium,
            config,
            slot_size,
            slot_count,
            _record: PhantomData,
        })
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Returns the size of one slot in bytes.
    #[must_use]
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PageStorageConfig {
        &self.config
    }

    /// Returns the underlying medium.
    #[must_use]
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Releases the underlying medium.
    #[must_use]
    pub fn into_medium(self) -> M {
        self.medium
    }

    /// Returns the absolute address of slot `index`.
    #[must_use]
    pub fn slot_offset(&self, index: usize) -> u64 {
        self.config.start + index as u64 * self.slot_size as u64
    }

    /// Classifies every slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    pub fn scan(&self) -> StoreResult<Vec<SlotInfo>> {
        Ok(self.scan_slots()?.into_iter().map(|s| s.info).collect())
    }

    /// Recovers the newest valid record.
    ///
    /// Current-schema slots are preferred; legacy slots are only consulted
    /// when no current slot decodes. With no valid slot at all, the record
    /// type's default is returned with [`LoadSource::Default`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the medium cannot be read.
    pub fn load(&self) -> StoreResult<Loaded<R>> {
        let slots = self.scan_slots()?;
        match Self::recover(&slots) {
            Some(loaded) => {
                match loaded.source {
                    LoadSource::Legacy {
                        slot,
                        sequence,
                        schema,
                    } => {
                        info!(slot, %sequence, from = %schema, to = %R::SCHEMA, "upgraded legacy record");
                    }
                    source => debug!(?source, "loaded record"),
                }
                Ok(loaded)
            }
            None => {
                warn!(schema = %R::SCHEMA, slots = self.slot_count, "no valid record found, using defaults");
                Ok(Loaded {
                    record: R::default(),
                    source: LoadSource::Default,
                })
            }
        }
    }

    /// Writes `record` into the least recently written slot.
    ///
    /// The new sequence number is one past the highest sequence found on any
    /// intact slot. The target is the slot with the lowest sequence number,
    /// with empty and corrupt slots first and ties going to the lowest index.
    /// The slot `load` would currently return is never the target, even when
    /// newer slots it cannot read outrank it.
    /// Header and payload go out in a single medium write, which is not read
    /// back.
    ///
    /// # Errors
    ///
    /// Returns an error if the record encodes to the wrong size, the sequence
    /// counter is exhausted, or the medium fails. On a medium failure the
    /// previously newest record is still recoverable.
    pub fn save(&mut self, record: &R) -> StoreResult<SaveReceipt> {
        let mut payload = Vec::with_capacity(R::ENCODED_SIZE);
        record.encode(&mut payload);
        if payload.len() != R::ENCODED_SIZE {
            return Err(StoreError::RecordSize {
                expected: R::ENCODED_SIZE,
                actual: payload.len(),
            });
        }

        let slots = self.scan_slots()?;
        let sequence = match slots.iter().filter_map(|s| s.info.state.sequence()).max() {
            Some(latest) => latest.next().ok_or(StoreError::SequenceExhausted)?,
            None => SequenceNumber::FIRST,
        };
        let newest = Self::recover(&slots).and_then(|loaded| loaded.source.slot());
        let target = slots
            .iter()
            .map(|s| &s.info)
            .filter(|info| Some(info.index) != newest)
            .min_by_key(|info| (info.state.sequence(), info.index))
            .map_or(0, |info| info.index);

        let header = SlotHeader::seal(R::SCHEMA, sequence, &payload)?;
        let mut bytes = Vec::with_capacity(self.slot_size);
        bytes.extend_from_slice(&header.encode());
        bytes.extend_from_slice(&payload);
        bytes.resize(self.slot_size, 0);

        let offset = self.slot_offset(target);
        self.medium.write(offset, &bytes)?;

        info!(slot = target, offset, %sequence, schema = %R::SCHEMA, "record saved");
        Ok(SaveReceipt {
            slot: target,
            offset,
            sequence,
        })
    }

    /// Overwrites every slot with the erased pattern.
    ///
    /// After this, `load` returns the default record.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium fails.
    pub fn erase(&mut self) -> StoreResult<()> {
        let blank = vec![ERASED_BYTE; self.slot_size];
        for index in 0..self.slot_count {
            let offset = self.slot_offset(index);
            self.medium.write(offset, &blank)?;
        }
        info!(slots = self.slot_count, "storage erased");
        Ok(())
    }

    fn scan_slots(&self) -> StoreResult<Vec<ScannedSlot>> {
        let mut slots = Vec::with_capacity(self.slot_count);
        for index in 0..self.slot_count {
            let offset = self.slot_offset(index);
            let bytes = self.medium.read(offset, self.slot_size)?;
            let state = self.classify(&bytes);
            match state {
                SlotState::Corrupt(fault) => {
                    warn!(slot = index, offset, %fault, "corrupt slot");
                }
                SlotState::UnknownSchema { schema, sequence } => {
                    warn!(slot = index, offset, %schema, %sequence, "slot has unsupported schema");
                }
                _ => {}
            }
            slots.push(ScannedSlot {
                info: SlotInfo {
                    index,
                    offset,
                    state,
                },
                bytes,
            });
        }

        debug!(
            slots = slots.len(),
            valid = slots.iter().filter(|s| s.info.state.is_valid()).count(),
            "scan complete"
        );
        Ok(slots)
    }

    /// Picks the record `load` returns: the newest decodable current slot,
    /// else the newest upgradable legacy slot.
    fn recover(slots: &[ScannedSlot]) -> Option<Loaded<R>> {
        let mut current: Vec<&ScannedSlot> = slots
            .iter()
            .filter(|s| matches!(s.info.state, SlotState::Current { .. }))
            .collect();
        current.sort_by_key(|s| (Reverse(s.info.state.sequence()), s.info.index));

        for slot in current {
            let SlotState::Current { sequence } = slot.info.state else {
                continue;
            };
            match R::decode(slot.payload()) {
                Ok(record) => {
                    return Some(Loaded {
                        record,
                        source: LoadSource::Current {
                            slot: slot.info.index,
                            sequence,
                        },
                    });
                }
                Err(e) => {
                    warn!(slot = slot.info.index, %sequence, error = %e, "skipping undecodable slot");
                }
            }
        }

        let mut legacy: Vec<&ScannedSlot> = slots
            .iter()
            .filter(|s| matches!(s.info.state, SlotState::Legacy { .. }))
            .collect();
        legacy.sort_by_key(|s| (Reverse(s.info.state.sequence()), s.info.index));

        for slot in legacy {
            let SlotState::Legacy { schema, sequence } = slot.info.state else {
                continue;
            };
            let Some(upgrade) = R::legacy_schema(schema) else {
                continue;
            };
            match (upgrade.upgrade)(slot.payload()) {
                Ok(record) => {
                    return Some(Loaded {
                        record,
                        source: LoadSource::Legacy {
                            slot: slot.info.index,
                            sequence,
                            schema,
                        },
                    });
                }
                Err(e) => {
                    warn!(slot = slot.info.index, %sequence, from = %schema, error = %e, "skipping undecodable legacy slot");
                }
            }
        }

        None
    }

    fn classify(&self, bytes: &[u8]) -> SlotState {
        if SlotHeader::is_blank(bytes) {
            return SlotState::Empty;
        }
        let Ok(header) = SlotHeader::decode(bytes) else {
            return SlotState::Empty;
        };

        let capacity = self.slot_size - HEADER_SIZE;
        let payload_len = usize::from(header.payload_len);
        if payload_len > capacity {
            return SlotState::Corrupt(SlotFault::LengthOutOfRange {
                payload_len,
                capacity,
            });
        }

        let payload = &bytes[HEADER_SIZE..HEADER_SIZE + payload_len];
        if !header.verify(payload) {
            return SlotState::Corrupt(SlotFault::ChecksumMismatch {
                stored: header.crc,
                computed: header.expected_crc(payload),
            });
        }

        let schema = header.schema;
        let sequence = header.sequence;
        if schema == R::SCHEMA && payload_len == R::ENCODED_SIZE {
            return SlotState::Current { sequence };
        }
        match R::legacy_schema(schema) {
            Some(legacy) if legacy.encoded_size == payload_len => {
                SlotState::Legacy { schema, sequence }
            }
            _ => SlotState::UnknownSchema { schema, sequence },
        }
    }
}
