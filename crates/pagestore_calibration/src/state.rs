//! Ownership of the in-memory calibration record.

use crate::data::CalibrationData;
use crate::{CALIBRATION_END, CALIBRATION_START};
use pagestore_core::{
    LoadSource, Loaded, PageStorage, PageStorageConfig, SaveReceipt, StoreResult,
};
use pagestore_medium::NonVolatileMedium;
use tracing::{info, warn};

/// Page storage bound to the calibration range.
pub type CalibrationStorage<M> = PageStorage<M, CalibrationData>;

/// Returns the storage configuration for the calibration range.
#[must_use]
pub const fn calibration_config() -> PageStorageConfig {
    PageStorageConfig::new(CALIBRATION_START, CALIBRATION_END)
}

/// The device's calibration: the one in-memory record plus its storage.
///
/// Created once at start-up by [`Calibration::init`], then passed by
/// reference to whatever needs calibration values. Edits through
/// [`Calibration::data_mut`] stay in memory until [`Calibration::save`].
#[derive(Debug)]
pub struct Calibration<M> {
    storage: CalibrationStorage<M>,
    data: CalibrationData,
    source: LoadSource,
}

impl<M: NonVolatileMedium> Calibration<M> {
    /// Binds the calibration range of `medium` and loads the newest record.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium is too small for the calibration
    /// range or cannot be read. A medium without calibration is not an
    /// error; see [`Calibration::needs_calibration`].
    pub fn init(medium: M) -> StoreResult<Self> {
        let storage = CalibrationStorage::new(medium, calibration_config())?;
        Self::from_storage(storage)
    }

    /// Loads the newest record from an already bound storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    pub fn from_storage(storage: CalibrationStorage<M>) -> StoreResult<Self> {
        let Loaded { record, source } = storage.load()?;
        match source {
            LoadSource::Default => warn!("no calibration data found, using defaults"),
            LoadSource::Legacy { schema, .. } => {
                info!(%schema, "calibration loaded from legacy layout");
            }
            LoadSource::Current { sequence, .. } => info!(%sequence, "calibration loaded"),
        }

        Ok(Self {
            storage,
            data: record,
            source,
        })
    }

    /// Returns the calibration record.
    #[must_use]
    pub fn data(&self) -> &CalibrationData {
        &self.data
    }

    /// Returns the calibration record for editing.
    ///
    /// Edits are not persisted until [`Calibration::save`].
    pub fn data_mut(&mut self) -> &mut CalibrationData {
        &mut self.data
    }

    /// Returns where the record was last loaded from or saved to.
    #[must_use]
    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// Returns true if start-up found no stored calibration.
    #[must_use]
    pub fn needs_calibration(&self) -> bool {
        self.source.is_default()
    }

    /// Persists the in-memory record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write failed; the record was not committed
    /// and the previously stored calibration is still intact.
    pub fn save(&mut self) -> StoreResult<SaveReceipt> {
        let receipt = self.storage.save(&self.data)?;
        self.source = LoadSource::Current {
            slot: receipt.slot,
            sequence: receipt.sequence,
        };
        Ok(receipt)
    }

    /// Returns the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &CalibrationStorage<M> {
        &self.storage
    }

    /// Releases the underlying storage.
    #[must_use]
    pub fn into_storage(self) -> CalibrationStorage<M> {
        self.storage
    }
}
