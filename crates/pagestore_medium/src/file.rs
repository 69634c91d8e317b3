//! File-backed medium holding an EEPROM image.

use crate::error::MediumResult;
use crate::medium::{check_bounds, NonVolatileMedium, ERASED_BYTE};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A medium backed by an image file of fixed size.
///
/// The image is a raw dump of the device's non-volatile memory: byte `n`
/// of the file is address `n` on the medium.
///
/// # Durability
///
/// Every `write` is followed by `File::sync_data()`, so data is on disk
/// once the call returns.
///
/// # Example
///
/// ```no_run
/// use pagestore_medium::{FileMedium, NonVolatileMedium};
/// use std::path::Path;
///
/// let mut medium = FileMedium::open(Path::new("eeprom.bin"), 2048).unwrap();
/// medium.write(0, b"CALI").unwrap();
/// ```
#[derive(Debug)]
pub struct FileMedium {
    path: PathBuf,
    file: Mutex<File>,
    size: u64,
}

impl FileMedium {
    /// Opens or creates an image of `size` bytes at the given path.
    ///
    /// A missing file is created filled with the erased pattern. A file
    /// shorter than `size` is extended with the erased pattern. A longer
    /// file is left untouched but only its first `size` bytes are addressable.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, created or extended.
    pub fn open(path: &Path, size: u64) -> MediumResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let current = file.metadata()?.len();
        if current < size {
            file.seek(SeekFrom::Start(current))?;
            let fill = vec![ERASED_BYTE; (size - current) as usize];
            file.write_all(&fill)?;
            file.sync_all()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            size,
        })
    }

    /// Opens an existing image, using the file length as the medium size.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    pub fn open_existing(path: &Path) -> MediumResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            size,
        })
    }

    /// Returns the path to the image file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NonVolatileMedium for FileMedium {
    fn size(&self) -> u64 {
        self.size
    }

    fn read(&self, offset: u64, len: usize) -> MediumResult<Vec<u8>> {
        check_bounds(offset, len, self.size)?;
        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> MediumResult<()> {
        check_bounds(offset, data.len(), self.size)?;
        if data.is_empty() {
            return Ok(());
        }

        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        file.sync_data()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediumError;
    use tempfile::tempdir;

    #[test]
    fn file_create_new_is_erased() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");

        let medium = FileMedium::open(&path, 64).unwrap();
        assert_eq!(medium.size(), 64);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 64);
        assert_eq!(medium.read(0, 64).unwrap(), vec![ERASED_BYTE; 64]);
    }

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");

        let mut medium = FileMedium::open(&path, 32).unwrap();
        medium.write(10, b"hello").unwrap();

        assert_eq!(medium.read(10, 5).unwrap(), b"hello");
        assert_eq!(medium.read(9, 1).unwrap(), vec![ERASED_BYTE]);
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");

        {
            let mut medium = FileMedium::open(&path, 32).unwrap();
            medium.write(0, b"persistent").unwrap();
        }

        {
            let medium = FileMedium::open_existing(&path).unwrap();
            assert_eq!(medium.size(), 32);
            assert_eq!(medium.read(0, 10).unwrap(), b"persistent");
        }
    }

    #[test]
    fn file_short_image_is_extended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");
        std::fs::write(&path, b"abc").unwrap();

        let medium = FileMedium::open(&path, 8).unwrap();
        assert_eq!(medium.read(0, 8).unwrap(), b"abc\xFF\xFF\xFF\xFF\xFF");
    }

    #[test]
    fn file_out_of_bounds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");

        let mut medium = FileMedium::open(&path, 16).unwrap();
        assert!(matches!(
            medium.read(12, 8),
            Err(MediumError::OutOfBounds { .. })
        ));
        assert!(matches!(
            medium.write(15, b"xy"),
            Err(MediumError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn file_open_existing_missing_fails() {
        let dir = tempdir().unwrap();
        let result = FileMedium::open_existing(&dir.path().join("missing.bin"));
        assert!(matches!(result, Err(MediumError::Io(_))));
    }

    #[test]
    fn file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");
        let medium = FileMedium::open(&path, 4).unwrap();
        assert_eq!(medium.path(), path);
    }
}
