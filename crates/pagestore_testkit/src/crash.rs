//! Fault injection for media.
//!
//! [`CrashableMedium`] models a power loss in the middle of a write: once a
//! byte budget is used up, the write in progress stores only its prefix and
//! fails, and every later write fails until [`CrashableMedium::reset`].
//!
//! [`FaultyMedium`] fails reads or writes on demand and records the offset
//! of every write it passes through.
//!
//! ## Usage
//!
//! ```rust
//! use pagestore_medium::{InMemoryMedium, NonVolatileMedium};
//! use pagestore_testkit::crash::CrashableMedium;
//!
//! let chip = InMemoryMedium::new(16);
//! let mut medium = CrashableMedium::new(chip.clone());
//! medium.crash_after(3);
//! assert!(medium.write(0, b"hello").is_err());
//! assert_eq!(chip.read(0, 5).unwrap(), b"hel\xFF\xFF");
//! ```

use pagestore_medium::{MediumError, MediumResult, NonVolatileMedium};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A medium wrapper that can simulate a power loss mid-write.
#[derive(Debug)]
pub struct CrashableMedium<M> {
    inner: M,
    crash_after_bytes: AtomicUsize,
    bytes_written: AtomicUsize,
    crashed: AtomicBool,
}

impl<M: NonVolatileMedium> CrashableMedium<M> {
    /// Wraps a medium. No crash is armed.
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            crash_after_bytes: AtomicUsize::new(usize::MAX),
            bytes_written: AtomicUsize::new(0),
            crashed: AtomicBool::new(false),
        }
    }

    /// Arms a crash once `bytes` more bytes have been written.
    pub fn crash_after(&self, bytes: usize) {
        self.bytes_written.store(0, Ordering::SeqCst);
        self.crash_after_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Disarms the crash and brings the medium back up.
    pub fn reset(&self) {
        self.crash_after_bytes.store(usize::MAX, Ordering::SeqCst);
        self.bytes_written.store(0, Ordering::SeqCst);
        self.crashed.store(false, Ordering::SeqCst);
    }

    /// Returns whether a crash has happened.
    pub fn has_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    /// Returns the wrapped medium.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Unwraps the medium.
    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: NonVolatileMedium> NonVolatileMedium for CrashableMedium<M> {
    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn read(&self, offset: u64, len: usize) -> MediumResult<Vec<u8>> {
        self.inner.read(offset, len)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> MediumResult<()> {
        if self.has_crashed() {
            return Err(MediumError::fault("medium lost power"));
        }

        let current = self.bytes_written.fetch_add(data.len(), Ordering::SeqCst);
        let threshold = self.crash_after_bytes.load(Ordering::SeqCst);

        if current.saturating_add(data.len()) > threshold {
            self.crashed.store(true, Ordering::SeqCst);
            let partial_len = threshold.saturating_sub(current);
            if partial_len > 0 {
                self.inner.write(offset, &data[..partial_len])?;
            }
            return Err(MediumError::fault("simulated power loss during write"));
        }

        self.inner.write(offset, data)
    }
}

/// A medium wrapper that fails on demand and logs writes.
#[derive(Debug)]
pub struct FaultyMedium<M> {
    inner: M,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: Mutex<Vec<(u64, usize)>>,
}

impl<M: NonVolatileMedium> FaultyMedium<M> {
    /// Wraps a medium. No faults are armed.
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Sets whether reads fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Sets whether writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns `(offset, len)` of every successful write, oldest first.
    pub fn writes(&self) -> Vec<(u64, usize)> {
        self.writes.lock().clone()
    }

    /// Returns the wrapped medium.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: NonVolatileMedium> NonVolatileMedium for FaultyMedium<M> {
    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn read(&self, offset: u64, len: usize) -> MediumResult<Vec<u8>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(MediumError::fault("simulated read fault"));
        }
        self.inner.read(offset, len)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> MediumResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MediumError::fault("simulated write fault"));
        }
        self.inner.write(offset, data)?;
        self.writes.lock().push((offset, data.len()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestore_medium::InMemoryMedium;

    #[test]
    fn crash_writes_prefix_only() {
        let chip = InMemoryMedium::new(8);
        let mut medium = CrashableMedium::new(chip.clone());
        medium.write(0, b"ab").unwrap();

        medium.crash_after(1);
        assert!(medium.write(2, b"cd").is_err());
        assert!(medium.has_crashed());
        assert_eq!(chip.read(0, 4).unwrap(), b"abc\xFF");
    }

    #[test]
    fn crashed_medium_rejects_writes_until_reset() {
        let mut medium = CrashableMedium::new(InMemoryMedium::new(8));
        medium.crash_after(0);
        assert!(medium.write(0, b"x").is_err());
        assert!(medium.write(1, b"y").is_err());

        medium.reset();
        medium.write(1, b"y").unwrap();
        assert_eq!(medium.read(0, 2).unwrap(), b"\xFFy");
    }

    #[test]
    fn write_within_budget_succeeds() {
        let mut medium = CrashableMedium::new(InMemoryMedium::new(8));
        medium.crash_after(4);
        medium.write(0, b"abcd").unwrap();
        assert!(!medium.has_crashed());
        assert!(medium.write(4, b"e").is_err());
    }

    #[test]
    fn faulty_logs_and_fails() {
        let mut medium = FaultyMedium::new(InMemoryMedium::new(8));
        medium.write(2, b"ab").unwrap();
        assert_eq!(medium.writes(), vec![(2, 2)]);

        medium.set_fail_writes(true);
        assert!(medium.write(0, b"z").is_err());
        assert_eq!(medium.writes().len(), 1);

        medium.set_fail_reads(true);
        assert!(medium.read(0, 1).is_err());
    }
}
