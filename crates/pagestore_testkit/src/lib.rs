//! # PageStore Testkit
//!
//! Test utilities for PageStore.
//!
//! This crate provides:
//! - Fault-injecting media (torn writes, failing reads and writes)
//! - Corruption helpers for damaging slots in place
//! - The `TST1` test record and storage fixtures
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use pagestore_testkit::prelude::*;
//!
//! let (chip, mut storage) = test_storage(4);
//! storage.save(&TestRecord::new(1, 0)).unwrap();
//! assert_eq!(storage.load().unwrap().record.counter, 1);
//! assert_eq!(chip.len(), 4 * TEST_SLOT_SIZE);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
