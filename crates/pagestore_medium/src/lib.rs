//! # PageStore Medium
//!
//! Byte-addressable non-volatile medium abstraction for PageStore.
//!
//! This crate provides the lowest-level storage capability used by the
//! PageStore engine. A medium is a **fixed-size byte array** that can be
//! read and written at absolute offsets. It knows nothing about slots,
//! headers, checksums or records.
//!
//! ## Design Principles
//!
//! - Media are plain byte ranges (read, write, size)
//! - No wear-leveling, buffering or validity semantics
//! - Writes are not assumed atomic; a torn write may leave any prefix behind
//! - A write is durable once it returns successfully
//!
//! ## Available Media
//!
//! - [`InMemoryMedium`] - For tests and simulation of an EEPROM chip
//! - [`FileMedium`] - An EEPROM image file on the host file system
//!
//! ## Example
//!
//! ```rust
//! use pagestore_medium::{InMemoryMedium, NonVolatileMedium, ERASED_BYTE};
//!
//! let mut medium = InMemoryMedium::new(64);
//! assert_eq!(medium.read(0, 2).unwrap(), vec![ERASED_BYTE; 2]);
//!
//! medium.write(8, b"cal").unwrap();
//! assert_eq!(medium.read(8, 3).unwrap(), b"cal");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod medium;
mod memory;

pub use error::{MediumError, MediumResult};
pub use file::FileMedium;
pub use medium::{check_bounds, NonVolatileMedium, ERASED_BYTE};
pub use memory::InMemoryMedium;
