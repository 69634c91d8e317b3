//! # PageStore Core
//!
//! Wear-leveled record storage over a byte-addressable non-volatile medium.
//!
//! This crate provides:
//! - [`PageStorage`], which splits a reserved address range into equal slots
//!   and rotates writes across them
//! - The slot header format (schema tag, sequence number, CRC32)
//! - The [`Record`] trait implemented by fixed-layout record types
//! - Legacy schema upgrade hooks
//!
//! ## Example
//!
//! ```rust
//! use pagestore_core::{PageStorage, PageStorageConfig, Record, SchemaTag, StoreResult};
//! use pagestore_medium::InMemoryMedium;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Counter(u32);
//!
//! impl Record for Counter {
//!     const SCHEMA: SchemaTag = SchemaTag::new(*b"CNTR", 1);
//!     const ENCODED_SIZE: usize = 4;
//!
//!     fn encode(&self, buf: &mut Vec<u8>) {
//!         buf.extend_from_slice(&self.0.to_le_bytes());
//!     }
//!
//!     fn decode(payload: &[u8]) -> StoreResult<Self> {
//!         Ok(Self(u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]])))
//!     }
//! }
//!
//! let medium = InMemoryMedium::new(256);
//! let config = PageStorageConfig::new(0, 96);
//! let mut storage: PageStorage<_, Counter> = PageStorage::new(medium, config).unwrap();
//!
//! assert!(storage.load().unwrap().source.is_default());
//! storage.save(&Counter(7)).unwrap();
//! assert_eq!(storage.load().unwrap().record, Counter(7));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod header;
mod schema;
mod storage;
mod types;

pub use config::PageStorageConfig;
pub use error::{StoreError, StoreResult};
pub use header::{compute_crc32, SlotHeader, HEADER_SIZE};
pub use schema::{LegacySchema, Record, SchemaTag};
pub use storage::{
    LoadSource, Loaded, PageStorage, SaveReceipt, SlotFault, SlotInfo, SlotState,
};
pub use types::SequenceNumber;

/// Re-export of the medium crate for convenience.
pub use pagestore_medium as medium;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
