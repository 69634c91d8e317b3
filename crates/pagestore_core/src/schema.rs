//! Schema tags and the record trait.

use crate::error::StoreResult;
use std::fmt;

/// Identity of a record layout: a four-symbol code plus a version.
///
/// The engine compares tags for equality only. It never looks inside a
/// payload to guess its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaTag {
    /// Four-symbol code, e.g. `*b"CALI"`.
    pub code: [u8; 4],
    /// Layout version under that code.
    pub version: u8,
}

impl SchemaTag {
    /// Creates a new schema tag.
    #[must_use]
    pub const fn new(code: [u8; 4], version: u8) -> Self {
        Self { code, version }
    }
}

impl fmt::Display for SchemaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.code {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        write!(f, "/{}", self.version)
    }
}

/// A layout that older firmware wrote and that can still be read.
///
/// `upgrade` receives exactly `encoded_size` payload bytes and returns the
/// record in the current layout, with fields the legacy layout lacked set to
/// their defaults.
pub struct LegacySchema<R> {
    /// Tag the legacy layout was stored under.
    pub tag: SchemaTag,
    /// Payload size of the legacy layout.
    pub encoded_size: usize,
    /// Decodes a legacy payload into the current record type.
    pub upgrade: fn(&[u8]) -> StoreResult<R>,
}

impl<R> fmt::Debug for LegacySchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacySchema")
            .field("tag", &self.tag)
            .field("encoded_size", &self.encoded_size)
            .finish_non_exhaustive()
    }
}

/// A fixed-layout record persisted by [`crate::PageStorage`].
///
/// The `Default` value is what `load` returns when no slot holds a valid
/// record, so it should describe a neutral, usable configuration.
///
/// # Invariants
///
/// - `encode` appends exactly `ENCODED_SIZE` bytes
/// - `decode` receives exactly `ENCODED_SIZE` bytes
/// - bumping `SCHEMA.version` is required whenever the layout changes in a
///   way that is not purely additive with zero defaults
pub trait Record: Default + Sized + 'static {
    /// Tag written with every record of the current layout.
    const SCHEMA: SchemaTag;

    /// Size of the encoded payload in bytes.
    const ENCODED_SIZE: usize;

    /// Legacy layouts this build can still read.
    const LEGACY: &'static [LegacySchema<Self>] = &[];

    /// Appends the encoded record to `buf`.
    fn encode(&self, buf: &mut Vec<u8>);

    /// Decodes a record from its payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload holds values the layout forbids.
    fn decode(payload: &[u8]) -> StoreResult<Self>;

    /// Looks up a legacy layout by tag.
    #[must_use]
    fn legacy_schema(tag: SchemaTag) -> Option<&'static LegacySchema<Self>> {
        Self::LEGACY.iter().find(|legacy| legacy.tag == tag)
    }
}
