//! Slot header format.
//!
//! Every slot starts with a fixed 20-byte little-endian header:
//!
//! ```text
//! 0   code       [u8; 4]
//! 4   version    u8
//! 5   reserved   u8 (0)
//! 6   length     u16   payload bytes following the header
//! 8   sequence   u64
//! 16  crc32      u32   over bytes 0..16 followed by the payload
//! ```
//!
//! The checksum covers header and payload together, so a torn write that
//! leaves a new header in front of an old payload is rejected.

use crate::error::{StoreError, StoreResult};
use crate::schema::SchemaTag;
use crate::types::SequenceNumber;
use bytes::{Buf, BufMut};
use crc32fast::Hasher;
use pagestore_medium::ERASED_BYTE;

/// Size of the slot header in bytes.
pub const HEADER_SIZE: usize = 20;

/// Bytes of the header covered by the checksum.
const CHECKED_PREFIX: usize = 16;

/// Computes a CRC32 (IEEE) checksum over the concatenation of `parts`.
#[must_use]
pub fn compute_crc32(parts: &[&[u8]]) -> u32 {
    let mut hasher = Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// Decoded slot header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader {
    /// Schema of the payload.
    pub schema: SchemaTag,
    /// Reserved byte, written as zero and checksummed as stored.
    pub reserved: u8,
    /// Length of the payload in bytes.
    pub payload_len: u16,
    /// Sequence number of the write.
    pub sequence: SequenceNumber,
    /// Stored checksum.
    pub crc: u32,
}

impl SlotHeader {
    /// Builds a header for `payload` with a freshly computed checksum.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is longer than `u16::MAX` bytes.
    pub fn seal(schema: SchemaTag, sequence: SequenceNumber, payload: &[u8]) -> StoreResult<Self> {
        let payload_len = u16::try_from(payload.len()).map_err(|_| StoreError::RecordSize {
            expected: usize::from(u16::MAX),
            actual: payload.len(),
        })?;
        let mut header = Self {
            schema,
            reserved: 0,
            payload_len,
            sequence,
            crc: 0,
        };
        header.crc = compute_crc32(&[&header.prefix(), payload]);
        Ok(header)
    }

    /// Encodes the header.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..CHECKED_PREFIX].copy_from_slice(&self.prefix());
        out[CHECKED_PREFIX..].copy_from_slice(&self.crc.to_le_bytes());
        out
    }

    /// Decodes a header from the first [`HEADER_SIZE`] bytes of `data`.
    ///
    /// Decoding only parses fields; it does not validate the checksum.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is shorter than a header.
    pub fn decode(data: &[u8]) -> StoreResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(StoreError::decode("slot header too short"));
        }

        let mut buf = &data[..HEADER_SIZE];
        let mut code = [0u8; 4];
        buf.copy_to_slice(&mut code);
        let version = buf.get_u8();
        let reserved = buf.get_u8();
        let payload_len = buf.get_u16_le();
        let sequence = SequenceNumber::new(buf.get_u64_le());
        let crc = buf.get_u32_le();

        Ok(Self {
            schema: SchemaTag::new(code, version),
            reserved,
            payload_len,
            sequence,
            crc,
        })
    }

    /// Returns true if `payload` matches the stored checksum.
    #[must_use]
    pub fn verify(&self, payload: &[u8]) -> bool {
        payload.len() == usize::from(self.payload_len)
            && compute_crc32(&[&self.prefix(), payload]) == self.crc
    }

    /// Returns the checksum the header would need for `payload`.
    #[must_use]
    pub fn expected_crc(&self, payload: &[u8]) -> u32 {
        compute_crc32(&[&self.prefix(), payload])
    }

    /// Returns true if the raw header bytes were never written or were erased.
    #[must_use]
    pub fn is_blank(data: &[u8]) -> bool {
        let header = &data[..data.len().min(HEADER_SIZE)];
        header.iter().all(|&b| b == ERASED_BYTE) || header.iter().all(|&b| b == 0)
    }

    fn prefix(&self) -> [u8; CHECKED_PREFIX] {
        let mut out = [0u8; CHECKED_PREFIX];
        let mut buf = &mut out[..];
        buf.put_slice(&self.schema.code);
        buf.put_u8(self.schema.version);
        buf.put_u8(self.reserved);
        buf.put_u16_le(self.payload_len);
        buf.put_u64_le(self.sequence.as_u64());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> SchemaTag {
        SchemaTag::new(*b"TST1", 1)
    }

    #[test]
    fn header_layout() {
        let header = SlotHeader::seal(tag(), SequenceNumber::new(0x0102), b"abc").unwrap();
        let bytes = header.encode();

        assert_eq!(&bytes[0..4], b"TST1");
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes[5], 0);
        assert_eq!(&bytes[6..8], &[3, 0]);
        assert_eq!(&bytes[8..16], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[16..20], &header.crc.to_le_bytes());
    }

    #[test]
    fn header_decode_matches_seal() {
        let header = SlotHeader::seal(tag(), SequenceNumber::new(9), b"payload").unwrap();
        let decoded = SlotHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
        assert!(decoded.verify(b"payload"));
    }

    #[test]
    fn checksum_covers_payload() {
        let header = SlotHeader::seal(tag(), SequenceNumber::new(1), b"payload").unwrap();
        assert!(!header.verify(b"paylaod"));
        assert!(!header.verify(b"payload!"));
    }

    #[test]
    fn checksum_covers_header() {
        let header = SlotHeader::seal(tag(), SequenceNumber::new(1), b"payload").unwrap();
        let mut bytes = header.encode();
        bytes[9] ^= 0x01;
        let tampered = SlotHeader::decode(&bytes).unwrap();
        assert!(!tampered.verify(b"payload"));
    }

    #[test]
    fn every_header_byte_is_checked() {
        let header = SlotHeader::seal(tag(), SequenceNumber::new(3), b"payload").unwrap();
        for position in 0..HEADER_SIZE {
            for bit in 0..8 {
                let mut bytes = header.encode();
                bytes[position] ^= 1 << bit;
                let tampered = SlotHeader::decode(&bytes).unwrap();
                assert!(
                    !tampered.verify(b"payload"),
                    "flip of bit {bit} in header byte {position} went unnoticed"
                );
            }
        }
    }

    #[test]
    fn header_pairs_with_its_own_payload_only() {
        let old = SlotHeader::seal(tag(), SequenceNumber::new(1), b"old-data").unwrap();
        let new = SlotHeader::seal(tag(), SequenceNumber::new(2), b"new-data").unwrap();
        assert!(!new.verify(b"old-data"));
        assert!(!old.verify(b"new-data"));
    }

    #[test]
    fn blank_detection() {
        assert!(SlotHeader::is_blank(&[ERASED_BYTE; HEADER_SIZE]));
        assert!(SlotHeader::is_blank(&[0; HEADER_SIZE]));

        let header = SlotHeader::seal(tag(), SequenceNumber::new(1), b"").unwrap();
        assert!(!SlotHeader::is_blank(&header.encode()));
    }

    #[test]
    fn decode_short_fails() {
        assert!(SlotHeader::decode(&[0u8; 10]).is_err());
    }

    #[test]
    fn crc_is_deterministic() {
        assert_eq!(compute_crc32(&[b"ab", b"c"]), compute_crc32(&[b"abc"]));
        assert_ne!(compute_crc32(&[b"abc"]), compute_crc32(&[b"abd"]));
    }
}
