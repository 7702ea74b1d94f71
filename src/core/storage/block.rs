//! Key-value block format for Flash storage
//!
//! ```text
//! [Header 12 B][Entry 40 B × entry_count][CRC32 4 B]
//! ```
//!
//! All integers are little-endian. The CRC covers header and entries.

use geotrack_core::traits::storage::{EntryKey, StoredValue, MAX_ENTRIES};

/// Block magic ("GKVS")
pub const KV_MAGIC: [u8; 4] = *b"GKVS";

/// Block format version
pub const KV_VERSION: u16 = 1;

/// Size of CRC32 field
pub const CRC_SIZE: usize = 4;

/// Bytes reserved for a namespace or key name (NUL padded)
const NAME_FIELD: usize = 16;

/// Block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KvBlockHeader {
    pub magic: [u8; 4],
    pub version: u16,
    /// Incremented on every commit; the newest valid block wins on load
    pub sequence: u16,
    pub entry_count: u16,
    pub reserved: u16,
}

impl KvBlockHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 12;

    pub fn new(sequence: u16, entry_count: u16) -> Self {
        Self {
            magic: KV_MAGIC,
            version: KV_VERSION,
            sequence,
            entry_count,
            reserved: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.magic);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        buf[6..8].copy_from_slice(&self.sequence.to_le_bytes());
        buf[8..10].copy_from_slice(&self.entry_count.to_le_bytes());
        buf[10..12].copy_from_slice(&self.reserved.to_le_bytes());
        buf
    }

    /// Deserialize header, rejecting a wrong magic
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }

        let magic = [buf[0], buf[1], buf[2], buf[3]];
        if magic != KV_MAGIC {
            return None;
        }

        Some(Self {
            magic,
            version: u16::from_le_bytes([buf[4], buf[5]]),
            sequence: u16::from_le_bytes([buf[6], buf[7]]),
            entry_count: u16::from_le_bytes([buf[8], buf[9]]),
            reserved: u16::from_le_bytes([buf[10], buf[11]]),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.magic == KV_MAGIC
            && self.version == KV_VERSION
            && self.entry_count as usize <= MAX_ENTRIES
    }
}

/// Serialized size of one entry
pub const ENTRY_SIZE: usize = NAME_FIELD * 2 + 8;

/// Largest possible block (header, full table, CRC)
pub const MAX_BLOCK_SIZE: usize = KvBlockHeader::SIZE + MAX_ENTRIES * ENTRY_SIZE + CRC_SIZE;

fn write_name(dst: &mut [u8], name: &str) {
    dst[..name.len()].copy_from_slice(name.as_bytes());
}

fn read_name(src: &[u8]) -> Option<&str> {
    let len = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    core::str::from_utf8(&src[..len]).ok()
}

/// Serialize one entry
pub fn encode_entry(key: &EntryKey, value: &StoredValue) -> [u8; ENTRY_SIZE] {
    let mut buf = [0u8; ENTRY_SIZE];
    write_name(&mut buf[0..NAME_FIELD], &key.namespace);
    write_name(&mut buf[NAME_FIELD..NAME_FIELD * 2], &key.key);
    buf[32] = value.type_id();
    buf[36..40].copy_from_slice(&value.raw().to_le_bytes());
    buf
}

/// Deserialize one entry
pub fn decode_entry(buf: &[u8]) -> Option<(EntryKey, StoredValue)> {
    if buf.len() < ENTRY_SIZE {
        return None;
    }
    let namespace = read_name(&buf[0..NAME_FIELD])?;
    let key = read_name(&buf[NAME_FIELD..NAME_FIELD * 2])?;
    let raw = u32::from_le_bytes([buf[36], buf[37], buf[38], buf[39]]);
    let value = StoredValue::from_raw(buf[32], raw)?;
    Some((EntryKey::new(namespace, key).ok()?, value))
}

/// `true` if sequence `a` was written after `b`, tolerating wrap-around
pub fn is_newer(a: u16, b: u16) -> bool {
    (a.wrapping_sub(b) as i16) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = KvBlockHeader::new(7, 5);
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"GKVS");
        assert_eq!(&bytes[6..8], &[7, 0]);
        assert_eq!(KvBlockHeader::from_bytes(&bytes), Some(header));
        assert!(header.is_valid());
    }

    #[test]
    fn test_header_rejects_erased_flash() {
        assert_eq!(KvBlockHeader::from_bytes(&[0xFF; KvBlockHeader::SIZE]), None);
    }

    #[test]
    fn test_entry_encoding() {
        let key = EntryKey::new("geofence", "tx_counter").unwrap();
        let bytes = encode_entry(&key, &StoredValue::U32(0x01020304));

        assert_eq!(&bytes[0..8], b"geofence");
        assert_eq!(bytes[8], 0);
        assert_eq!(&bytes[16..26], b"tx_counter");
        assert_eq!(&bytes[36..40], &[4, 3, 2, 1]);
        assert_eq!(
            decode_entry(&bytes),
            Some((key, StoredValue::U32(0x01020304)))
        );
    }

    #[test]
    fn test_entry_rejects_unknown_type() {
        let key = EntryKey::new("geofence", "joined").unwrap();
        let mut bytes = encode_entry(&key, &StoredValue::Bool(true));
        bytes[32] = 9;
        assert_eq!(decode_entry(&bytes), None);
    }

    #[test]
    fn test_sequence_wraps() {
        assert!(is_newer(2, 1));
        assert!(!is_newer(1, 2));
        assert!(is_newer(0, u16::MAX));
        assert!(!is_newer(5, 5));
    }
}
