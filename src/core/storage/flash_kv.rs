//! Flash-backed key-value store
//!
//! Implements [`KeyValueStore`] on top of a [`FlashInterface`] using two
//! alternating blocks. Writes are buffered in RAM while a namespace is open
//! and committed as one complete block on `close()`, so a power cut during
//! a commit leaves the previous block intact.
//!
//! # Flash Layout
//!
//! ```text
//! [KV Block 0]  0x040000 - 0x041000 (4 KB)
//! [KV Block 1]  0x041000 - 0x042000 (4 KB)
//! ```

use geotrack_core::traits::storage::{
    EntryKey, EntryTable, KeyValueStore, OpenMode, StorageError, StoredValue, MAX_ENTRIES,
};
use heapless::Vec;

use super::block::{
    decode_entry, encode_entry, is_newer, KvBlockHeader, CRC_SIZE, ENTRY_SIZE, MAX_BLOCK_SIZE,
};
use super::crc::{calculate_crc32, validate_crc32};
use crate::platform::{FlashError, FlashInterface, Result};

/// Flash block addresses used by the store
pub const KV_BLOCK_ADDRESSES: [u32; 2] = [0x040000, 0x041000];

const NUM_BLOCKS: usize = KV_BLOCK_ADDRESSES.len();

type Entries = Vec<(EntryKey, StoredValue), MAX_ENTRIES>;

/// Key-value store persisted to Flash
pub struct FlashKvStore<F: FlashInterface> {
    flash: F,
    table: EntryTable,
    /// Block holding the newest committed data
    active_block: Option<u8>,
    sequence: u16,
    /// Uncommitted writes pending
    dirty: bool,
}

impl<F: FlashInterface> FlashKvStore<F> {
    /// Create a store and load the newest valid block
    ///
    /// Blank or corrupted Flash yields an empty store.
    pub fn new(flash: F) -> Self {
        let mut store = Self {
            flash,
            table: EntryTable::new(),
            active_block: None,
            sequence: 0,
            dirty: false,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let mut newest: Option<(u8, u16, Entries)> = None;

        for block_id in 0..NUM_BLOCKS as u8 {
            match self.read_block(block_id) {
                Ok((header, entries)) => {
                    let replace = match &newest {
                        Some((_, seq, _)) => is_newer(header.sequence, *seq),
                        None => true,
                    };
                    if replace {
                        newest = Some((block_id, header.sequence, entries));
                    }
                }
                Err(_) => {
                    crate::log_debug!("KV block {} not usable", block_id);
                }
            }
        }

        match newest {
            Some((block_id, sequence, entries)) => {
                for (key, value) in entries {
                    // Capacity matches MAX_ENTRIES, so this cannot overflow
                    let _ = self.table.insert_raw(key, value);
                }
                self.active_block = Some(block_id);
                self.sequence = sequence;
                crate::log_info!(
                    "KV store loaded block {} (seq {}, {} entries)",
                    block_id,
                    sequence,
                    self.table.len()
                );
            }
            None => {
                crate::log_info!("KV store empty, no valid block");
            }
        }
    }

    /// Read and validate one block
    ///
    /// # Errors
    ///
    /// `FlashError::Corrupted` for a bad magic, version, entry or CRC.
    pub fn read_block(&mut self, block_id: u8) -> Result<(KvBlockHeader, Entries)> {
        let address = *KV_BLOCK_ADDRESSES
            .get(block_id as usize)
            .ok_or(FlashError::InvalidAddress)?;

        let mut header_buf = [0u8; KvBlockHeader::SIZE];
        self.flash.read(address, &mut header_buf)?;
        let header = KvBlockHeader::from_bytes(&header_buf).ok_or(FlashError::Corrupted)?;
        if !header.is_valid() {
            return Err(FlashError::Corrupted.into());
        }

        let data_len = header.entry_count as usize * ENTRY_SIZE;
        let mut data = Vec::<u8, MAX_BLOCK_SIZE>::new();
        data.extend_from_slice(&header_buf)
            .map_err(|_| FlashError::ReadFailed)?;
        data.resize(KvBlockHeader::SIZE + data_len, 0)
            .map_err(|_| FlashError::ReadFailed)?;
        self.flash
            .read(address + KvBlockHeader::SIZE as u32, &mut data[KvBlockHeader::SIZE..])?;

        let mut crc_buf = [0u8; CRC_SIZE];
        self.flash.read(address + data.len() as u32, &mut crc_buf)?;
        if !validate_crc32(&data, u32::from_le_bytes(crc_buf)) {
            return Err(FlashError::Corrupted.into());
        }

        let mut entries = Entries::new();
        for chunk in data[KvBlockHeader::SIZE..].chunks_exact(ENTRY_SIZE) {
            let entry = decode_entry(chunk).ok_or(FlashError::Corrupted)?;
            entries.push(entry).map_err(|_| FlashError::Corrupted)?;
        }

        Ok((header, entries))
    }

    /// Write the current table to the next block in rotation
    pub fn commit(&mut self) -> Result<()> {
        let block_id = match self.active_block {
            Some(current) => (current + 1) % NUM_BLOCKS as u8,
            None => 0,
        };
        let sequence = self.sequence.wrapping_add(1);
        let address = KV_BLOCK_ADDRESSES[block_id as usize];

        let header = KvBlockHeader::new(sequence, self.table.len() as u16);
        let mut data = Vec::<u8, MAX_BLOCK_SIZE>::new();
        data.extend_from_slice(&header.to_bytes())
            .map_err(|_| FlashError::WriteFailed)?;
        for (key, value) in self.table.iter() {
            data.extend_from_slice(&encode_entry(key, value))
                .map_err(|_| FlashError::WriteFailed)?;
        }
        let crc = calculate_crc32(&data);
        data.extend_from_slice(&crc.to_le_bytes())
            .map_err(|_| FlashError::WriteFailed)?;

        self.flash.erase(address, self.flash.block_size())?;
        self.flash.write(address, &data)?;

        self.active_block = Some(block_id);
        self.sequence = sequence;
        self.dirty = false;
        crate::log_debug!("KV store committed block {} (seq {})", block_id, sequence);
        Ok(())
    }

    /// Block holding the newest committed data
    pub fn active_block(&self) -> Option<u8> {
        self.active_block
    }

    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Get Flash interface reference (for testing)
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the Flash device
    pub fn into_flash(self) -> F {
        self.flash
    }
}

impl<F: FlashInterface> KeyValueStore for FlashKvStore<F> {
    fn open(&mut self, namespace: &str, mode: OpenMode) -> core::result::Result<(), StorageError> {
        self.table.open(namespace, mode)
    }

    fn close(&mut self) -> core::result::Result<(), StorageError> {
        let mode = self.table.open_mode();
        if !self.table.release() {
            return Err(StorageError::NotOpen);
        }
        if mode == Some(OpenMode::ReadWrite) && self.dirty {
            self.commit().map_err(|e| {
                crate::log_warn!("KV store commit failed: {}", e);
                StorageError::Backend
            })?;
        }
        Ok(())
    }

    fn get_bool(&self, key: &str) -> core::result::Result<Option<bool>, StorageError> {
        self.table.get_bool(key)
    }

    fn put_bool(&mut self, key: &str, value: bool) -> core::result::Result<(), StorageError> {
        self.table.put(key, StoredValue::Bool(value))?;
        self.dirty = true;
        Ok(())
    }

    fn get_u32(&self, key: &str) -> core::result::Result<Option<u32>, StorageError> {
        self.table.get_u32(key)
    }

    fn put_u32(&mut self, key: &str, value: u32) -> core::result::Result<(), StorageError> {
        self.table.put(key, StoredValue::U32(value))?;
        self.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;
    use geotrack_core::traits::StoreHandle;

    fn write_session(store: &mut FlashKvStore<MockFlash>, tx: u32) {
        let mut handle = StoreHandle::open(store, "geofence", OpenMode::ReadWrite).unwrap();
        handle.put_bool("joined", true).unwrap();
        handle.put_u32("tx_counter", tx).unwrap();
        handle.close().unwrap();
    }

    fn read_tx(store: &mut FlashKvStore<MockFlash>) -> Option<u32> {
        let handle = StoreHandle::open(store, "geofence", OpenMode::ReadOnly).unwrap();
        handle.get_u32("tx_counter").unwrap()
    }

    #[test]
    fn test_blank_flash_is_empty() {
        let mut store = FlashKvStore::new(MockFlash::new());
        assert_eq!(store.active_block(), None);
        assert_eq!(read_tx(&mut store), None);
    }

    #[test]
    fn test_values_survive_reload() {
        let mut store = FlashKvStore::new(MockFlash::new());
        write_session(&mut store, 42);

        let mut reloaded = FlashKvStore::new(store.into_flash());
        assert_eq!(read_tx(&mut reloaded), Some(42));
        let handle = StoreHandle::open(&mut reloaded, "geofence", OpenMode::ReadOnly).unwrap();
        assert_eq!(handle.get_bool("joined"), Ok(Some(true)));
    }

    #[test]
    fn test_commits_alternate_blocks() {
        let mut store = FlashKvStore::new(MockFlash::new());
        write_session(&mut store, 1);
        assert_eq!(store.active_block(), Some(0));
        write_session(&mut store, 2);
        assert_eq!(store.active_block(), Some(1));
        write_session(&mut store, 3);
        assert_eq!(store.active_block(), Some(0));
        assert_eq!(store.sequence(), 3);

        let mut reloaded = FlashKvStore::new(store.into_flash());
        assert_eq!(read_tx(&mut reloaded), Some(3));
        assert_eq!(reloaded.active_block(), Some(0));
    }

    #[test]
    fn test_read_only_close_does_not_commit() {
        let mut store = FlashKvStore::new(MockFlash::new());
        write_session(&mut store, 1);
        let erases = store.flash_mut().get_total_erase_count();

        read_tx(&mut store);
        assert_eq!(store.flash_mut().get_total_erase_count(), erases);
    }

    #[test]
    fn test_corrupted_newest_block_falls_back() {
        let mut store = FlashKvStore::new(MockFlash::new());
        write_session(&mut store, 1);
        write_session(&mut store, 2);

        let mut flash = store.into_flash();
        flash.inject_corruption(KV_BLOCK_ADDRESSES[1] + KvBlockHeader::SIZE as u32, 4);

        let mut reloaded = FlashKvStore::new(flash);
        assert_eq!(reloaded.active_block(), Some(0));
        assert_eq!(read_tx(&mut reloaded), Some(1));
    }

    #[test]
    fn test_power_loss_during_commit_keeps_previous_block() {
        let mut store = FlashKvStore::new(MockFlash::new());
        write_session(&mut store, 1);

        store.flash_mut().simulate_power_loss();
        write_session(&mut store, 2);

        let mut reloaded = FlashKvStore::new(store.into_flash());
        assert_eq!(read_tx(&mut reloaded), Some(1));
    }

    #[test]
    fn test_commit_failure_reports_backend_and_releases() {
        let mut store = FlashKvStore::new(MockFlash::new());
        store.flash_mut().set_fail_writes(true);

        let mut handle = StoreHandle::open(&mut store, "geofence", OpenMode::ReadWrite).unwrap();
        handle.put_u32("total_tx", 5).unwrap();
        assert_eq!(handle.close(), Err(StorageError::Backend));

        // Namespace was released; the value is still readable from RAM
        assert_eq!(read_tx(&mut store), None);
        let handle = StoreHandle::open(&mut store, "geofence", OpenMode::ReadOnly).unwrap();
        assert_eq!(handle.get_u32("total_tx"), Ok(Some(5)));
    }
}
