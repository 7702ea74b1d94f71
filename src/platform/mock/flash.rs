//! Mock Flash implementation for testing
//!
//! Provides in-memory Flash simulation for unit tests.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use core::cell::RefCell;
use std::vec;
use std::vec::Vec;

/// Flash block size (4 KB)
const BLOCK_SIZE: u32 = 4096;

/// Simulated Flash capacity (512 KB)
const FLASH_CAPACITY: u32 = 512 * 1024;

/// Minimum firmware size (protect first 256 KB)
const FIRMWARE_SIZE: u32 = 0x40000;

/// Mock Flash implementation
///
/// Simulates Flash storage in memory for testing. Supports:
/// - Read/write/erase operations with 1→0 write semantics
/// - Corruption injection for testing recovery
/// - Erase count tracking
/// - Power-loss simulation (next write completes only halfway)
/// - Write failure injection
#[derive(Debug)]
pub struct MockFlash {
    /// Flash storage (initialized to 0xFF - erased state)
    storage: RefCell<Vec<u8>>,
    /// Erase count per block
    erase_counts: RefCell<Vec<u32>>,
    /// Simulated power loss flag
    power_loss: bool,
    /// Fail every write with `FlashError::WriteFailed`
    fail_writes: bool,
}

impl MockFlash {
    /// Create a new mock Flash instance
    pub fn new() -> Self {
        let storage = vec![0xFF; FLASH_CAPACITY as usize];
        let erase_counts = vec![0; (FLASH_CAPACITY / BLOCK_SIZE) as usize];

        Self {
            storage: RefCell::new(storage),
            erase_counts: RefCell::new(erase_counts),
            power_loss: false,
            fail_writes: false,
        }
    }

    /// Get Flash contents (for test verification)
    pub fn get_contents(&self, address: u32, len: usize) -> Vec<u8> {
        let storage = self.storage.borrow();
        storage[address as usize..(address as usize + len)].to_vec()
    }

    /// Overwrite a range with a fixed pattern, bypassing Flash semantics
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        let mut storage = self.storage.borrow_mut();
        for byte in storage[address as usize..address as usize + len].iter_mut() {
            *byte = 0xAA;
        }
    }

    /// Number of times the block containing `address` has been erased
    pub fn get_erase_count(&self, address: u32) -> u32 {
        self.erase_counts.borrow()[(address / BLOCK_SIZE) as usize]
    }

    /// Total erase count across all blocks
    pub fn get_total_erase_count(&self) -> u32 {
        self.erase_counts.borrow().iter().sum()
    }

    /// Make the next write complete only halfway
    pub fn simulate_power_loss(&mut self) {
        self.power_loss = true;
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn is_writable(&self, address: u32) -> bool {
        (FIRMWARE_SIZE..FLASH_CAPACITY).contains(&address)
    }

    fn in_bounds(address: u32, len: usize) -> bool {
        address as usize + len <= FLASH_CAPACITY as usize
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        if !Self::in_bounds(address, buf.len()) {
            return Err(FlashError::InvalidAddress.into());
        }

        let storage = self.storage.borrow();
        buf.copy_from_slice(&storage[address as usize..(address as usize + buf.len())]);
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if !self.is_writable(address) || !Self::in_bounds(address, data.len()) {
            return Err(FlashError::InvalidAddress.into());
        }
        if self.fail_writes {
            return Err(FlashError::WriteFailed.into());
        }

        let write_len = if self.power_loss {
            self.power_loss = false;
            data.len() / 2
        } else {
            data.len()
        };

        // Flash can only change bits from 1→0
        let mut storage = self.storage.borrow_mut();
        let start = address as usize;
        for (cell, byte) in storage[start..start + write_len].iter_mut().zip(data) {
            *cell &= *byte;
        }

        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if !self.is_writable(address)
            || address % BLOCK_SIZE != 0
            || size % BLOCK_SIZE != 0
            || !Self::in_bounds(address, size as usize)
        {
            return Err(FlashError::InvalidAddress.into());
        }

        let mut storage = self.storage.borrow_mut();
        for byte in storage[address as usize..(address + size) as usize].iter_mut() {
            *byte = 0xFF;
        }

        let start_block = (address / BLOCK_SIZE) as usize;
        let mut erase_counts = self.erase_counts.borrow_mut();
        for count in erase_counts[start_block..start_block + (size / BLOCK_SIZE) as usize].iter_mut()
        {
            *count += 1;
        }

        Ok(())
    }

    fn block_size(&self) -> u32 {
        BLOCK_SIZE
    }

    fn capacity(&self) -> u32 {
        FLASH_CAPACITY
    }
}
