//! Persisted session record
//!
//! Stored in namespace `"geofence"`:
//!
//! | Key          | Type | Meaning                        |
//! |--------------|------|--------------------------------|
//! | `joined`     | bool | network session established    |
//! | `tx_counter` | u32  | successful uplinks (frame seq) |
//! | `total_tx`   | u32  | uplink attempts                |
//! | `success_tx` | u32  | successful uplinks             |
//! | `failed_tx`  | u32  | failed uplinks                 |

use geotrack_core::traits::{KeyValueStore, OpenMode, StorageError, StoreHandle};

use super::stats::Statistics;

/// Namespace holding the session record
pub const SESSION_NAMESPACE: &str = "geofence";

pub const KEY_JOINED: &str = "joined";
pub const KEY_TX_COUNTER: &str = "tx_counter";
pub const KEY_TOTAL_TX: &str = "total_tx";
pub const KEY_SUCCESS_TX: &str = "success_tx";
pub const KEY_FAILED_TX: &str = "failed_tx";

/// Durable part of the connectivity session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub joined: bool,
    pub tx_counter: u32,
    pub total_tx: u32,
    pub success_tx: u32,
    pub failed_tx: u32,
}

impl SessionSnapshot {
    /// Read the record; missing fields take their zero value
    pub fn load<S: KeyValueStore>(store: &mut S) -> Result<Self, StorageError> {
        let handle = StoreHandle::open(store, SESSION_NAMESPACE, OpenMode::ReadOnly)?;
        let snapshot = Self {
            joined: handle.get_bool(KEY_JOINED)?.unwrap_or(false),
            tx_counter: handle.get_u32(KEY_TX_COUNTER)?.unwrap_or(0),
            total_tx: handle.get_u32(KEY_TOTAL_TX)?.unwrap_or(0),
            success_tx: handle.get_u32(KEY_SUCCESS_TX)?.unwrap_or(0),
            failed_tx: handle.get_u32(KEY_FAILED_TX)?.unwrap_or(0),
        };
        handle.close()?;
        Ok(snapshot)
    }

    /// Write every field, then commit
    ///
    /// The namespace is released even if a field write fails.
    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<(), StorageError> {
        let mut handle = StoreHandle::open(store, SESSION_NAMESPACE, OpenMode::ReadWrite)?;
        handle.put_bool(KEY_JOINED, self.joined)?;
        handle.put_u32(KEY_TX_COUNTER, self.tx_counter)?;
        handle.put_u32(KEY_TOTAL_TX, self.total_tx)?;
        handle.put_u32(KEY_SUCCESS_TX, self.success_tx)?;
        handle.put_u32(KEY_FAILED_TX, self.failed_tx)?;
        handle.close()
    }

    /// Statistics restored from the record (join attempts start at zero)
    pub fn statistics(&self) -> Statistics {
        Statistics {
            total_tx: self.total_tx,
            success_tx: self.success_tx,
            failed_tx: self.failed_tx,
            join_attempts: 0,
        }
    }
}
