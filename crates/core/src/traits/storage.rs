//! Namespaced key-value storage capability
//!
//! Mirrors the NVS/"Preferences" model used on the tracker: a store is opened
//! on one namespace, fields are read or written, and the store is closed
//! again. [`StoreHandle`] scopes that sequence so the store is always
//! released, including when a field write fails halfway through.

use core::fmt;

use heapless::{FnvIndexMap, String};

/// Maximum namespace length in bytes (NVS limit)
pub const MAX_NAMESPACE_LEN: usize = 15;

/// Maximum key length in bytes (NVS limit)
pub const MAX_KEY_LEN: usize = 15;

/// Maximum number of entries across all namespaces
pub const MAX_ENTRIES: usize = 32;

/// Errors from key-value storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Namespace or key is empty or too long
    InvalidName,
    /// Operation requires an open namespace
    NotOpen,
    /// A namespace is already open on this store
    AlreadyOpen,
    /// Write attempted on a read-only handle
    ReadOnly,
    /// Entry exists with a different type
    TypeMismatch,
    /// No room for another entry
    Full,
    /// Underlying medium failed
    Backend,
}

impl StorageError {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageError::InvalidName => "invalid namespace or key",
            StorageError::NotOpen => "store not open",
            StorageError::AlreadyOpen => "store already open",
            StorageError::ReadOnly => "store opened read-only",
            StorageError::TypeMismatch => "stored value has a different type",
            StorageError::Full => "store full",
            StorageError::Backend => "storage backend failure",
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access mode for [`KeyValueStore::open`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// Namespaced key-value store
///
/// At most one namespace is open at a time. Prefer [`StoreHandle`] over
/// calling `open`/`close` directly.
pub trait KeyValueStore {
    fn open(&mut self, namespace: &str, mode: OpenMode) -> Result<(), StorageError>;

    /// Release the open namespace, committing pending writes.
    ///
    /// The namespace is released even when the commit fails.
    fn close(&mut self) -> Result<(), StorageError>;

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError>;

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError>;

    fn get_u32(&self, key: &str) -> Result<Option<u32>, StorageError>;

    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StorageError>;
}

/// Open namespace on a [`KeyValueStore`], closed on drop
pub struct StoreHandle<'a, S: KeyValueStore> {
    store: &'a mut S,
    closed: bool,
}

impl<'a, S: KeyValueStore> StoreHandle<'a, S> {
    pub fn open(store: &'a mut S, namespace: &str, mode: OpenMode) -> Result<Self, StorageError> {
        store.open(namespace, mode)?;
        Ok(Self {
            store,
            closed: false,
        })
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError> {
        self.store.get_bool(key)
    }

    pub fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        self.store.put_bool(key, value)
    }

    pub fn get_u32(&self, key: &str) -> Result<Option<u32>, StorageError> {
        self.store.get_u32(key)
    }

    pub fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StorageError> {
        self.store.put_u32(key, value)
    }

    /// Close explicitly and observe the commit result
    pub fn close(mut self) -> Result<(), StorageError> {
        self.closed = true;
        self.store.close()
    }
}

impl<S: KeyValueStore> Drop for StoreHandle<'_, S> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.store.close();
        }
    }
}

// ============================================================================
// Entry table shared by store implementations
// ============================================================================

/// Typed value held in a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredValue {
    Bool(bool),
    U32(u32),
}

impl StoredValue {
    /// Type discriminant used by serialized formats
    pub fn type_id(&self) -> u8 {
        match self {
            StoredValue::Bool(_) => 0,
            StoredValue::U32(_) => 1,
        }
    }

    /// Raw 32-bit representation used by serialized formats
    pub fn raw(&self) -> u32 {
        match self {
            StoredValue::Bool(b) => u32::from(*b),
            StoredValue::U32(v) => *v,
        }
    }

    /// Rebuild a value from its discriminant and raw bits
    pub fn from_raw(type_id: u8, raw: u32) -> Option<Self> {
        match type_id {
            0 => Some(StoredValue::Bool(raw != 0)),
            1 => Some(StoredValue::U32(raw)),
            _ => None,
        }
    }
}

/// Fully-qualified entry name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub namespace: String<MAX_NAMESPACE_LEN>,
    pub key: String<MAX_KEY_LEN>,
}

impl EntryKey {
    pub fn new(namespace: &str, key: &str) -> Result<Self, StorageError> {
        if namespace.is_empty() || key.is_empty() {
            return Err(StorageError::InvalidName);
        }
        let mut ns = String::new();
        ns.push_str(namespace)
            .map_err(|_| StorageError::InvalidName)?;
        let mut k = String::new();
        k.push_str(key).map_err(|_| StorageError::InvalidName)?;
        Ok(Self { namespace: ns, key: k })
    }
}

/// In-memory entry map with open-namespace bookkeeping
///
/// Backends embed this and add their own medium handling.
#[derive(Debug, Default)]
pub struct EntryTable {
    entries: FnvIndexMap<EntryKey, StoredValue, MAX_ENTRIES>,
    open: Option<(String<MAX_NAMESPACE_LEN>, OpenMode)>,
}

impl EntryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, namespace: &str, mode: OpenMode) -> Result<(), StorageError> {
        if self.open.is_some() {
            return Err(StorageError::AlreadyOpen);
        }
        if namespace.is_empty() {
            return Err(StorageError::InvalidName);
        }
        let mut ns = String::new();
        ns.push_str(namespace)
            .map_err(|_| StorageError::InvalidName)?;
        self.open = Some((ns, mode));
        Ok(())
    }

    /// Release the namespace; returns whether one was open
    pub fn release(&mut self) -> bool {
        self.open.take().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_mode(&self) -> Option<OpenMode> {
        self.open.as_ref().map(|(_, mode)| *mode)
    }

    fn entry_key(&self, key: &str) -> Result<EntryKey, StorageError> {
        let (namespace, _) = self.open.as_ref().ok_or(StorageError::NotOpen)?;
        EntryKey::new(namespace, key)
    }

    pub fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let key = self.entry_key(key)?;
        Ok(self.entries.get(&key).copied())
    }

    pub fn put(&mut self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        let key = self.entry_key(key)?;
        if self.open_mode() == Some(OpenMode::ReadOnly) {
            return Err(StorageError::ReadOnly);
        }
        self.entries
            .insert(key, value)
            .map_err(|_| StorageError::Full)?;
        Ok(())
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError> {
        match self.get(key)? {
            Some(StoredValue::Bool(b)) => Ok(Some(b)),
            Some(_) => Err(StorageError::TypeMismatch),
            None => Ok(None),
        }
    }

    pub fn get_u32(&self, key: &str) -> Result<Option<u32>, StorageError> {
        match self.get(key)? {
            Some(StoredValue::U32(v)) => Ok(Some(v)),
            Some(_) => Err(StorageError::TypeMismatch),
            None => Ok(None),
        }
    }

    /// Insert without an open namespace (used when loading from a medium)
    pub fn insert_raw(&mut self, key: EntryKey, value: StoredValue) -> Result<(), StorageError> {
        self.entries
            .insert(key, value)
            .map_err(|_| StorageError::Full)?;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntryKey, &StoredValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Write-through in-memory store for host tests
///
/// Counts open/close pairs so tests can assert the store is always released,
/// and can be told to fail writes to check that release still happens.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: EntryTable,
    open_count: u32,
    close_count: u32,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent put fail with [`StorageError::Backend`]
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn is_open(&self) -> bool {
        self.table.is_open()
    }

    pub fn open_count(&self) -> u32 {
        self.open_count
    }

    pub fn close_count(&self) -> u32 {
        self.close_count
    }

    /// Read a value without opening the store (test inspection)
    pub fn peek(&self, namespace: &str, key: &str) -> Option<StoredValue> {
        let key = EntryKey::new(namespace, key).ok()?;
        self.table.iter().find(|(k, _)| **k == key).map(|(_, v)| *v)
    }

    fn put(&mut self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend);
        }
        self.table.put(key, value)
    }
}

impl KeyValueStore for MemoryStore {
    fn open(&mut self, namespace: &str, mode: OpenMode) -> Result<(), StorageError> {
        self.table.open(namespace, mode)?;
        self.open_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        if self.table.release() {
            self.close_count += 1;
            Ok(())
        } else {
            Err(StorageError::NotOpen)
        }
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError> {
        self.table.get_bool(key)
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        self.put(key, StoredValue::Bool(value))
    }

    fn get_u32(&self, key: &str) -> Result<Option<u32>, StorageError> {
        self.table.get_u32(key)
    }

    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StorageError> {
        self.put(key, StoredValue::U32(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_round_trip() {
        let mut store = MemoryStore::new();
        {
            let mut handle = StoreHandle::open(&mut store, "geofence", OpenMode::ReadWrite).unwrap();
            handle.put_bool("joined", true).unwrap();
            handle.put_u32("tx_counter", 7).unwrap();
            handle.close().unwrap();
        }

        let handle = StoreHandle::open(&mut store, "geofence", OpenMode::ReadOnly).unwrap();
        assert_eq!(handle.get_bool("joined"), Ok(Some(true)));
        assert_eq!(handle.get_u32("tx_counter"), Ok(Some(7)));
        assert_eq!(handle.get_u32("missing"), Ok(None));
    }

    #[test]
    fn test_handle_released_when_write_fails() {
        let mut store = MemoryStore::new();
        store.set_fail_writes(true);

        let result = (|| {
            let mut handle = StoreHandle::open(&mut store, "geofence", OpenMode::ReadWrite)?;
            handle.put_u32("total_tx", 1)?;
            handle.close()
        })();

        assert_eq!(result, Err(StorageError::Backend));
        assert!(!store.is_open());
        assert_eq!(store.open_count(), store.close_count());
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut store = MemoryStore::new();
        let mut handle = StoreHandle::open(&mut store, "geofence", OpenMode::ReadOnly).unwrap();
        assert_eq!(handle.put_bool("joined", true), Err(StorageError::ReadOnly));
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let mut store = MemoryStore::new();
        {
            let mut handle = StoreHandle::open(&mut store, "a", OpenMode::ReadWrite).unwrap();
            handle.put_u32("x", 1).unwrap();
        }
        let handle = StoreHandle::open(&mut store, "b", OpenMode::ReadOnly).unwrap();
        assert_eq!(handle.get_u32("x"), Ok(None));
    }

    #[test]
    fn test_type_mismatch() {
        let mut store = MemoryStore::new();
        let mut handle = StoreHandle::open(&mut store, "geofence", OpenMode::ReadWrite).unwrap();
        handle.put_bool("joined", true).unwrap();
        assert_eq!(handle.get_u32("joined"), Err(StorageError::TypeMismatch));
    }

    #[test]
    fn test_second_open_rejected() {
        let mut store = MemoryStore::new();
        store.open("a", OpenMode::ReadOnly).unwrap();
        assert_eq!(store.open("b", OpenMode::ReadOnly), Err(StorageError::AlreadyOpen));
    }

    #[test]
    fn test_names_too_long_rejected() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.open("a_namespace_longer_than_nvs", OpenMode::ReadOnly),
            Err(StorageError::InvalidName)
        );
    }
}
