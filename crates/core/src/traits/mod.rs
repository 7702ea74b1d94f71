//! Capability traits injected into the tracker logic.
//!
//! This module provides trait abstractions that decouple the connectivity and
//! geofence logic from the board, the LoRaWAN stack and the storage medium.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Flash-backed and hardware implementations live in the firmware crate

pub mod radio;
pub mod storage;
pub mod time;

pub use radio::{Downlink, LoraRadio, MockRadio, RadioError};
pub use storage::{KeyValueStore, MemoryStore, OpenMode, StorageError, StoreHandle};
pub use time::{MockTime, TimeSource};
