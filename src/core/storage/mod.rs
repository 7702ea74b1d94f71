//! Persistent key-value storage
//!
//! Flash-backed implementation of the core `KeyValueStore` capability.

pub mod block;
pub mod crc;
pub mod flash_kv;

pub use flash_kv::{FlashKvStore, KV_BLOCK_ADDRESSES};
