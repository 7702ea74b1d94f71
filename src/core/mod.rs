//! Core infrastructure
//!
//! Logging macros and the Flash-backed key-value store.

pub mod logging;
pub mod storage;
