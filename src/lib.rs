#![cfg_attr(not(test), no_std)]

//! geotrack - LoRaWAN geofence tracker firmware
//!
//! This library provides the connectivity state machine, the geofence event
//! pipeline and the persistence layer for a battery-powered tracker that
//! reports over LoRaWAN (OTAA).
//!
//! Pure logic (geofence engine, payload codec, parameter store, capability
//! traits) lives in [`geotrack_core`] and is re-exported here.

#[cfg(all(not(test), feature = "mock"))]
extern crate std;

pub use geotrack_core;

// Platform abstraction layer (flash)
pub mod platform;

// Logging and flash-backed storage
pub mod core;

// LoRaWAN connectivity
pub mod communication;

// Parameter definitions
pub mod parameters;

// Control-loop context
pub mod tracker;

pub use communication::lorawan::{ConnectivityConfig, ConnectivityManager};
pub use tracker::{TickReport, Tracker, TrackerConfig, TrackerError};
