//! geotrack_core - Pure no_std logic for the geotrack LoRaWAN tracker
//!
//! This crate contains platform-agnostic algorithms and types
//! that can be tested on host without any feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Radio, storage and clock injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Capability traits (LoraRadio, KeyValueStore, TimeSource) and mocks
//! - [`credentials`]: OTAA identifiers and key parsing
//! - [`position`]: Position fix type and fix-quality filter
//! - [`geofence`]: Circular zones and the hysteresis engine
//! - [`payload`]: Fixed-layout uplink encoders and decoders
//! - [`parameters`]: Parameter store for runtime configuration

#![no_std]

pub mod credentials;
pub mod geofence;
pub mod parameters;
pub mod payload;
pub mod position;
pub mod traits;
