//! Parameter Definitions
//!
//! Named, typed configuration values registered in the core
//! [`ParameterStore`]. Each group registers its defaults once at boot and is
//! then read back into a plain struct:
//!
//! ```text
//! register_defaults(&mut store)  ->  from_store(&store)  ->  typed config
//! ```
//!
//! # Groups
//!
//! - [`LoraParams`]: activation credentials and uplink timing
//! - [`FenceParams`]: default zone, hysteresis and fix-quality filter
//!
//! # Build-time Defaults
//!
//! `build.rs` exports `LORA_DEV_EUI`, `LORA_JOIN_EUI` and `LORA_APP_KEY` from
//! the build environment so a device can be provisioned at compile time.

pub mod fence;
pub mod lorawan;

pub use fence::FenceParams;
pub use geotrack_core::parameters::{ParamFlags, ParamValue, ParameterError, ParameterStore};
pub use lorawan::LoraParams;
