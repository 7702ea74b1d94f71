//! Parameter management types
//!
//! This module provides the in-memory parameter store used for tracker
//! configuration. Parameter definitions (LoRaWAN, geofence) and their
//! defaults live in the `geotrack` crate.

pub mod error;
pub mod storage;

pub use error::ParameterError;
pub use storage::{ParamFlags, ParamMetadata, ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, MAX_STRING_LEN, PARAM_NAME_LEN};
