//! Communication protocols
//!
//! LoRaWAN uplink pipeline: activation, duty-cycle gating and session
//! persistence on top of the injected radio stack.

pub mod lorawan;
