//! LoRaWAN connectivity
//!
//! - [`ConnectivityManager`]: OTAA join, duty-cycle gated uplinks, statistics
//! - [`SessionSnapshot`]: session record persisted across power cycles
//! - [`ConnectivityConfig`]: timing and retry configuration

pub mod config;
pub mod error;
pub mod manager;
pub mod session;
pub mod stats;

pub use config::{is_valid_app_port, ConnectivityConfig, DutyCyclePolicy};
pub use error::{ActivationError, ActivationOutcome, PollOutcome, TransmitError};
pub use manager::{ConnectivityManager, ConnectivityState};
pub use session::{SessionSnapshot, SESSION_NAMESPACE};
pub use stats::Statistics;
