//! Connectivity outcomes and errors

use core::fmt;

use geotrack_core::traits::RadioError;

/// Successful result of [`activate`](super::ConnectivityManager::activate)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActivationOutcome {
    /// Join request handed to the radio stack
    Started,
    /// A session already exists
    AlreadyActivated,
}

/// Result of [`poll_activation`](super::ConnectivityManager::poll_activation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// The pending join completed on this call
    Joined,
    /// A session already existed
    AlreadyActivated,
    /// A join is in flight
    Pending,
    /// No join has been started
    NotStarted,
}

/// Activation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationError {
    /// Retry delay since the previous attempt has not elapsed
    TooSoon { retry_in_ms: u32 },
    /// Join attempts exhausted; no further attempts are made
    Degraded,
    /// Radio stack rejected the join request
    Radio(RadioError),
}

impl fmt::Display for ActivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationError::TooSoon { retry_in_ms } => {
                write!(f, "join retry in {} ms", retry_in_ms)
            }
            ActivationError::Degraded => write!(f, "join attempts exhausted"),
            ActivationError::Radio(e) => write!(f, "join failed: {}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ActivationError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ActivationError::TooSoon { retry_in_ms } => {
                defmt::write!(f, "join retry in {} ms", retry_in_ms)
            }
            ActivationError::Degraded => defmt::write!(f, "join attempts exhausted"),
            ActivationError::Radio(e) => defmt::write!(f, "join failed: radio error {}", e.code()),
        }
    }
}

/// Uplink failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitError {
    /// No network session
    NotActivated,
    /// Uplink interval has not elapsed
    DutyCycle { wait_ms: u32 },
    /// Port 0 or a reserved port (224 and above)
    InvalidPort(u8),
    /// Radio stack reported a failure; counted as a failed transmission
    Radio(RadioError),
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmitError::NotActivated => write!(f, "not activated"),
            TransmitError::DutyCycle { wait_ms } => write!(f, "duty cycle, wait {} ms", wait_ms),
            TransmitError::InvalidPort(port) => write!(f, "invalid port {}", port),
            TransmitError::Radio(e) => write!(f, "uplink failed: {}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransmitError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            TransmitError::NotActivated => defmt::write!(f, "not activated"),
            TransmitError::DutyCycle { wait_ms } => {
                defmt::write!(f, "duty cycle, wait {} ms", wait_ms)
            }
            TransmitError::InvalidPort(port) => defmt::write!(f, "invalid port {}", port),
            TransmitError::Radio(e) => defmt::write!(f, "uplink failed: radio error {}", e.code()),
        }
    }
}
