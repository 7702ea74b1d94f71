//! LoRaWAN radio capability
//!
//! The network stack (OTAA cryptography, channel plans, regional parameters)
//! is consumed as a black box through [`LoraRadio`]. Each call is blocking
//! and bounded in time by the stack itself; it returns either success or a
//! classified [`RadioError`].

use core::fmt;

use heapless::{Deque, Vec};

use crate::credentials::{AppKey, Eui};
use crate::payload::MAX_PAYLOAD_SIZE;

/// Classified failure reported by the radio stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Transceiver did not respond on the bus
    ChipNotFound,
    /// Payload exceeds what the current data rate allows
    PacketTooLong,
    /// Uplink was not sent within the stack's deadline
    TxTimeout,
    /// No join-accept or downlink arrived in the receive windows
    RxTimeout,
    /// Received frame failed its integrity check
    CrcMismatch,
    /// Every channel is blocked by regional duty-cycle limits
    NoChannelAvailable,
    /// The stack no longer holds a valid session
    NotJoined,
    /// Any other stack-specific status code
    Other(i16),
}

impl RadioError {
    /// Classify a RadioLib-style status code (`0` is success)
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => None,
            -2 => Some(RadioError::ChipNotFound),
            -4 => Some(RadioError::PacketTooLong),
            -5 => Some(RadioError::TxTimeout),
            -6 => Some(RadioError::RxTimeout),
            -7 => Some(RadioError::CrcMismatch),
            -1101 => Some(RadioError::NotJoined),
            -1106 => Some(RadioError::NoChannelAvailable),
            other => Some(RadioError::Other(other)),
        }
    }

    /// RadioLib-style status code
    pub fn code(&self) -> i16 {
        match self {
            RadioError::ChipNotFound => -2,
            RadioError::PacketTooLong => -4,
            RadioError::TxTimeout => -5,
            RadioError::RxTimeout => -6,
            RadioError::CrcMismatch => -7,
            RadioError::NotJoined => -1101,
            RadioError::NoChannelAvailable => -1106,
            RadioError::Other(code) => *code,
        }
    }
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioError::ChipNotFound => write!(f, "chip not found"),
            RadioError::PacketTooLong => write!(f, "packet too long"),
            RadioError::TxTimeout => write!(f, "TX timeout"),
            RadioError::RxTimeout => write!(f, "RX timeout"),
            RadioError::CrcMismatch => write!(f, "CRC mismatch"),
            RadioError::NoChannelAvailable => write!(f, "no channel available"),
            RadioError::NotJoined => write!(f, "not joined"),
            RadioError::Other(code) => write!(f, "error {}", code),
        }
    }
}

/// Application downlink received in the RX windows after an uplink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downlink {
    /// Application port (FPort)
    pub port: u8,
    /// Application payload
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

/// Activation and uplink capability of the LoRaWAN stack
pub trait LoraRadio {
    /// Start an over-the-air activation. Returns once the join request is
    /// queued; completion is observed through [`LoraRadio::is_activated`].
    fn begin_activation(
        &mut self,
        dev_eui: &Eui,
        join_eui: &Eui,
        app_key: &AppKey,
    ) -> Result<(), RadioError>;

    /// Whether the stack holds a valid network session
    fn is_activated(&self) -> bool;

    /// Short device address assigned by the network (valid once activated)
    fn device_address(&self) -> u32;

    /// Send one confirmed-or-unconfirmed uplink and wait through the receive
    /// windows. Returns the downlink if the network sent one.
    fn send_receive(&mut self, payload: &[u8], port: u8) -> Result<Option<Downlink>, RadioError>;
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Number of scripted outcomes a [`MockRadio`] can hold per operation
const SCRIPT_DEPTH: usize = 16;

/// Deterministic radio for host tests.
///
/// Outcomes are scripted per call; when a script runs dry the call succeeds.
/// A join completes only after [`MockRadio::accept_join`] is called and a
/// successful `begin_activation` has been issued.
#[derive(Debug, Default)]
pub struct MockRadio {
    begin_script: Deque<Result<(), RadioError>, SCRIPT_DEPTH>,
    send_script: Deque<Result<Option<Downlink>, RadioError>, SCRIPT_DEPTH>,
    join_requested: bool,
    join_accepted: bool,
    device_address: u32,
    begin_calls: u32,
    send_calls: u32,
    last_uplink: Option<(u8, Vec<u8, MAX_PAYLOAD_SIZE>)>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            device_address: 0x260B_1234,
            ..Self::default()
        }
    }

    /// Queue the outcome of a future `begin_activation` call
    pub fn script_begin(&mut self, result: Result<(), RadioError>) {
        let _ = self.begin_script.push_back(result);
    }

    /// Queue the outcome of a future `send_receive` call
    pub fn script_send(&mut self, result: Result<Option<Downlink>, RadioError>) {
        let _ = self.send_script.push_back(result);
    }

    /// Let the network accept the pending (or next) join request
    pub fn accept_join(&mut self) {
        self.join_accepted = true;
    }

    /// Drop the network session, as after a stack reset
    pub fn lose_session(&mut self) {
        self.join_requested = false;
        self.join_accepted = false;
    }

    /// Mark the stack as already holding a session (restored by the stack)
    pub fn restore_session(&mut self) {
        self.join_requested = true;
        self.join_accepted = true;
    }

    pub fn begin_calls(&self) -> u32 {
        self.begin_calls
    }

    pub fn send_calls(&self) -> u32 {
        self.send_calls
    }

    /// Port and bytes of the most recent uplink handed to the stack
    pub fn last_uplink(&self) -> Option<(u8, &[u8])> {
        self.last_uplink
            .as_ref()
            .map(|(port, bytes)| (*port, bytes.as_slice()))
    }
}

impl LoraRadio for MockRadio {
    fn begin_activation(
        &mut self,
        _dev_eui: &Eui,
        _join_eui: &Eui,
        _app_key: &AppKey,
    ) -> Result<(), RadioError> {
        self.begin_calls += 1;
        let result = self.begin_script.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.join_requested = true;
        }
        result
    }

    fn is_activated(&self) -> bool {
        self.join_requested && self.join_accepted
    }

    fn device_address(&self) -> u32 {
        self.device_address
    }

    fn send_receive(&mut self, payload: &[u8], port: u8) -> Result<Option<Downlink>, RadioError> {
        self.send_calls += 1;
        let mut bytes = Vec::new();
        // Oversized uplinks are recorded truncated; the manager never sends them
        let _ = bytes.extend_from_slice(&payload[..payload.len().min(MAX_PAYLOAD_SIZE)]);
        self.last_uplink = Some((port, bytes));
        self.send_script.pop_front().unwrap_or(Ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (Eui, Eui, AppKey) {
        (Eui([1; 8]), Eui([0; 8]), AppKey::new([7; 16]))
    }

    #[test]
    fn test_join_requires_request_and_accept() {
        let mut radio = MockRadio::new();
        let (dev, join, key) = keys();

        radio.accept_join();
        assert!(!radio.is_activated());

        radio.begin_activation(&dev, &join, &key).unwrap();
        assert!(radio.is_activated());
        assert_eq!(radio.begin_calls(), 1);
    }

    #[test]
    fn test_scripted_begin_failure() {
        let mut radio = MockRadio::new();
        let (dev, join, key) = keys();
        radio.script_begin(Err(RadioError::ChipNotFound));

        assert_eq!(
            radio.begin_activation(&dev, &join, &key),
            Err(RadioError::ChipNotFound)
        );
        radio.accept_join();
        assert!(!radio.is_activated());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(RadioError::from_code(0), None);
        assert_eq!(RadioError::from_code(-6), Some(RadioError::RxTimeout));
        assert_eq!(RadioError::from_code(-42), Some(RadioError::Other(-42)));
        assert_eq!(RadioError::NoChannelAvailable.code(), -1106);
        assert_eq!(
            RadioError::from_code(RadioError::NotJoined.code()),
            Some(RadioError::NotJoined)
        );
    }

    #[test]
    fn test_send_records_uplink() {
        let mut radio = MockRadio::new();
        radio.script_send(Err(RadioError::TxTimeout));

        assert_eq!(radio.send_receive(&[1, 2, 3], 5), Err(RadioError::TxTimeout));
        assert_eq!(radio.send_receive(&[9], 1), Ok(None));
        assert_eq!(radio.last_uplink(), Some((1, &[9u8][..])));
        assert_eq!(radio.send_calls(), 2);
    }
}
