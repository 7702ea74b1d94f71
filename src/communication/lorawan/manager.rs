//! LoRaWAN connectivity manager
//!
//! Owns the join/uplink state machine:
//!
//! ```text
//! Uninitialized --activate--> Activating --poll: joined--> Idle <--> Cooldown
//!       ^                          |
//!       |                          +-- max_join_attempts without a join --> Degraded
//!       +-- uplink fails with NotJoined
//! ```
//!
//! Every call is synchronous. Join completion is observed by polling, so the
//! control loop calls [`ConnectivityManager::activate`] and
//! [`ConnectivityManager::poll_activation`] once per tick until joined.
//!
//! The durable part of the session ([`SessionSnapshot`]) is written after a
//! join and after every uplink attempt. Storage failures are logged and never
//! stop the manager.

use geotrack_core::credentials::Credentials;
use geotrack_core::geofence::GeofenceEvent;
use geotrack_core::payload::{StatusSummary, MAX_PAYLOAD_SIZE};
use geotrack_core::position::PositionSample;
use geotrack_core::traits::{Downlink, KeyValueStore, LoraRadio, RadioError, TimeSource};

use super::config::{is_valid_app_port, ConnectivityConfig, DutyCyclePolicy};
use super::error::{ActivationError, ActivationOutcome, PollOutcome, TransmitError};
use super::session::SessionSnapshot;
use super::stats::Statistics;

/// Observable connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectivityState {
    /// No session and no join in flight
    Uninitialized,
    /// Join request sent, waiting for the network
    Activating,
    /// Joined and the uplink gate is open
    Idle,
    /// Joined, waiting for the uplink interval to elapse
    Cooldown,
    /// Join attempts exhausted
    Degraded,
}

/// Join/uplink state machine over an injected radio, store and clock
pub struct ConnectivityManager<R: LoraRadio, S: KeyValueStore, T: TimeSource> {
    radio: R,
    store: S,
    time: T,
    credentials: Credentials,
    config: ConnectivityConfig,
    joined: bool,
    join_in_flight: bool,
    /// Consecutive attempts since the last join
    join_attempts: u32,
    last_join_attempt_ms: Option<u32>,
    last_tx_ms: Option<u32>,
    last_tx_attempt_ms: Option<u32>,
    /// Successful uplinks, used as the application frame sequence
    tx_counter: u32,
    device_address: Option<u32>,
    stats: Statistics,
    downlink: Option<Downlink>,
}

impl<R: LoraRadio, S: KeyValueStore, T: TimeSource> ConnectivityManager<R, S, T> {
    /// Create a manager, restoring the persisted session from `store`
    ///
    /// An unreadable session record is logged and treated as empty.
    pub fn new(
        radio: R,
        mut store: S,
        time: T,
        credentials: Credentials,
        config: ConnectivityConfig,
    ) -> Self {
        let snapshot = match SessionSnapshot::load(&mut store) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                crate::log_warn!("LoRaWAN: session restore failed: {}", e.as_str());
                SessionSnapshot::default()
            }
        };

        if snapshot.joined {
            crate::log_info!(
                "LoRaWAN: restored session, {} uplinks sent",
                snapshot.tx_counter
            );
        }

        // The stack only reports an address once it holds the session
        let device_address =
            (snapshot.joined && radio.is_activated()).then(|| radio.device_address());

        Self {
            radio,
            store,
            time,
            credentials,
            config,
            joined: snapshot.joined,
            join_in_flight: false,
            join_attempts: 0,
            last_join_attempt_ms: None,
            last_tx_ms: None,
            last_tx_attempt_ms: None,
            tx_counter: snapshot.tx_counter,
            device_address,
            stats: snapshot.statistics(),
            downlink: None,
        }
    }

    // ------------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------------

    /// Start an OTAA join if allowed
    ///
    /// Does not wait for the join to complete; see [`Self::poll_activation`].
    ///
    /// # Errors
    ///
    /// - [`ActivationError::Degraded`] once `max_join_attempts` consecutive
    ///   attempts went unanswered; nothing is forwarded to the radio
    /// - [`ActivationError::TooSoon`] while the retry delay since the previous
    ///   attempt runs; no attempt is counted
    /// - [`ActivationError::Radio`] when the stack rejects the request; the
    ///   attempt is counted
    pub fn activate(&mut self) -> Result<ActivationOutcome, ActivationError> {
        if self.joined {
            return Ok(ActivationOutcome::AlreadyActivated);
        }

        if self.is_degraded() {
            return Err(ActivationError::Degraded);
        }

        if let Some(last) = self.last_join_attempt_ms {
            let elapsed = self.time.elapsed_since(last);
            if elapsed < self.config.join_retry_delay_ms {
                return Err(ActivationError::TooSoon {
                    retry_in_ms: self.config.join_retry_delay_ms - elapsed,
                });
            }
        }

        self.last_join_attempt_ms = Some(self.time.now_ms());
        self.join_attempts = self.join_attempts.saturating_add(1);
        self.stats.join_attempts = self.stats.join_attempts.saturating_add(1);

        crate::log_info!(
            "LoRaWAN: join attempt {}/{}",
            self.join_attempts,
            self.config.max_join_attempts
        );

        let result = self.radio.begin_activation(
            &self.credentials.dev_eui,
            &self.credentials.join_eui,
            &self.credentials.app_key,
        );

        match result {
            Ok(()) => {
                self.join_in_flight = true;
                Ok(ActivationOutcome::Started)
            }
            Err(e) => {
                self.join_in_flight = false;
                crate::log_warn!("LoRaWAN: join request failed, code {}", e.code());
                if self.is_degraded() {
                    crate::log_error!(
                        "LoRaWAN: giving up after {} join attempts",
                        self.join_attempts
                    );
                }
                Err(ActivationError::Radio(e))
            }
        }
    }

    /// Check whether a pending join has completed
    pub fn poll_activation(&mut self) -> PollOutcome {
        if self.joined {
            return PollOutcome::AlreadyActivated;
        }

        if !self.join_in_flight {
            return PollOutcome::NotStarted;
        }

        if !self.radio.is_activated() {
            return PollOutcome::Pending;
        }

        let address = self.radio.device_address();
        self.joined = true;
        self.join_in_flight = false;
        self.join_attempts = 0;
        self.last_join_attempt_ms = None;
        self.device_address = Some(address);

        crate::log_info!("LoRaWAN: joined, device address 0x{:x}", address);

        self.persist();
        PollOutcome::Joined
    }

    // ------------------------------------------------------------------------
    // Uplink
    // ------------------------------------------------------------------------

    fn gate_reference(&self) -> Option<u32> {
        match self.config.duty_cycle_policy {
            DutyCyclePolicy::FromLastSuccess => self.last_tx_ms,
            DutyCyclePolicy::FromLastAttempt => self.last_tx_attempt_ms,
        }
    }

    /// Milliseconds until the uplink gate opens (0 when open or not joined)
    pub fn next_tx_in_ms(&self) -> u32 {
        if !self.joined {
            return 0;
        }

        match self.gate_reference() {
            Some(last) => self
                .config
                .tx_interval_ms
                .saturating_sub(self.time.elapsed_since(last)),
            None => 0,
        }
    }

    /// Joined and a full uplink interval has elapsed
    pub fn can_transmit(&self) -> bool {
        self.joined && self.next_tx_in_ms() == 0
    }

    /// Send one uplink
    ///
    /// Gate and port rejections are not counted. Radio failures are counted
    /// as failed transmissions and persisted.
    ///
    /// # Panics
    ///
    /// If `payload` is longer than [`MAX_PAYLOAD_SIZE`].
    pub fn transmit(&mut self, payload: &[u8], port: u8) -> Result<(), TransmitError> {
        assert!(
            payload.len() <= MAX_PAYLOAD_SIZE,
            "uplink payload exceeds MAX_PAYLOAD_SIZE"
        );

        if !is_valid_app_port(port) {
            return Err(TransmitError::InvalidPort(port));
        }

        if !self.joined {
            return Err(TransmitError::NotActivated);
        }

        let wait_ms = self.next_tx_in_ms();
        if wait_ms > 0 {
            return Err(TransmitError::DutyCycle { wait_ms });
        }

        let now = self.time.now_ms();
        self.last_tx_attempt_ms = Some(now);

        let result = match self.radio.send_receive(payload, port) {
            Ok(downlink) => {
                self.stats.record_success();
                self.last_tx_ms = Some(now);
                self.tx_counter = self.tx_counter.wrapping_add(1);
                if self.device_address.is_none() && self.radio.is_activated() {
                    self.device_address = Some(self.radio.device_address());
                }

                crate::log_debug!(
                    "LoRaWAN: uplink {} sent ({} bytes, port {})",
                    self.tx_counter,
                    payload.len(),
                    port
                );

                if let Some(downlink) = downlink {
                    crate::log_info!(
                        "LoRaWAN: downlink on port {} ({} bytes)",
                        downlink.port,
                        downlink.payload.len()
                    );
                    self.downlink = Some(downlink);
                }
                Ok(())
            }
            Err(e) => {
                self.stats.record_failure();
                crate::log_warn!("LoRaWAN: uplink failed, code {}", e.code());

                if e == RadioError::NotJoined {
                    crate::log_warn!("LoRaWAN: session lost, rejoin required");
                    self.joined = false;
                    self.device_address = None;
                    self.last_join_attempt_ms = None;
                }
                Err(TransmitError::Radio(e))
            }
        };

        self.persist();
        result
    }

    /// Encode and send a position report on the configured port
    pub fn send_position(&mut self, sample: &PositionSample) -> Result<(), TransmitError> {
        let port = self.config.port;
        self.transmit(&sample.to_bytes(), port)
    }

    /// Encode and send a zone-crossing event on the configured port
    pub fn send_geofence_event(&mut self, event: &GeofenceEvent) -> Result<(), TransmitError> {
        let port = self.config.port;
        self.transmit(&event.to_bytes(), port)
    }

    /// Encode and send a status summary on the configured port
    pub fn send_status(&mut self, summary: &StatusSummary) -> Result<(), TransmitError> {
        let port = self.config.port;
        self.transmit(&summary.to_bytes(), port)
    }

    /// Latest downlink, if one arrived since the last call
    pub fn take_downlink(&mut self) -> Option<Downlink> {
        self.downlink.take()
    }

    // ------------------------------------------------------------------------
    // State and statistics
    // ------------------------------------------------------------------------

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Successful uplinks as a percentage of attempts
    pub fn success_rate(&self) -> f32 {
        self.stats.success_rate()
    }

    pub fn tx_counter(&self) -> u32 {
        self.tx_counter
    }

    /// Network-assigned address, once joined
    pub fn device_address(&self) -> Option<u32> {
        self.device_address
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// No further join attempts will be made
    pub fn is_degraded(&self) -> bool {
        !self.joined && self.join_attempts >= self.config.max_join_attempts
    }

    pub fn state(&self) -> ConnectivityState {
        if self.joined {
            if self.can_transmit() {
                ConnectivityState::Idle
            } else {
                ConnectivityState::Cooldown
            }
        } else if self.is_degraded() {
            ConnectivityState::Degraded
        } else if self.join_in_flight {
            ConnectivityState::Activating
        } else {
            ConnectivityState::Uninitialized
        }
    }

    pub fn config(&self) -> &ConnectivityConfig {
        &self.config
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    /// Give back the injected capabilities
    pub fn into_parts(self) -> (R, S, T) {
        (self.radio, self.store, self.time)
    }

    fn persist(&mut self) {
        let snapshot = SessionSnapshot {
            joined: self.joined,
            tx_counter: self.tx_counter,
            total_tx: self.stats.total_tx,
            success_tx: self.stats.success_tx,
            failed_tx: self.stats.failed_tx,
        };

        if let Err(e) = snapshot.save(&mut self.store) {
            crate::log_warn!("LoRaWAN: session save failed: {}", e.as_str());
        }
    }
}
