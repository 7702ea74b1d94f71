//! Tracker context
//!
//! Owns the geofence engine and the connectivity manager and runs one
//! control-loop iteration per [`Tracker::tick`]:
//!
//! 1. Drive activation (join request, then completion polling)
//! 2. Classify the fix with the [`FixFilter`]
//! 3. Evaluate zones, at most once per `zone_check_interval_ms`
//! 4. Send a produced event if the uplink gate is open, otherwise drop it;
//!    with no event, send a periodic position report when the gate opens
//!
//! At most one uplink is sent per tick. The caller supplies the fix and a
//! timestamp in seconds for event reports; millisecond timing comes from the
//! manager's clock.

use core::fmt;

use geotrack_core::credentials::ConfigError;
use geotrack_core::geofence::{GeofenceEngine, GeofenceError, GeofenceEvent};
use geotrack_core::payload::{GpsStatus, StatusSummary, SystemStatus};
use geotrack_core::position::{FixFilter, PositionSample};
use geotrack_core::traits::{KeyValueStore, LoraRadio, TimeSource};

use crate::communication::lorawan::{
    ActivationError, ConnectivityManager, PollOutcome, TransmitError,
};
use crate::parameters::fence::DEFAULT_ZONE_CHECK_MS;
use crate::parameters::{FenceParams, LoraParams};

const MS_PER_HOUR: u32 = 3_600_000;

/// Control-loop settings outside the engine and the manager
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    pub fix_filter: FixFilter,
    /// Minimum spacing between zone evaluations (ms)
    pub zone_check_interval_ms: u32,
    /// Battery level (%) below which the status report flags low battery
    pub low_battery_percent: u8,
}

impl TrackerConfig {
    pub const DEFAULT_LOW_BATTERY_PERCENT: u8 = 20;
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fix_filter: FixFilter::default(),
            zone_check_interval_ms: DEFAULT_ZONE_CHECK_MS,
            low_battery_percent: Self::DEFAULT_LOW_BATTERY_PERCENT,
        }
    }
}

/// Startup failures when building a tracker from parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
    Config(ConfigError),
    Geofence(GeofenceError),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Config(e) => write!(f, "configuration error: {}", e),
            TrackerError::Geofence(e) => write!(f, "geofence error: {}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TrackerError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            TrackerError::Config(_) => defmt::write!(f, "configuration error"),
            TrackerError::Geofence(_) => defmt::write!(f, "geofence error"),
        }
    }
}

impl From<ConfigError> for TrackerError {
    fn from(e: ConfigError) -> Self {
        TrackerError::Config(e)
    }
}

impl From<GeofenceError> for TrackerError {
    fn from(e: GeofenceError) -> Self {
        TrackerError::Geofence(e)
    }
}

/// What one [`Tracker::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// The network join completed during this tick
    pub joined_now: bool,
    /// Activation was refused or failed (retry delay included)
    pub activation_error: Option<ActivationError>,
    pub gps_status: GpsStatus,
    /// Zone crossing committed during this tick
    pub event: Option<GeofenceEvent>,
    pub event_sent: bool,
    pub position_sent: bool,
    /// Uplink attempted during this tick failed
    pub transmit_error: Option<TransmitError>,
}

impl TickReport {
    fn new(gps_status: GpsStatus) -> Self {
        Self {
            joined_now: false,
            activation_error: None,
            gps_status,
            event: None,
            event_sent: false,
            position_sent: false,
            transmit_error: None,
        }
    }
}

/// Geofence tracker: one engine, one connectivity manager
pub struct Tracker<R: LoraRadio, S: KeyValueStore, T: TimeSource> {
    engine: GeofenceEngine,
    manager: ConnectivityManager<R, S, T>,
    config: TrackerConfig,
    last_zone_check_ms: Option<u32>,
    gps_status: GpsStatus,
    boot_ms: u32,
}

impl<R: LoraRadio, S: KeyValueStore, T: TimeSource> Tracker<R, S, T> {
    pub fn new(
        engine: GeofenceEngine,
        manager: ConnectivityManager<R, S, T>,
        config: TrackerConfig,
    ) -> Self {
        let boot_ms = manager.time().now_ms();
        Self {
            engine,
            manager,
            config,
            last_zone_check_ms: None,
            gps_status: GpsStatus::NoFix,
            boot_ms,
        }
    }

    /// Build a tracker from registered parameter groups
    ///
    /// # Errors
    ///
    /// Malformed credentials or timing parameters, or a default zone the
    /// engine rejects.
    pub fn from_params(
        radio: R,
        store: S,
        time: T,
        lora: &LoraParams,
        fence: &FenceParams,
    ) -> Result<Self, TrackerError> {
        let credentials = lora.credentials()?;
        let connectivity = lora.connectivity_config()?;
        let engine = fence.geofence_engine()?;

        let config = TrackerConfig {
            fix_filter: fence.fix_filter(),
            zone_check_interval_ms: fence.check_interval_ms,
            ..TrackerConfig::default()
        };

        crate::log_info!(
            "Tracker: {} zone(s), hysteresis {} m, uplink every {} ms",
            engine.zone_count(),
            engine.hysteresis(),
            connectivity.tx_interval_ms
        );

        let manager = ConnectivityManager::new(radio, store, time, credentials, connectivity);
        Ok(Self::new(engine, manager, config))
    }

    /// Run one control-loop iteration
    ///
    /// `fix` is the latest GNSS sample, if any; `timestamp_s` stamps any
    /// geofence event produced.
    pub fn tick(&mut self, fix: Option<PositionSample>, timestamp_s: u32) -> TickReport {
        let mut report = TickReport::new(self.classify(fix.as_ref()));
        self.gps_status = report.gps_status;

        if !self.manager.is_joined() {
            if let Err(e) = self.manager.activate() {
                report.activation_error = Some(e);
            }
            report.joined_now = self.manager.poll_activation() == PollOutcome::Joined;
        }

        let usable = fix.filter(|_| report.gps_status == GpsStatus::Usable);

        if let Some(sample) = usable {
            if self.zone_check_due() {
                report.event = self.engine.evaluate(&sample, timestamp_s);
            }
        }

        if let Some(event) = report.event {
            crate::log_info!(
                "Geofence: {} zone {}",
                event.kind.as_str(),
                event.zone_id
            );

            if self.manager.can_transmit() {
                match self.manager.send_geofence_event(&event) {
                    Ok(()) => report.event_sent = true,
                    Err(e) => report.transmit_error = Some(e),
                }
            } else {
                crate::log_warn!(
                    "Geofence: {} zone {} not sent, uplink unavailable",
                    event.kind.as_str(),
                    event.zone_id
                );
            }
        } else if let Some(sample) = usable {
            if self.manager.can_transmit() {
                match self.manager.send_position(&sample) {
                    Ok(()) => report.position_sent = true,
                    Err(e) => report.transmit_error = Some(e),
                }
            }
        }

        report
    }

    fn classify(&self, fix: Option<&PositionSample>) -> GpsStatus {
        match fix {
            None => GpsStatus::NoFix,
            Some(sample) if self.config.fix_filter.accepts(sample) => GpsStatus::Usable,
            Some(_) => GpsStatus::Rejected,
        }
    }

    fn zone_check_due(&mut self) -> bool {
        let now = self.manager.time().now_ms();
        let due = match self.last_zone_check_ms {
            Some(last) => now.wrapping_sub(last) >= self.config.zone_check_interval_ms,
            None => true,
        };
        if due {
            self.last_zone_check_ms = Some(now);
        }
        due
    }

    /// Status summary for the current tracker state
    pub fn status_summary(&self, battery_level: u8) -> StatusSummary {
        let hours = self.manager.time().elapsed_since(self.boot_ms) / MS_PER_HOUR;

        let mut system_status = SystemStatus::empty();
        system_status.set(SystemStatus::JOINED, self.manager.is_joined());
        system_status.set(SystemStatus::DEGRADED, self.manager.is_degraded());
        system_status.set(SystemStatus::GPS_LOCK, self.gps_status == GpsStatus::Usable);
        system_status.set(
            SystemStatus::LOW_BATTERY,
            battery_level < self.config.low_battery_percent,
        );

        StatusSummary {
            battery_level,
            uptime_hours: hours.min(u32::from(u16::MAX)) as u16,
            gps_status: self.gps_status,
            system_status,
        }
    }

    /// Send a status summary, subject to the uplink gate
    pub fn send_status(&mut self, battery_level: u8) -> Result<(), TransmitError> {
        let summary = self.status_summary(battery_level);
        self.manager.send_status(&summary)
    }

    pub fn gps_status(&self) -> GpsStatus {
        self.gps_status
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn engine(&self) -> &GeofenceEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GeofenceEngine {
        &mut self.engine
    }

    pub fn manager(&self) -> &ConnectivityManager<R, S, T> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ConnectivityManager<R, S, T> {
        &mut self.manager
    }
}
