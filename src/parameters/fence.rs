//! Fence Parameter Definitions
//!
//! Defines the geofence and fix-quality parameters.
//!
//! # Parameters
//!
//! - `FENCE_HYST` - Hysteresis margin around every zone boundary (m)
//! - `FENCE_CHK_MS` - Minimum interval between zone evaluations (ms)
//! - `FENCE_LAT` - Default zone center latitude (degrees × 1e6)
//! - `FENCE_LON` - Default zone center longitude (degrees × 1e6)
//! - `FENCE_RADIUS` - Default zone radius (m), 0 disables the zone
//! - `GPS_MIN_SATS` - Minimum satellites for a usable fix
//! - `GPS_MAX_HDOP` - Maximum HDOP for a usable fix
//!
//! Coordinates are stored as integers because an `f32` parameter cannot hold
//! a micro-degree.

use geotrack_core::geofence::{GeofenceEngine, GeofenceError, GeofenceZone, DEFAULT_HYSTERESIS_M};
use geotrack_core::parameters::{ParamFlags, ParamValue, ParameterStore};
use geotrack_core::position::{FixFilter, COORD_SCALE};

use crate::platform::Result;

/// Default zone evaluation interval (ms)
pub const DEFAULT_ZONE_CHECK_MS: u32 = 5_000;

/// Default zone center (degrees × 1e6)
pub const DEFAULT_FENCE_LAT: i32 = -33_448_900;
pub const DEFAULT_FENCE_LON: i32 = -70_669_300;

/// Default zone radius (m)
pub const DEFAULT_FENCE_RADIUS_M: f32 = 100.0;

/// Fence parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct FenceParams {
    /// Hysteresis margin (m)
    pub hysteresis_m: f32,
    /// Zone evaluation interval (ms)
    pub check_interval_ms: u32,
    pub latitude: i32,
    pub longitude: i32,
    /// Zone radius (m), 0 when disabled
    pub radius_m: f32,
    pub min_satellites: u8,
    pub max_hdop: f32,
}

impl FenceParams {
    /// Register fence parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<()> {
        store.register(
            "FENCE_HYST",
            ParamValue::Float(DEFAULT_HYSTERESIS_M),
            ParamFlags::empty(),
        )?;
        store.register(
            "FENCE_CHK_MS",
            ParamValue::Int(DEFAULT_ZONE_CHECK_MS as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            "FENCE_LAT",
            ParamValue::Int(DEFAULT_FENCE_LAT),
            ParamFlags::empty(),
        )?;
        store.register(
            "FENCE_LON",
            ParamValue::Int(DEFAULT_FENCE_LON),
            ParamFlags::empty(),
        )?;
        store.register(
            "FENCE_RADIUS",
            ParamValue::Float(DEFAULT_FENCE_RADIUS_M),
            ParamFlags::empty(),
        )?;
        store.register(
            "GPS_MIN_SATS",
            ParamValue::Int(FixFilter::DEFAULT_MIN_SATELLITES as i32),
            ParamFlags::empty(),
        )?;
        store.register(
            "GPS_MAX_HDOP",
            ParamValue::Float(FixFilter::DEFAULT_MAX_HDOP),
            ParamFlags::empty(),
        )?;

        Ok(())
    }

    /// Load fence parameters from parameter store
    ///
    /// Out-of-range values are clamped: negative margins, radii and
    /// intervals become 0.
    pub fn from_store(store: &ParameterStore) -> Self {
        let hysteresis_m = match store.get("FENCE_HYST") {
            Some(ParamValue::Float(v)) => v.max(0.0),
            Some(ParamValue::Int(v)) => (*v).max(0) as f32,
            _ => DEFAULT_HYSTERESIS_M,
        };

        let check_interval_ms = match store.get("FENCE_CHK_MS") {
            Some(ParamValue::Int(v)) => (*v).max(0) as u32,
            _ => DEFAULT_ZONE_CHECK_MS,
        };

        let latitude = match store.get("FENCE_LAT") {
            Some(ParamValue::Int(v)) => *v,
            _ => DEFAULT_FENCE_LAT,
        };

        let longitude = match store.get("FENCE_LON") {
            Some(ParamValue::Int(v)) => *v,
            _ => DEFAULT_FENCE_LON,
        };

        let radius_m = match store.get("FENCE_RADIUS") {
            Some(ParamValue::Float(v)) => v.max(0.0),
            Some(ParamValue::Int(v)) => (*v).max(0) as f32,
            _ => DEFAULT_FENCE_RADIUS_M,
        };

        let min_satellites = match store.get("GPS_MIN_SATS") {
            Some(ParamValue::Int(v)) => (*v).clamp(0, u8::MAX as i32) as u8,
            _ => FixFilter::DEFAULT_MIN_SATELLITES,
        };

        let max_hdop = match store.get("GPS_MAX_HDOP") {
            Some(ParamValue::Float(v)) => *v,
            Some(ParamValue::Int(v)) => *v as f32,
            _ => FixFilter::DEFAULT_MAX_HDOP,
        };

        Self {
            hysteresis_m,
            check_interval_ms,
            latitude,
            longitude,
            radius_m,
            min_satellites,
            max_hdop,
        }
    }

    pub fn fix_filter(&self) -> FixFilter {
        FixFilter {
            min_satellites: self.min_satellites,
            max_hdop: self.max_hdop,
        }
    }

    /// Check if the default zone is enabled
    pub fn is_configured(&self) -> bool {
        self.radius_m > 0.0
    }

    /// Engine with the configured margin and, when enabled, the default zone
    /// in slot 0
    pub fn geofence_engine(&self) -> core::result::Result<GeofenceEngine, GeofenceError> {
        let mut engine = GeofenceEngine::new(self.hysteresis_m);
        if self.is_configured() {
            engine.add_zone(GeofenceZone::new(
                0,
                f64::from(self.latitude) / COORD_SCALE,
                f64::from(self.longitude) / COORD_SCALE,
                self.radius_m,
            ))?;
        }
        Ok(engine)
    }
}

impl Default for FenceParams {
    fn default() -> Self {
        Self {
            hysteresis_m: DEFAULT_HYSTERESIS_M,
            check_interval_ms: DEFAULT_ZONE_CHECK_MS,
            latitude: DEFAULT_FENCE_LAT,
            longitude: DEFAULT_FENCE_LON,
            radius_m: DEFAULT_FENCE_RADIUS_M,
            min_satellites: FixFilter::DEFAULT_MIN_SATELLITES,
            max_hdop: FixFilter::DEFAULT_MAX_HDOP,
        }
    }
}
