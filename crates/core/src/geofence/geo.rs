//! Great-circle distance
//!
//! Double precision is used throughout: at tracker latitudes a single
//! precision degree carries ~0.5 m of quantization, which is the same order
//! as the hysteresis margin.

use libm::{atan2, cos, sin, sqrt};

/// Mean Earth radius (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;

/// Haversine distance in meters between two positions given in degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * DEG_TO_RAD;
    let lat2_rad = lat2 * DEG_TO_RAD;
    let delta_lat = (lat2 - lat1) * DEG_TO_RAD;
    let delta_lon = (lon2 - lon1) * DEG_TO_RAD;

    let sin_dlat = sin(delta_lat / 2.0);
    let sin_dlon = sin(delta_lon / 2.0);
    let a = sin_dlat * sin_dlat + cos(lat1_rad) * cos(lat2_rad) * sin_dlon * sin_dlon;
    let c = 2.0 * atan2(sqrt(a), sqrt(1.0 - a));
    EARTH_RADIUS_M * c
}

/// Meters spanned by one degree of latitude
pub fn meters_per_degree_lat() -> f64 {
    EARTH_RADIUS_M * DEG_TO_RAD
}
