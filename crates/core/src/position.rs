//! Position fix types
//!
//! A [`PositionSample`] is what the GNSS provider hands the control loop once
//! per tick. Coordinates are kept in the same fixed-point form used on the
//! wire so a sample can be reported without any float round trip.

/// Fixed-point scale of latitude/longitude (micro-degrees)
pub const COORD_SCALE: f64 = 1e6;

/// One position fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSample {
    /// Latitude in degrees × 1e6
    pub latitude: i32,
    /// Longitude in degrees × 1e6
    pub longitude: i32,
    /// Altitude above mean sea level (m)
    pub altitude: i16,
    /// Satellites used in the fix
    pub satellites: u8,
    /// Horizontal dilution of precision × 10
    pub hdop: u8,
}

impl PositionSample {
    /// Build a sample from floating degrees, rounding to the nearest micro-degree
    pub fn from_degrees(latitude: f64, longitude: f64, altitude: i16, satellites: u8, hdop: u8) -> Self {
        Self {
            latitude: libm::round(latitude * COORD_SCALE) as i32,
            longitude: libm::round(longitude * COORD_SCALE) as i32,
            altitude,
            satellites,
            hdop,
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        f64::from(self.latitude) / COORD_SCALE
    }

    pub fn longitude_deg(&self) -> f64 {
        f64::from(self.longitude) / COORD_SCALE
    }

    /// HDOP as a plain ratio
    pub fn hdop_value(&self) -> f32 {
        f32::from(self.hdop) / 10.0
    }
}

/// Fix-quality gate applied before a sample reaches the geofence engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixFilter {
    /// Minimum satellites for a usable fix
    pub min_satellites: u8,
    /// Maximum HDOP for a usable fix
    pub max_hdop: f32,
}

impl FixFilter {
    pub const DEFAULT_MIN_SATELLITES: u8 = 4;
    pub const DEFAULT_MAX_HDOP: f32 = 10.0;

    pub fn accepts(&self, sample: &PositionSample) -> bool {
        sample.satellites >= self.min_satellites && sample.hdop_value() <= self.max_hdop
    }
}

impl Default for FixFilter {
    fn default() -> Self {
        Self {
            min_satellites: Self::DEFAULT_MIN_SATELLITES,
            max_hdop: Self::DEFAULT_MAX_HDOP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_degrees_rounds_to_micro_degrees() {
        let sample = PositionSample::from_degrees(-33.4489, -70.6693, 520, 8, 12);
        assert_eq!(sample.latitude, -33_448_900);
        assert_eq!(sample.longitude, -70_669_300);
        assert!((sample.latitude_deg() - (-33.4489)).abs() < 1e-9);
    }

    #[test]
    fn test_hdop_scaling() {
        let sample = PositionSample::from_degrees(0.0, 0.0, 0, 8, 12);
        assert!((sample.hdop_value() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_fix_filter_defaults() {
        let filter = FixFilter::default();
        let good = PositionSample::from_degrees(0.0, 0.0, 0, 4, 100);
        let few_sats = PositionSample::from_degrees(0.0, 0.0, 0, 3, 10);
        let poor_hdop = PositionSample::from_degrees(0.0, 0.0, 0, 9, 101);

        assert!(filter.accepts(&good));
        assert!(!filter.accepts(&few_sats));
        assert!(!filter.accepts(&poor_hdop));
    }
}
