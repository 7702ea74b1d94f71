//! Monitored circular zones

/// Maximum number of zones tracked at once
pub const MAX_ZONES: usize = 5;

/// Circular geofence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeofenceZone {
    /// Zone identifier (0..MAX_ZONES)
    pub id: u8,
    /// Center latitude (degrees)
    pub latitude: f64,
    /// Center longitude (degrees)
    pub longitude: f64,
    /// Radius (m)
    pub radius_m: f32,
}

impl GeofenceZone {
    pub fn new(id: u8, latitude: f64, longitude: f64, radius_m: f32) -> Self {
        Self {
            id,
            latitude,
            longitude,
            radius_m,
        }
    }

    /// A zone with no positive radius never produces transitions
    pub fn is_configured(&self) -> bool {
        self.radius_m > 0.0
    }
}
