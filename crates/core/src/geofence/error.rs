//! Geofence configuration errors

/// Errors from zone management
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeofenceError {
    /// All zone slots are in use, or the id is outside 0..MAX_ZONES
    Capacity,
    /// A zone with this id is already configured
    DuplicateZone,
    /// Radius is not a positive finite number
    InvalidRadius,
}

impl core::fmt::Display for GeofenceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GeofenceError::Capacity => write!(f, "geofence capacity exceeded"),
            GeofenceError::DuplicateZone => write!(f, "geofence zone already configured"),
            GeofenceError::InvalidRadius => write!(f, "invalid geofence radius"),
        }
    }
}
