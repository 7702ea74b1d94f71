//! Zone crossing events

/// Direction of a committed zone crossing. The discriminant is the wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ZoneTransition {
    Exit = 0,
    Enter = 1,
}

impl ZoneTransition {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ZoneTransition::Exit),
            1 => Some(ZoneTransition::Enter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneTransition::Exit => "EXIT",
            ZoneTransition::Enter => "ENTER",
        }
    }
}

impl core::fmt::Display for ZoneTransition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A debounced zone crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeofenceEvent {
    pub zone_id: u8,
    pub kind: ZoneTransition,
    /// Latitude at the crossing (degrees × 1e6)
    pub latitude: i32,
    /// Longitude at the crossing (degrees × 1e6)
    pub longitude: i32,
    /// Caller-supplied timestamp (s)
    pub timestamp: u32,
}
