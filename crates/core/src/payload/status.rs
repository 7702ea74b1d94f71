//! Status summary uplink

use bitflags::bitflags;

use super::{body, MessageType};

/// Quality of the most recent GNSS fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GpsStatus {
    /// No fix available
    NoFix = 0,
    /// A fix exists but failed the fix filter
    Rejected = 1,
    /// Usable fix
    Usable = 2,
}

impl GpsStatus {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(GpsStatus::NoFix),
            1 => Some(GpsStatus::Rejected),
            2 => Some(GpsStatus::Usable),
            _ => None,
        }
    }
}

bitflags! {
    /// System status bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SystemStatus: u8 {
        /// Network session established
        const JOINED = 0x01;
        /// Activation retries exhausted
        const DEGRADED = 0x02;
        /// Last fix passed the fix filter
        const GPS_LOCK = 0x04;
        /// Battery below the warning level
        const LOW_BATTERY = 0x08;
    }
}

/// Periodic health report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSummary {
    /// Battery charge (%)
    pub battery_level: u8,
    /// Time since boot (h)
    pub uptime_hours: u16,
    pub gps_status: GpsStatus,
    pub system_status: SystemStatus,
}

impl StatusSummary {
    /// Encoded size in bytes
    pub const SIZE: usize = 6;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = MessageType::Status as u8;
        buf[1] = self.battery_level;
        buf[2..4].copy_from_slice(&self.uptime_hours.to_be_bytes());
        buf[4] = self.gps_status as u8;
        buf[5] = self.system_status.bits();
        buf
    }

    /// Deserialize a status summary. Unknown status bits are dropped.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        let b = body(buf, MessageType::Status, Self::SIZE)?;
        Some(Self {
            battery_level: b[0],
            uptime_hours: u16::from_be_bytes([b[1], b[2]]),
            gps_status: GpsStatus::from_u8(b[3])?,
            system_status: SystemStatus::from_bits_truncate(b[4]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_layout() {
        let status = StatusSummary {
            battery_level: 87,
            uptime_hours: 300,
            gps_status: GpsStatus::Usable,
            system_status: SystemStatus::JOINED | SystemStatus::GPS_LOCK,
        };

        let bytes = status.to_bytes();
        assert_eq!(bytes, [0x03, 87, 0x01, 0x2C, 2, 0x05]);
        assert_eq!(StatusSummary::from_bytes(&bytes), Some(status));
    }

    #[test]
    fn test_unknown_gps_status_rejected() {
        assert_eq!(StatusSummary::from_bytes(&[0x03, 0, 0, 0, 9, 0]), None);
    }

    #[test]
    fn test_unknown_status_bits_dropped() {
        let status = StatusSummary::from_bytes(&[0x03, 50, 0, 1, 0, 0xF2]).unwrap();
        assert_eq!(status.system_status, SystemStatus::DEGRADED);
    }
}
