//! Uplink payload codec
//!
//! Every uplink is a one-byte message type tag followed by fixed-width
//! big-endian fields. Encoders return fixed-size arrays so each message's
//! length is known at compile time and checked against [`MAX_PAYLOAD_SIZE`].
//!
//! | Tag  | Message           | Size |
//! |------|-------------------|------|
//! | 0x01 | Position report   | 13   |
//! | 0x02 | Geofence event    | 15   |
//! | 0x03 | Status summary    | 6    |
//!
//! Decoders mirror the network-side decoder and reject anything with the
//! wrong tag or length.

pub mod status;

pub use status::{GpsStatus, StatusSummary, SystemStatus};

use crate::geofence::{GeofenceEvent, ZoneTransition};
use crate::position::PositionSample;

/// Largest application payload accepted at every data rate
pub const MAX_PAYLOAD_SIZE: usize = 51;

/// Default application port (FPort) for tracker uplinks
pub const DEFAULT_PORT: u8 = 1;

/// Message type tag (first byte of every uplink)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Position = 0x01,
    GeofenceEvent = 0x02,
    Status = 0x03,
}

impl MessageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(MessageType::Position),
            0x02 => Some(MessageType::GeofenceEvent),
            0x03 => Some(MessageType::Status),
            _ => None,
        }
    }
}

const _: () = assert!(PositionSample::SIZE <= MAX_PAYLOAD_SIZE);
const _: () = assert!(GeofenceEvent::SIZE <= MAX_PAYLOAD_SIZE);
const _: () = assert!(StatusSummary::SIZE <= MAX_PAYLOAD_SIZE);

/// Returns the tagged body of `buf` if it has the expected tag and length
pub(crate) fn body(buf: &[u8], tag: MessageType, size: usize) -> Option<&[u8]> {
    if buf.len() != size || buf[0] != tag as u8 {
        return None;
    }
    Some(&buf[1..])
}

impl PositionSample {
    /// Encoded size in bytes
    pub const SIZE: usize = 13;

    /// Serialize as a position report (big-endian)
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = MessageType::Position as u8;
        buf[1..5].copy_from_slice(&self.latitude.to_be_bytes());
        buf[5..9].copy_from_slice(&self.longitude.to_be_bytes());
        buf[9..11].copy_from_slice(&self.altitude.to_be_bytes());
        buf[11] = self.satellites;
        buf[12] = self.hdop;
        buf
    }

    /// Deserialize a position report
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        let b = body(buf, MessageType::Position, Self::SIZE)?;
        Some(Self {
            latitude: i32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            longitude: i32::from_be_bytes([b[4], b[5], b[6], b[7]]),
            altitude: i16::from_be_bytes([b[8], b[9]]),
            satellites: b[10],
            hdop: b[11],
        })
    }
}

impl GeofenceEvent {
    /// Encoded size in bytes
    pub const SIZE: usize = 15;

    /// Serialize as a geofence event (big-endian)
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = MessageType::GeofenceEvent as u8;
        buf[1] = self.zone_id;
        buf[2] = self.kind as u8;
        buf[3..7].copy_from_slice(&self.latitude.to_be_bytes());
        buf[7..11].copy_from_slice(&self.longitude.to_be_bytes());
        buf[11..15].copy_from_slice(&self.timestamp.to_be_bytes());
        buf
    }

    /// Deserialize a geofence event. Unknown transition codes are rejected.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        let b = body(buf, MessageType::GeofenceEvent, Self::SIZE)?;
        Some(Self {
            zone_id: b[0],
            kind: ZoneTransition::from_u8(b[1])?,
            latitude: i32::from_be_bytes([b[2], b[3], b[4], b[5]]),
            longitude: i32::from_be_bytes([b[6], b[7], b[8], b[9]]),
            timestamp: u32::from_be_bytes([b[10], b[11], b[12], b[13]]),
        })
    }
}

/// Any decoded uplink
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uplink {
    Position(PositionSample),
    GeofenceEvent(GeofenceEvent),
    Status(StatusSummary),
}

impl Uplink {
    pub fn message_type(&self) -> MessageType {
        match self {
            Uplink::Position(_) => MessageType::Position,
            Uplink::GeofenceEvent(_) => MessageType::GeofenceEvent,
            Uplink::Status(_) => MessageType::Status,
        }
    }
}

/// Decode an uplink by its tag
pub fn decode(buf: &[u8]) -> Option<Uplink> {
    match MessageType::from_u8(*buf.first()?)? {
        MessageType::Position => PositionSample::from_bytes(buf).map(Uplink::Position),
        MessageType::GeofenceEvent => GeofenceEvent::from_bytes(buf).map(Uplink::GeofenceEvent),
        MessageType::Status => StatusSummary::from_bytes(buf).map(Uplink::Status),
    }
}
