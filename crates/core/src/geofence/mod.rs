//! Geofence hysteresis engine
//!
//! Turns a stream of position fixes into debounced ENTER/EXIT events for up
//! to [`MAX_ZONES`] circular zones.
//!
//! # Commit rules
//!
//! For a zone of radius `R` and hysteresis margin `M`:
//!
//! - outside → inside commits only when `distance <= R - M`
//! - inside → outside commits only when `distance > R + M`
//! - inside the band `(R - M, R + M]` the committed state is kept
//!
//! Every zone starts outside. Zones are scanned in ascending id order and the
//! first zone whose state flips produces the single event of the call; later
//! zones are picked up on the next call.

pub mod error;
pub mod event;
pub mod geo;
pub mod zone;

pub use error::GeofenceError;
pub use event::{GeofenceEvent, ZoneTransition};
pub use geo::haversine_distance;
pub use zone::{GeofenceZone, MAX_ZONES};

use crate::position::PositionSample;

/// Default hysteresis margin (m)
pub const DEFAULT_HYSTERESIS_M: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
struct ZoneSlot {
    zone: GeofenceZone,
    inside: bool,
}

/// Per-zone hysteresis state machine
#[derive(Debug, Clone)]
pub struct GeofenceEngine {
    slots: [Option<ZoneSlot>; MAX_ZONES],
    hysteresis_m: f32,
}

impl GeofenceEngine {
    /// Create an engine with no zones. Negative margins are treated as zero.
    pub fn new(hysteresis_m: f32) -> Self {
        Self {
            slots: [None; MAX_ZONES],
            hysteresis_m: hysteresis_m.max(0.0),
        }
    }

    /// Install a zone in the slot named by its id
    ///
    /// A radius of zero reserves the slot without monitoring it.
    ///
    /// # Errors
    ///
    /// - [`GeofenceError::Capacity`] if the id is outside `0..MAX_ZONES`
    /// - [`GeofenceError::DuplicateZone`] if the slot is occupied
    /// - [`GeofenceError::InvalidRadius`] for negative or non-finite radii
    pub fn add_zone(&mut self, zone: GeofenceZone) -> Result<(), GeofenceError> {
        if !zone.radius_m.is_finite() || zone.radius_m < 0.0 {
            return Err(GeofenceError::InvalidRadius);
        }
        let slot = self
            .slots
            .get_mut(zone.id as usize)
            .ok_or(GeofenceError::Capacity)?;
        if slot.is_some() {
            return Err(GeofenceError::DuplicateZone);
        }
        *slot = Some(ZoneSlot {
            zone,
            inside: false,
        });
        Ok(())
    }

    /// Install a zone in the lowest free slot and return its id
    pub fn push_zone(
        &mut self,
        latitude: f64,
        longitude: f64,
        radius_m: f32,
    ) -> Result<u8, GeofenceError> {
        let id = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(GeofenceError::Capacity)? as u8;
        self.add_zone(GeofenceZone::new(id, latitude, longitude, radius_m))?;
        Ok(id)
    }

    /// Remove a zone, returning it if it was configured
    pub fn remove_zone(&mut self, id: u8) -> Option<GeofenceZone> {
        self.slots
            .get_mut(id as usize)
            .and_then(Option::take)
            .map(|slot| slot.zone)
    }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_ZONES];
    }

    pub fn zone(&self, id: u8) -> Option<&GeofenceZone> {
        self.slot(id).map(|slot| &slot.zone)
    }

    /// Configured zones in ascending id order
    pub fn zones(&self) -> impl Iterator<Item = &GeofenceZone> {
        self.slots.iter().flatten().map(|slot| &slot.zone)
    }

    pub fn zone_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Committed state of a zone (`false` for unknown ids)
    pub fn is_inside(&self, id: u8) -> bool {
        self.slot(id).map(|slot| slot.inside).unwrap_or(false)
    }

    /// Distance in meters from a fix to a zone center
    pub fn distance_to(&self, id: u8, sample: &PositionSample) -> Option<f64> {
        self.zone(id).map(|zone| distance(zone, sample))
    }

    pub fn hysteresis(&self) -> f32 {
        self.hysteresis_m
    }

    pub fn set_hysteresis(&mut self, hysteresis_m: f32) {
        self.hysteresis_m = hysteresis_m.max(0.0);
    }

    /// Feed one fix; returns the first zone transition it commits, if any
    ///
    /// Callers must only pass fixes that passed the
    /// [`FixFilter`](crate::position::FixFilter).
    pub fn evaluate(&mut self, sample: &PositionSample, timestamp: u32) -> Option<GeofenceEvent> {
        let margin = f64::from(self.hysteresis_m);

        for slot in self.slots.iter_mut().flatten() {
            if !slot.zone.is_configured() {
                continue;
            }

            let radius = f64::from(slot.zone.radius_m);
            let d = distance(&slot.zone, sample);

            let kind = if !slot.inside && d <= radius - margin {
                ZoneTransition::Enter
            } else if slot.inside && d > radius + margin {
                ZoneTransition::Exit
            } else {
                continue;
            };

            slot.inside = kind == ZoneTransition::Enter;
            return Some(GeofenceEvent {
                zone_id: slot.zone.id,
                kind,
                latitude: sample.latitude,
                longitude: sample.longitude,
                timestamp,
            });
        }

        None
    }

    fn slot(&self, id: u8) -> Option<&ZoneSlot> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }
}

impl Default for GeofenceEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HYSTERESIS_M)
    }
}

fn distance(zone: &GeofenceZone, sample: &PositionSample) -> f64 {
    haversine_distance(
        zone.latitude,
        zone.longitude,
        sample.latitude_deg(),
        sample.longitude_deg(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER_LAT: f64 = -33.4489;
    const CENTER_LON: f64 = -70.6693;
    const RADIUS: f32 = 50.0;
    const MARGIN: f32 = 2.0;

    /// Fix `meters` due north of the test zone center
    fn north_of_center(meters: f64) -> PositionSample {
        PositionSample::from_degrees(
            CENTER_LAT + meters / geo::meters_per_degree_lat(),
            CENTER_LON,
            520,
            8,
            12,
        )
    }

    fn engine_with_zone() -> GeofenceEngine {
        let mut engine = GeofenceEngine::new(MARGIN);
        engine
            .add_zone(GeofenceZone::new(0, CENTER_LAT, CENTER_LON, RADIUS))
            .unwrap();
        engine
    }

    fn r(offset: f32) -> f64 {
        f64::from(RADIUS + offset)
    }

    #[test]
    fn test_enter_band_exit_sequence() {
        let mut engine = engine_with_zone();

        assert_eq!(engine.evaluate(&north_of_center(r(MARGIN + 1.0)), 1), None);

        let enter = engine
            .evaluate(&north_of_center(r(-MARGIN - 1.0)), 2)
            .unwrap();
        assert_eq!(enter.kind, ZoneTransition::Enter);
        assert_eq!(enter.zone_id, 0);
        assert_eq!(enter.timestamp, 2);

        assert_eq!(engine.evaluate(&north_of_center(r(MARGIN - 1.0)), 3), None);
        assert!(engine.is_inside(0));

        let exit = engine
            .evaluate(&north_of_center(r(MARGIN + 1.0)), 4)
            .unwrap();
        assert_eq!(exit.kind, ZoneTransition::Exit);
        assert!(!engine.is_inside(0));
    }

    #[test]
    fn test_band_edge_sequence_commits_single_enter() {
        // R+M+1, R-1, R+M-1, R-M-1: R-1 sits inside the band so only the
        // last fix is deep enough to commit.
        let mut engine = engine_with_zone();
        let distances = [r(MARGIN + 1.0), r(-1.0), r(MARGIN - 1.0), r(-MARGIN - 1.0)];

        let mut events = heapless::Vec::<(usize, GeofenceEvent), 4>::new();
        for (i, d) in distances.iter().enumerate() {
            if let Some(event) = engine.evaluate(&north_of_center(*d), i as u32) {
                events.push((i, event)).unwrap();
            }
        }

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, 3);
        assert_eq!(events[0].1.kind, ZoneTransition::Enter);
    }

    #[test]
    fn test_oscillation_inside_band_is_silent() {
        let mut engine = engine_with_zone();
        for i in 0..20 {
            let offset = if i % 2 == 0 { 1.5 } else { -1.5 };
            assert_eq!(engine.evaluate(&north_of_center(r(offset)), i), None);
        }
        assert!(!engine.is_inside(0));
    }

    #[test]
    fn test_first_fix_deep_inside_enters() {
        let mut engine = engine_with_zone();
        let event = engine.evaluate(&north_of_center(0.0), 7).unwrap();
        assert_eq!(event.kind, ZoneTransition::Enter);
        assert_eq!(event.latitude, north_of_center(0.0).latitude);
    }

    #[test]
    fn test_one_event_per_call_in_id_order() {
        let mut engine = GeofenceEngine::new(MARGIN);
        engine
            .add_zone(GeofenceZone::new(3, CENTER_LAT, CENTER_LON, 100.0))
            .unwrap();
        engine
            .add_zone(GeofenceZone::new(1, CENTER_LAT, CENTER_LON, 100.0))
            .unwrap();

        let fix = north_of_center(0.0);
        assert_eq!(engine.evaluate(&fix, 0).unwrap().zone_id, 1);
        assert_eq!(engine.evaluate(&fix, 1).unwrap().zone_id, 3);
        assert_eq!(engine.evaluate(&fix, 2), None);
    }

    #[test]
    fn test_zero_radius_zone_skipped() {
        let mut engine = GeofenceEngine::new(MARGIN);
        engine
            .add_zone(GeofenceZone::new(0, CENTER_LAT, CENTER_LON, 0.0))
            .unwrap();
        assert_eq!(engine.evaluate(&north_of_center(0.0), 0), None);
        assert_eq!(engine.zone_count(), 1);
    }

    #[test]
    fn test_add_zone_errors() {
        let mut engine = engine_with_zone();
        assert_eq!(
            engine.add_zone(GeofenceZone::new(0, 0.0, 0.0, 10.0)),
            Err(GeofenceError::DuplicateZone)
        );
        assert_eq!(
            engine.add_zone(GeofenceZone::new(MAX_ZONES as u8, 0.0, 0.0, 10.0)),
            Err(GeofenceError::Capacity)
        );
        assert_eq!(
            engine.add_zone(GeofenceZone::new(1, 0.0, 0.0, -1.0)),
            Err(GeofenceError::InvalidRadius)
        );
        assert_eq!(
            engine.add_zone(GeofenceZone::new(1, 0.0, 0.0, f32::NAN)),
            Err(GeofenceError::InvalidRadius)
        );
    }

    #[test]
    fn test_push_zone_fills_lowest_slot() {
        let mut engine = GeofenceEngine::default();
        for expected in 0..MAX_ZONES as u8 {
            assert_eq!(engine.push_zone(0.0, 0.0, 10.0), Ok(expected));
        }
        assert_eq!(engine.push_zone(0.0, 0.0, 10.0), Err(GeofenceError::Capacity));

        engine.remove_zone(2).unwrap();
        assert_eq!(engine.push_zone(1.0, 1.0, 10.0), Ok(2));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut engine = engine_with_zone();
        engine.evaluate(&north_of_center(0.0), 0).unwrap();
        assert!(engine.is_inside(0));

        let removed = engine.remove_zone(0).unwrap();
        assert_eq!(removed.radius_m, RADIUS);
        assert!(!engine.is_inside(0));
        assert_eq!(engine.remove_zone(0), None);

        engine.push_zone(0.0, 0.0, 10.0).unwrap();
        engine.clear();
        assert_eq!(engine.zones().count(), 0);
    }

    #[test]
    fn test_distance_to() {
        let engine = engine_with_zone();
        let d = engine.distance_to(0, &north_of_center(30.0)).unwrap();
        assert!((d - 30.0).abs() < 0.2);
        assert_eq!(engine.distance_to(4, &north_of_center(30.0)), None);
    }

    #[test]
    fn test_set_hysteresis_widens_band() {
        let mut engine = engine_with_zone();
        engine.set_hysteresis(10.0);
        assert_eq!(engine.evaluate(&north_of_center(r(-5.0)), 0), None);
        assert!(engine.evaluate(&north_of_center(r(-11.0)), 1).is_some());

        engine.set_hysteresis(-3.0);
        assert_eq!(engine.hysteresis(), 0.0);
    }
}
