//! Launch vehicles
//!
//! A vehicle accelerates along its orbit's launch spiral, drops its booster
//! at the engine separation index, then joins the orbit at the spiral's
//! nearest orbit sample. Gun carriers chase their satellite around the
//! orbit; mine carriers release their mines as soon as they are inserted.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::intercept::{StepOutcome, resolve_step};
use super::orbit::{Orbit, OrbitId};
use super::path::PathTable;
use super::satellite::SatelliteId;
use super::walker::{PathWalker, SpeedRamp};
use crate::consts::*;

pub type VehicleId = u32;

/// What a vehicle is carrying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// A gun for the given satellite
    Gun { satellite: SatelliteId },
    /// A batch of mines dropped at orbit insertion
    Mines { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPhase {
    Launch,
    Orbit,
    Done,
}

/// Things that happened to a vehicle during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VehicleEvent {
    /// The booster detached; it falls back toward the planet from here
    EngineSeparated { position: Vec2, scale: f32, rotation: f32 },
    /// Switched from the launch spiral onto the orbit
    Inserted { orbit_index: usize },
    /// Payload delivered at `orbit_index`
    Delivered { orbit_index: usize },
    /// Target disappeared before delivery
    Aborted,
}

#[derive(Debug, Clone)]
pub struct LaunchVehicle {
    pub id: VehicleId,
    pub orbit: OrbitId,
    pub payload: Payload,
    walker: PathWalker,
    orbit_path: Arc<PathTable>,
    nearest_orbit_index: usize,
    engine_drop_index: usize,
    ramp: SpeedRamp,
    has_engine: bool,
    phase: FlightPhase,
}

impl LaunchVehicle {
    pub fn new(id: VehicleId, orbit: &Orbit, payload: Payload) -> Self {
        let ramp = SpeedRamp::over(VEHICLE_START_SPEED, VEHICLE_MAX_SPEED, VEHICLE_RAMP_MS);
        Self {
            id,
            orbit: orbit.id,
            payload,
            walker: PathWalker::new(orbit.launch.path.clone(), 0, ramp.start),
            orbit_path: orbit.path.clone(),
            nearest_orbit_index: orbit.launch.nearest_orbit_index,
            engine_drop_index: orbit.launch.engine_drop_index,
            ramp,
            has_engine: true,
            phase: FlightPhase::Launch,
        }
    }

    #[inline]
    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    #[inline]
    pub fn has_engine(&self) -> bool {
        self.has_engine
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.walker.index()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.walker.speed
    }

    pub fn position(&self) -> Vec2 {
        self.walker.position()
    }

    pub fn scale(&self) -> f32 {
        self.walker.scale()
    }

    pub fn rotation(&self) -> f32 {
        self.walker.rotation()
    }

    /// Advance one tick. `target_index` is the current orbit index of the
    /// satellite a gun carrier is chasing (`None` if it no longer exists).
    pub fn tick(&mut self, delta_ms: f32, target_index: Option<usize>) -> Vec<VehicleEvent> {
        let mut events = Vec::new();
        match self.phase {
            FlightPhase::Launch => self.fly_launch(delta_ms, target_index, &mut events),
            FlightPhase::Orbit => self.fly_orbit(delta_ms, target_index, &mut events),
            FlightPhase::Done => {}
        }
        events
    }

    fn fly_launch(
        &mut self,
        delta_ms: f32,
        target_index: Option<usize>,
        events: &mut Vec<VehicleEvent>,
    ) {
        // Ramp before moving so acceleration tracks elapsed time
        self.walker.speed = self.ramp.step(self.walker.speed, delta_ms);
        self.walker.advance(delta_ms);

        if self.has_engine && self.walker.index() > self.engine_drop_index {
            self.has_engine = false;
            events.push(VehicleEvent::EngineSeparated {
                position: self.walker.position(),
                scale: self.walker.scale(),
                rotation: self.walker.rotation(),
            });
        }

        if !self.walker.is_finished() {
            return;
        }

        // Samples walked past the spiral end continue on the orbit, where they
        // may already sweep over the target satellite
        let overflow = self.walker.index() - self.walker.table().len();
        let orbit_len = self.orbit_path.len();
        let target = match self.payload {
            Payload::Gun { .. } => target_index,
            Payload::Mines { .. } => None,
        };
        let outcome = match target {
            Some(target) => resolve_step(orbit_len, self.nearest_orbit_index, overflow, target),
            None => StepOutcome::Moved {
                index: self.nearest_orbit_index + overflow % orbit_len.max(1),
            },
        };
        self.walker.switch_table(self.orbit_path.clone(), outcome.index());
        self.phase = FlightPhase::Orbit;
        let orbit_index = self.walker.index();
        events.push(VehicleEvent::Inserted { orbit_index });

        if let StepOutcome::Intercepted { index, overshoot } = outcome {
            self.walker.snap_to(index, overshoot);
            self.phase = FlightPhase::Done;
            events.push(VehicleEvent::Delivered { orbit_index: index });
        } else if let Payload::Mines { .. } = self.payload {
            self.phase = FlightPhase::Done;
            events.push(VehicleEvent::Delivered { orbit_index });
        }
    }

    fn fly_orbit(
        &mut self,
        delta_ms: f32,
        target_index: Option<usize>,
        events: &mut Vec<VehicleEvent>,
    ) {
        let Some(target) = target_index else {
            log::warn!("Vehicle {} lost its target, aborting", self.id);
            self.phase = FlightPhase::Done;
            events.push(VehicleEvent::Aborted);
            return;
        };

        let len = self.walker.table().len();
        let steps = self.walker.take_steps(delta_ms);
        match resolve_step(len, self.walker.index(), steps, target) {
            StepOutcome::Intercepted { index, overshoot } => {
                self.walker.snap_to(index, overshoot);
                self.phase = FlightPhase::Done;
                events.push(VehicleEvent::Delivered { orbit_index: index });
            }
            StepOutcome::Moved { index } => self.walker.set_index(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::orbit::OrbitSet;
    use crate::sim::satellite::Satellite;

    #[test]
    fn test_speed_ramps_before_moving() {
        let orbits = OrbitSet::standard().unwrap();
        let mut vehicle = LaunchVehicle::new(1, &orbits.inner, Payload::Mines { count: 3 });
        vehicle.tick(16.0, None);
        let expected = VEHICLE_START_SPEED
            + (VEHICLE_MAX_SPEED - VEHICLE_START_SPEED) / VEHICLE_RAMP_MS * 16.0;
        assert!((vehicle.speed() - expected).abs() < 1e-6);
        for _ in 0..20 {
            vehicle.tick(16.0, None);
        }
        assert_eq!(vehicle.speed(), VEHICLE_MAX_SPEED);
    }

    #[test]
    fn test_flight_to_satellite() {
        let orbits = OrbitSet::standard().unwrap();
        let mut sat = Satellite::new(7, &orbits.inner, 2, 5);
        let mut vehicle = LaunchVehicle::new(1, &orbits.inner, Payload::Gun { satellite: sat.id });

        let mut seen = Vec::new();
        for _ in 0..10_000 {
            sat.tick(16.0);
            for event in vehicle.tick(16.0, Some(sat.index())) {
                seen.push(event);
            }
            if vehicle.phase() == FlightPhase::Done {
                break;
            }
        }

        assert!(matches!(seen[0], VehicleEvent::EngineSeparated { .. }));
        assert!(matches!(seen[1], VehicleEvent::Inserted { .. }));
        assert_eq!(seen.last(), Some(&VehicleEvent::Delivered { orbit_index: sat.index() }));
        assert!(!vehicle.has_engine());
    }

    #[test]
    fn test_insertion_at_nearest_orbit_point() {
        let orbits = OrbitSet::standard().unwrap();
        let mut vehicle = LaunchVehicle::new(1, &orbits.mines, Payload::Mines { count: 3 });
        let mut inserted = None;
        for _ in 0..10_000 {
            for event in vehicle.tick(16.0, None) {
                if let VehicleEvent::Inserted { orbit_index } = event {
                    inserted = Some(orbit_index);
                }
            }
            if vehicle.phase() == FlightPhase::Done {
                break;
            }
        }
        let index = inserted.unwrap();
        let nearest = orbits.mines.launch.nearest_orbit_index;
        // At most one tick of overflow past the spiral end
        assert!(crate::forward_distance(nearest, index, orbits.mines.len()) <= 4);
    }

    /// Vehicle one sample before the spiral end at full speed
    fn vehicle_at_spiral_end(orbits: &OrbitSet) -> LaunchVehicle {
        let mut vehicle = LaunchVehicle::new(1, &orbits.inner, Payload::Gun { satellite: 7 });
        let end = vehicle.walker.table().len() - 1;
        vehicle.walker.set_index(end);
        vehicle.walker.speed = VEHICLE_MAX_SPEED;
        vehicle.has_engine = false;
        vehicle
    }

    #[test]
    fn test_delivers_to_target_swept_during_insertion() {
        let orbits = OrbitSet::standard().unwrap();
        let len = orbits.inner.len();
        let nearest = orbits.inner.launch.nearest_orbit_index;
        let target = (nearest + 3) % len;
        let mut vehicle = vehicle_at_spiral_end(&orbits);

        // 30 ms at 0.2 samples/ms is 6 steps, 5 of them past the spiral end
        let events = vehicle.tick(30.0, Some(target));
        assert_eq!(
            events,
            vec![
                VehicleEvent::Inserted { orbit_index: target },
                VehicleEvent::Delivered { orbit_index: target },
            ]
        );
        assert_eq!(vehicle.phase(), FlightPhase::Done);
        assert_eq!(vehicle.index(), target);
    }

    #[test]
    fn test_insertion_past_target_keeps_chasing() {
        let orbits = OrbitSet::standard().unwrap();
        let len = orbits.inner.len();
        let nearest = orbits.inner.launch.nearest_orbit_index;
        let mut vehicle = vehicle_at_spiral_end(&orbits);

        let events = vehicle.tick(30.0, Some((nearest + 10) % len));
        assert_eq!(events, vec![VehicleEvent::Inserted { orbit_index: (nearest + 5) % len }]);
        assert_eq!(vehicle.phase(), FlightPhase::Orbit);
    }

    #[test]
    fn test_lost_target_aborts() {
        let orbits = OrbitSet::standard().unwrap();
        let mut vehicle = LaunchVehicle::new(1, &orbits.outer, Payload::Gun { satellite: 3 });
        let mut last = Vec::new();
        for _ in 0..10_000 {
            last = vehicle.tick(16.0, None);
            if vehicle.phase() == FlightPhase::Done {
                break;
            }
        }
        assert_eq!(last, vec![VehicleEvent::Aborted]);
    }
}
