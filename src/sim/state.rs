//! World state
//!
//! Everything a tick reads or writes lives here. Path tables are generated
//! once in [`GameState::new`] and shared by every walker afterwards.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Asteroid, Debris, EnemyBlueprint, EnemyId, Level};
use super::enemy_path::EnemyPathSet;
use super::events::{EventBus, GameEvent};
use super::mines::MineDispatcher;
use super::orbit::{OrbitId, OrbitSet};
use super::satellite::{GunKind, GunLevels, Satellite, SatelliteId};
use super::vehicle::{LaunchVehicle, Payload, VehicleId};
use crate::camera::{Camera, ShakeParams, ViewScale, Viewport};
use crate::consts::*;
use crate::error::CoreResult;
use crate::settings::Settings;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Planet integrity ran out
    GameOver,
}

#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    /// Simulated time (ms)
    pub time_ms: f64,
    pub time_ticks: u64,

    pub orbits: OrbitSet,
    pub enemy_paths: EnemyPathSet,
    pub level: Level,

    /// Sorted by id
    pub satellites: Vec<Satellite>,
    pub vehicles: Vec<LaunchVehicle>,
    pub mines: MineDispatcher,
    pub enemies: Vec<Asteroid>,
    pub debris: Vec<Debris>,

    pub gun_levels: GunLevels,
    pub planet_integrity: f32,

    pub camera: Camera,
    pub view_scale: ViewScale,
    pub events: EventBus,

    pub(crate) spawn_timer_ms: f32,
    pub(crate) spawn_interval_ms: f32,
    next_blueprint: usize,
    screen_shake: bool,
    next_id: u32,
}

impl GameState {
    /// Generate every path table and place the starting satellites and mines
    pub fn new(settings: &Settings, viewport: Viewport) -> CoreResult<Self> {
        let orbits = OrbitSet::standard()?;
        let enemy_paths = EnemyPathSet::standard()?;
        let camera = Camera::new(viewport, settings.camera_speeds())?;
        let view_scale = ViewScale::new(viewport.half_width * 2.0, viewport.half_height * 2.0);
        let mines = MineDispatcher::new(&orbits.mines);

        let mut state = Self {
            seed: settings.seed,
            rng: Pcg32::seed_from_u64(settings.seed),
            phase: GamePhase::Playing,
            time_ms: 0.0,
            time_ticks: 0,
            orbits,
            enemy_paths,
            level: Level::default(),
            satellites: Vec::new(),
            vehicles: Vec::new(),
            mines,
            enemies: Vec::new(),
            debris: Vec::new(),
            gun_levels: GunLevels::default(),
            planet_integrity: settings.planet_integrity,
            camera,
            view_scale,
            events: EventBus::new(),
            spawn_timer_ms: 0.0,
            spawn_interval_ms: settings.enemy_spawn_interval_ms.max(0.0),
            next_blueprint: 0,
            screen_shake: settings.effective_screen_shake(),
            next_id: 1,
        };

        for (orbit, count) in [
            (OrbitId::Inner, settings.satellites_inner),
            (OrbitId::Outer, settings.satellites_outer),
        ] {
            for slot in 0..count {
                let id = state.next_entity_id();
                let satellite = Satellite::new(id, state.orbits.get(orbit), slot, count);
                state.satellites.push(satellite);
            }
        }
        if settings.start_mines > 0 {
            state.mines.deliver(0, settings.start_mines, MINE_DELIVERY_SPACING);
        }

        log::info!(
            "World ready: seed {}, {} satellites, {} mines",
            state.seed,
            state.satellites.len(),
            state.mines.len()
        );
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn satellite(&self, id: SatelliteId) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.id == id)
    }

    pub fn satellite_mut(&mut self, id: SatelliteId) -> Option<&mut Satellite> {
        self.satellites.iter_mut().find(|s| s.id == id)
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Asteroid> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    fn launch(&mut self, orbit: OrbitId, payload: Payload) -> VehicleId {
        let id = self.next_entity_id();
        let vehicle = LaunchVehicle::new(id, self.orbits.get(orbit), payload);
        self.vehicles.push(vehicle);
        self.events.publish(GameEvent::VehicleLaunched { vehicle: id, orbit });
        id
    }

    /// Order a gun for a satellite and launch the vehicle carrying it
    pub fn order_gun(&mut self, satellite: SatelliteId, kind: GunKind) -> Option<VehicleId> {
        let target = self.satellite_mut(satellite)?;
        if !target.order_gun(kind) {
            log::debug!("Satellite {} already has a gun, order ignored", satellite);
            return None;
        }
        let orbit = target.orbit;
        Some(self.launch(orbit, Payload::Gun { satellite }))
    }

    /// Launch a batch of mines to the mine orbit
    pub fn order_mines(&mut self) -> VehicleId {
        self.launch(OrbitId::Mines, Payload::Mines { count: MINES_PER_DELIVERY })
    }

    /// Spawn the next enemy of the level on a random path of its tier
    pub fn spawn_enemy(&mut self) -> Option<EnemyId> {
        let blueprint: EnemyBlueprint = *self.level.enemies.get(self.next_blueprint)?;
        self.next_blueprint = (self.next_blueprint + 1) % self.level.enemies.len();

        let id = self.next_entity_id();
        let path = self.enemy_paths.pick(blueprint.tier, &mut self.rng)?;
        let enemy = Asteroid::spawn(id, &blueprint, path, &mut self.rng);
        self.enemies.push(enemy);
        self.events.publish(GameEvent::EnemySpawned { enemy: id, tier: blueprint.tier });
        Some(id)
    }

    /// Damage the planet; shakes the camera in proportion to the hit
    pub(crate) fn damage_planet(&mut self, enemy: EnemyId, damage: f32) {
        self.planet_integrity = (self.planet_integrity - damage).max(0.0);
        self.events.publish(GameEvent::PlanetHit {
            enemy,
            damage,
            integrity: self.planet_integrity,
        });

        if self.screen_shake {
            let intensity = (damage / 20.0).min(1.0);
            self.camera.shake(ShakeParams::new(
                800.0 + intensity * 700.0,
                3.0 + intensity * 7.0,
                10.0,
                false,
            ));
        }

        if self.planet_integrity <= 0.0 && self.phase != GamePhase::GameOver {
            log::info!("Planet destroyed after {:.1}s", self.time_ms / 1000.0);
            self.phase = GamePhase::GameOver;
        }
    }

    /// Whether shake is enabled for this run
    pub fn screen_shake_enabled(&self) -> bool {
        self.screen_shake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::satellite::Mount;

    fn world(settings: &Settings) -> GameState {
        GameState::new(settings, Viewport::new(400.0, 300.0).unwrap()).unwrap()
    }

    #[test]
    fn test_initial_world() {
        let state = world(&Settings::default());
        assert_eq!(state.satellites.len(), 14);
        assert_eq!(state.mines.len(), 3);
        assert_eq!(state.phase, GamePhase::Playing);
        let inner = state.satellites.iter().filter(|s| s.orbit == OrbitId::Inner).count();
        assert_eq!(inner, 5);
        // Ids are unique and ascending
        assert!(state.satellites.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_invalid_viewport_fails() {
        let viewport = Viewport {
            half_width: -5.0,
            half_height: 10.0,
        };
        assert!(GameState::new(&Settings::default(), viewport).is_err());
    }

    #[test]
    fn test_order_gun_once() {
        let mut state = world(&Settings::default());
        let id = state.satellites[2].id;
        assert!(state.order_gun(id, GunKind::Gatling).is_some());
        assert!(state.order_gun(id, GunKind::Prism).is_none());
        assert!(state.order_gun(9999, GunKind::Prism).is_none());
        assert_eq!(state.satellite(id).unwrap().mount, Mount::Awaiting(GunKind::Gatling));
        assert_eq!(state.vehicles.len(), 1);
        assert!(matches!(state.events.drain()[0], GameEvent::VehicleLaunched { .. }));
    }

    #[test]
    fn test_spawn_is_seed_deterministic() {
        let mut a = world(&Settings::default());
        let mut b = world(&Settings::default());
        for _ in 0..5 {
            a.spawn_enemy();
            b.spawn_enemy();
        }
        let ia: Vec<usize> = a.enemies.iter().map(|e| e.breakup_index()).collect();
        let ib: Vec<usize> = b.enemies.iter().map(|e| e.breakup_index()).collect();
        assert_eq!(ia, ib);
    }

    #[test]
    fn test_planet_damage_ends_game() {
        let settings = Settings {
            planet_integrity: 20.0,
            ..Settings::default()
        };
        let mut state = world(&settings);
        state.damage_planet(1, 12.0);
        assert!(state.camera.is_shaking());
        assert_eq!(state.phase, GamePhase::Playing);
        state.damage_planet(2, 12.0);
        assert_eq!(state.planet_integrity, 0.0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut state = world(&settings);
        state.damage_planet(1, 12.0);
        assert!(!state.camera.is_shaking());
    }
}
