//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Path tables generated once, shared read-only afterwards
//! - Seeded RNG only
//! - Fixed system order within a tick
//! - No rendering or platform dependencies

pub mod clock;
pub mod enemy;
pub mod enemy_path;
pub mod events;
pub mod intercept;
pub mod mines;
pub mod orbit;
pub mod path;
pub mod satellite;
pub mod state;
pub mod tick;
pub mod vehicle;
pub mod walker;

pub use clock::FrameClock;
pub use enemy::{Asteroid, Debris, EnemyBlueprint, EnemyId, EnemyOutcome, Level};
pub use enemy_path::{EnemyPath, EnemyPathSet, EnemyTier, generate_enemy_path};
pub use events::{EventBus, GameEvent, Topic};
pub use intercept::{StepOutcome, arc_contains, resolve_step};
pub use mines::{Assignment, Mine, MineDispatcher, MineId};
pub use orbit::{
    DepthScale, LaunchShape, LaunchSpiral, Orbit, OrbitId, OrbitSet, generate_circular_path,
    generate_launch_spiral,
};
pub use path::{PathKind, PathSample, PathTable};
pub use satellite::{GunKind, GunLevels, Mount, Satellite, SatelliteId};
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, awaiting_satellites, tick};
pub use vehicle::{FlightPhase, LaunchVehicle, Payload, VehicleEvent, VehicleId};
pub use walker::{PathWalker, SpeedRamp};
