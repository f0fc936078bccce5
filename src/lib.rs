//! Orbital Defense - simulation core for an orbital tower-defense game
//!
//! Core modules:
//! - `sim`: Deterministic path-sampling motion (path tables, walkers, mines, enemies)
//! - `camera`: View transform with follow, shake, zoom and rotation
//! - `settings`: Data-driven configuration loaded from JSON
//! - `error`: Error types shared by the crate

pub mod camera;
pub mod error;
pub mod settings;
pub mod sim;

pub use camera::{Camera, CameraSpeeds, Viewport};
pub use error::{CoreError, CoreResult};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::TAU;

    /// Samples per world unit of arc length on generated orbits
    pub const ORBIT_SAMPLE_DENSITY: f32 = 1.0;
    /// Smallest visual scale of an object at the far (top) side of an orbit
    pub const OBJECT_MIN_SCALE: f32 = 0.6;

    /// Inner gun orbit
    pub const ORBIT_INNER_RADIUS: f32 = 180.0;
    pub const ORBIT_INNER_SPEED: f32 = 0.06;
    /// Mine orbit
    pub const ORBIT_MINES_RADIUS: f32 = 270.0;
    pub const ORBIT_MINES_SPEED: f32 = 0.05;
    /// Outer gun orbit
    pub const ORBIT_OUTER_RADIUS: f32 = 390.0;
    pub const ORBIT_OUTER_SPEED: f32 = 0.04;

    /// Reference radius for depth scaling (largest gun orbit)
    pub const DEPTH_MAX_RADIUS: f32 = if ORBIT_INNER_RADIUS > ORBIT_OUTER_RADIUS {
        ORBIT_INNER_RADIUS
    } else {
        ORBIT_OUTER_RADIUS
    };
    /// Scale gained per world unit of y
    pub const DEPTH_SCALE_RATE: f32 = (1.0 - OBJECT_MIN_SCALE) / (2.0 * DEPTH_MAX_RADIUS);

    /// Launch spiral shapes: (turns, materialized length ratio, engine drop ratio)
    pub const LAUNCH_INNER: (f32, f32, f32) = (1.7, 0.7, 0.4);
    pub const LAUNCH_MINES: (f32, f32, f32) = (1.5, 0.8, 0.3);
    pub const LAUNCH_OUTER: (f32, f32, f32) = (1.2, 0.9, 0.2);

    /// Launch vehicle speed ramp (samples/ms)
    pub const VEHICLE_START_SPEED: f32 = 0.001;
    pub const VEHICLE_MAX_SPEED: f32 = 0.2;
    /// Time to reach max speed (ms)
    pub const VEHICLE_RAMP_MS: f32 = 180.0;
    /// Mines dropped per delivery and their spacing on the orbit (samples)
    pub const MINES_PER_DELIVERY: usize = 3;
    pub const MINE_DELIVERY_SPACING: usize = 5;

    /// Mine catch-up behaviour
    pub const MINE_MAX_SPEED_MULTIPLIER: f32 = 3.0;
    /// Fraction of the orbit at which the mine reaches full catch-up speed
    pub const MINE_FULL_SPEED_DISTANCE_RATIO: f32 = 0.75;
    /// Fraction of the orbit inside which the mine starts braking
    pub const MINE_BRAKING_DISTANCE_RATIO: f32 = 0.1;
    /// Lowest brake ratio so a braking mine still gains on its slot
    pub const MINE_MIN_BRAKE_RATIO: f32 = 0.05;
    /// Speed multiplier smoothing rate (per ms)
    pub const MINE_ACCELERATION: f32 = 0.1;

    /// Planet and enemy geometry
    pub const PLANET_RADIUS: f32 = 80.0;
    pub const ORBIT_VIEW_OFFSET: f32 = 120.0;
    pub const ENEMY_SCALE_DOWN_RADIUS: f32 =
        PLANET_RADIUS + ((ORBIT_INNER_RADIUS - PLANET_RADIUS) * 0.5) as i32 as f32;
    pub const ENEMY_SCALE_UP_DISTANCE: f32 = ORBIT_VIEW_OFFSET * 2.0;
    pub const ENEMY_SPAWN_RADIUS: f32 =
        ORBIT_OUTER_RADIUS + ORBIT_VIEW_OFFSET * 2.0 + ENEMY_SCALE_UP_DISTANCE;
    pub const ENEMY_SCALE_UP_RADIUS: f32 = ENEMY_SPAWN_RADIUS - ENEMY_SCALE_UP_DISTANCE;
    /// Spawn sectors evenly spread over the full circle
    pub const ENEMY_SECTORS: usize = 21;
    pub const ENEMY_SECTOR_ANGLE: f32 = TAU / ENEMY_SECTORS as f32;
    /// Debris pieces per asteroid breakup
    pub const DEBRIS_PER_BREAKUP: usize = 5;

    /// Two-level view scale (diameter fitted to the viewport)
    pub const VIEW_SIZE_NEAR: f32 = (ORBIT_OUTER_RADIUS + ORBIT_VIEW_OFFSET) * 2.0;
    pub const VIEW_SIZE_FAR: f32 = (ORBIT_OUTER_RADIUS + ORBIT_VIEW_OFFSET) * 3.0;
    pub const VIEW_SCALE_SPEED: f32 = 0.0006;

    /// Camera defaults
    pub const CAMERA_MOVE_SPEED: f32 = 0.1;
    pub const CAMERA_ZOOM_SPEED: f32 = 0.001;
    pub const CAMERA_ROTATE_SPEED: f32 = 0.001;
    pub const CAMERA_RETURN_SPEED: f32 = 0.1;
    /// Follow gain growth per squared world unit of distance
    pub const CAMERA_FOLLOW_GAIN: f32 = 0.01;
    /// Follow distance below which the camera counts as on target
    pub const CAMERA_ON_TARGET_THRESHOLD: f32 = 1.0;
    pub const MIN_ZOOM: f32 = 0.1;
    pub const MAX_ZOOM: f32 = 10.0;

    /// Screen shake defaults
    pub const SHAKE_DEFAULT_DURATION: f32 = 1500.0;
    pub const SHAKE_DEFAULT_AMPLITUDE: f32 = 5.0;
    pub const SHAKE_DEFAULT_COUNT: f32 = 15.0;

    /// Longest frame delta fed to the simulation (ms)
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;
}

/// Normalized angle to [-π, π); non-finite input yields 0
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    if (-PI..PI).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for tiny negative remainders
    if wrapped >= PI { -PI } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Shorter of the two index distances between `a` and `b` on a closed table of `len` samples
#[inline]
pub fn circular_distance(a: usize, b: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let diff = a.abs_diff(b) % len;
    diff.min(len - diff)
}

/// Forward (direction of travel) index distance from `from` to `to` on a closed table
#[inline]
pub fn forward_distance(from: usize, to: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (to % len + len - from % len) % len
}
