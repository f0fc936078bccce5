//! Orbit and launch spiral generation
//!
//! Orbits are closed circles sampled once per world unit of arc length, so
//! a speed in samples/ms looks the same on every radius. Launch spirals are
//! open Archimedean spirals ending on their orbit; only the outer part is
//! kept so the vehicle enters from off-screen already moving.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::path::{PathKind, PathSample, PathTable};
use crate::consts::*;
use crate::error::CoreResult;

/// Near/far depth scaling against a fixed perspective
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthScale {
    pub max_radius: f32,
    pub min_scale: f32,
}

impl DepthScale {
    pub fn standard() -> Self {
        Self {
            max_radius: DEPTH_MAX_RADIUS,
            min_scale: OBJECT_MIN_SCALE,
        }
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        (1.0 - self.min_scale) / (2.0 * self.max_radius)
    }

    /// Visual scale of an object at height `y`
    #[inline]
    pub fn scale_at(&self, y: f32) -> f32 {
        (y + self.max_radius) * self.rate() + self.min_scale
    }
}

/// Closed circular path with `ceil(TAU * radius * density)` samples
pub fn generate_circular_path(
    radius: f32,
    density: f32,
    depth: &DepthScale,
) -> CoreResult<PathTable> {
    if !(radius > 0.0 && density > 0.0) {
        log::warn!("Degenerate orbit (radius {}, density {}), using empty path", radius, density);
        return Ok(PathTable::empty(PathKind::Closed));
    }

    let count = (TAU * radius * density).ceil() as usize;
    let samples = (0..count)
        .map(|i| {
            let angle = (i as f32 / count as f32) * TAU;
            let x = angle.cos() * radius;
            let y = angle.sin() * radius;
            PathSample::new(x, y, depth.scale_at(y), angle + FRAC_PI_2)
        })
        .collect();

    PathTable::new(PathKind::Closed, samples)
}

/// Shape parameters of a launch spiral
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchShape {
    /// Revolutions of the full spiral from the planet center
    pub turns: f32,
    /// Outer fraction of the full spiral that is materialized
    pub length_ratio: f32,
    /// Position of engine separation as a fraction of the materialized length
    pub engine_drop_ratio: f32,
}

impl From<(f32, f32, f32)> for LaunchShape {
    fn from((turns, length_ratio, engine_drop_ratio): (f32, f32, f32)) -> Self {
        Self {
            turns,
            length_ratio,
            engine_drop_ratio,
        }
    }
}

/// Injection trajectory onto an orbit
#[derive(Debug, Clone)]
pub struct LaunchSpiral {
    pub path: Arc<PathTable>,
    /// Sample index where the booster separates
    pub engine_drop_index: usize,
    /// Orbit sample closest to the spiral terminus, where the vehicle switches tables
    pub nearest_orbit_index: usize,
}

impl LaunchSpiral {
    fn empty() -> Self {
        Self {
            path: Arc::new(PathTable::empty(PathKind::Open)),
            engine_drop_index: 0,
            nearest_orbit_index: 0,
        }
    }
}

/// Build the launch spiral reaching `destination` (an orbit of `radius`)
pub fn generate_launch_spiral(
    destination: &PathTable,
    radius: f32,
    shape: LaunchShape,
    depth: &DepthScale,
) -> CoreResult<LaunchSpiral> {
    let spiral_length = TAU * radius * shape.turns;
    if !(spiral_length > 0.0) || destination.is_empty() {
        log::warn!("Degenerate launch spiral (radius {}, turns {})", radius, shape.turns);
        return Ok(LaunchSpiral::empty());
    }

    let full_count = spiral_length.ceil() as usize;
    let count = ((full_count as f32 * shape.length_ratio.clamp(0.0, 1.0)).ceil() as usize)
        .min(full_count);
    if count == 0 {
        log::warn!("Launch spiral length ratio {} leaves no samples", shape.length_ratio);
        return Ok(LaunchSpiral::empty());
    }
    let start = full_count - count;
    let engine_drop_index =
        (count as f32 * shape.engine_drop_ratio.clamp(0.0, 1.0)).floor() as usize;

    let point_at = |i: usize| {
        let progress = (start + i) as f32 / full_count as f32;
        let spiral_angle = progress * shape.turns * TAU;
        let r = progress * radius;
        (spiral_angle.cos() * r, spiral_angle.sin() * r, spiral_angle)
    };

    // Scale ramps from 0 to the terminus scale over twice the engine drop index
    let (_, last_y, _) = point_at(count - 1);
    let target_scale = depth.scale_at(last_y);
    let step_scale = if engine_drop_index > 0 {
        target_scale / (engine_drop_index * 2) as f32
    } else {
        target_scale
    };

    let samples: Vec<PathSample> = (0..count)
        .map(|i| {
            let (x, y, spiral_angle) = point_at(i);
            let scale = target_scale.min(i as f32 * step_scale);
            PathSample::new(x, y, scale, spiral_angle + FRAC_PI_2)
        })
        .collect();

    let path = PathTable::new(PathKind::Open, samples)?;
    let nearest_orbit_index = path
        .get(count - 1)
        .and_then(|last| destination.nearest_index(last.position()))
        .unwrap_or(0);

    Ok(LaunchSpiral {
        path: Arc::new(path),
        engine_drop_index,
        nearest_orbit_index,
    })
}

/// Which of the standard orbits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitId {
    Inner,
    Mines,
    Outer,
}

/// Circular track plus its launch spiral
#[derive(Debug, Clone)]
pub struct Orbit {
    pub id: OrbitId,
    pub radius: f32,
    /// Base walking speed in samples/ms
    pub speed: f32,
    pub path: Arc<PathTable>,
    pub launch: LaunchSpiral,
}

impl Orbit {
    pub fn generate(
        id: OrbitId,
        radius: f32,
        speed: f32,
        shape: LaunchShape,
        depth: &DepthScale,
    ) -> CoreResult<Self> {
        let path = generate_circular_path(radius, ORBIT_SAMPLE_DENSITY, depth)?;
        let launch = generate_launch_spiral(&path, radius, shape, depth)?;
        Ok(Self {
            id,
            radius,
            speed,
            path: Arc::new(path),
            launch,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// The three orbits of a level, generated once at startup
#[derive(Debug, Clone)]
pub struct OrbitSet {
    pub inner: Orbit,
    pub mines: Orbit,
    pub outer: Orbit,
}

impl OrbitSet {
    pub fn standard() -> CoreResult<Self> {
        let depth = DepthScale::standard();
        let set = Self {
            inner: Orbit::generate(
                OrbitId::Inner,
                ORBIT_INNER_RADIUS,
                ORBIT_INNER_SPEED,
                LAUNCH_INNER.into(),
                &depth,
            )?,
            mines: Orbit::generate(
                OrbitId::Mines,
                ORBIT_MINES_RADIUS,
                ORBIT_MINES_SPEED,
                LAUNCH_MINES.into(),
                &depth,
            )?,
            outer: Orbit::generate(
                OrbitId::Outer,
                ORBIT_OUTER_RADIUS,
                ORBIT_OUTER_SPEED,
                LAUNCH_OUTER.into(),
                &depth,
            )?,
        };
        log::info!(
            "Orbits generated: inner={} mines={} outer={} samples",
            set.inner.len(),
            set.mines.len(),
            set.outer.len()
        );
        Ok(set)
    }

    pub fn get(&self, id: OrbitId) -> &Orbit {
        match id {
            OrbitId::Inner => &self.inner,
            OrbitId::Mines => &self.mines,
            OrbitId::Outer => &self.outer,
        }
    }
}
