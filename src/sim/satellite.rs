//! Gun satellites riding the gun orbits

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::orbit::{Orbit, OrbitId};
use super::walker::PathWalker;

pub type SatelliteId = u32;

/// Highest range upgrade a satellite can carry
pub const MAX_RANGE_LEVEL: u8 = 4;

/// Turret types a satellite can be fitted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GunKind {
    Rocketer,
    Gatling,
    Tesla,
    Prism,
    Radar,
}

/// Hands out per-kind turret levels in delivery order
#[derive(Debug, Clone, Default)]
pub struct GunLevels {
    issued: HashMap<GunKind, u32>,
}

impl GunLevels {
    pub fn next(&mut self, kind: GunKind) -> u32 {
        let level = self.issued.entry(kind).or_insert(0);
        *level += 1;
        *level
    }
}

/// What is mounted on a satellite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mount {
    Empty,
    /// A launch vehicle is bringing this gun
    Awaiting(GunKind),
    Armed { kind: GunKind, level: u32 },
}

/// A gun platform moving along a gun orbit
#[derive(Debug, Clone)]
pub struct Satellite {
    pub id: SatelliteId,
    pub orbit: OrbitId,
    walker: PathWalker,
    pub mount: Mount,
    pub range_level: u8,
}

impl Satellite {
    /// Place the `slot`-th of `count` satellites evenly around `orbit`
    pub fn new(id: SatelliteId, orbit: &Orbit, slot: usize, count: usize) -> Self {
        let index = if count == 0 {
            0
        } else {
            (orbit.len() as f32 / count as f32 * slot as f32).floor() as usize
        };
        Self {
            id,
            orbit: orbit.id,
            walker: PathWalker::new(orbit.path.clone(), index, orbit.speed),
            mount: Mount::Empty,
            range_level: 0,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.walker.index()
    }

    pub fn position(&self) -> Vec2 {
        self.walker.position()
    }

    pub fn scale(&self) -> f32 {
        self.walker.scale()
    }

    /// Order a gun; false if one is already fitted or on its way
    pub fn order_gun(&mut self, kind: GunKind) -> bool {
        if self.mount != Mount::Empty {
            return false;
        }
        self.mount = Mount::Awaiting(kind);
        true
    }

    /// Fit the awaited gun when its launch vehicle arrives
    pub fn install_gun(&mut self, levels: &mut GunLevels) -> Option<GunKind> {
        let Mount::Awaiting(kind) = self.mount else {
            return None;
        };
        let level = levels.next(kind);
        self.mount = Mount::Armed { kind, level };
        log::info!("Satellite {} armed with {:?} (level {})", self.id, kind, level);
        Some(kind)
    }

    /// Raise the range level; false once maxed out
    pub fn upgrade_range(&mut self) -> bool {
        if self.range_level >= MAX_RANGE_LEVEL {
            return false;
        }
        self.range_level += 1;
        true
    }

    pub fn tick(&mut self, delta_ms: f32) {
        self.walker.advance(delta_ms);
    }
}
