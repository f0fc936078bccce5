//! Asteroids and the debris they break into

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy_path::{EnemyPath, EnemyTier};
use super::walker::PathWalker;
use crate::consts::*;

pub type EnemyId = u32;

/// Smallest sample scale used to drive fade-in motion
const MIN_FADE_SCALE: f32 = 0.01;
/// Fade-in ends once the path scale passes this
const FADE_IN_END_SCALE: f32 = 0.995;
/// Shrink rate for debris that misses the planet (per world unit)
const DEBRIS_FALLBACK_SHRINK: f32 = 0.0006;

/// Per-level description of an enemy wave member
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyBlueprint {
    pub hp: f32,
    /// Upper bound of the path speed (samples/ms); the actual speed is drawn
    /// from `[speed/2, speed)`
    pub speed: f32,
    pub tier: EnemyTier,
    /// Planet damage on impact
    pub damage: f32,
}

impl Default for EnemyBlueprint {
    fn default() -> Self {
        Self {
            hp: 50.0,
            speed: 0.1,
            tier: EnemyTier::Long,
            damage: 12.0,
        }
    }
}

/// Enemies a level spawns, cycled in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub enemies: Vec<EnemyBlueprint>,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            enemies: vec![EnemyBlueprint::default()],
        }
    }
}

/// How an asteroid's flight ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyOutcome {
    /// Broke up in space; debris flies off in `directions`
    Breakup {
        position: Vec2,
        scale: f32,
        directions: Vec<f32>,
    },
    /// Reached the end of its path
    Impact { position: Vec2, damage: f32 },
}

/// An asteroid spiralling in along an enemy path
#[derive(Debug, Clone)]
pub struct Asteroid {
    pub id: EnemyId,
    pub tier: EnemyTier,
    walker: PathWalker,
    hp: f32,
    damage: f32,
    max_scale: f32,
    breakup_index: usize,
    fading_in: bool,
}

impl Asteroid {
    pub fn spawn<R: Rng>(
        id: EnemyId,
        blueprint: &EnemyBlueprint,
        path: &EnemyPath,
        rng: &mut R,
    ) -> Self {
        let len = path.path.len();
        let speed = if blueprint.speed > 0.0 {
            rng.random_range(blueprint.speed * 0.5..blueprint.speed)
        } else {
            0.0
        };
        let max_scale = rng.random_range(0.5..1.0);
        let jitter = if len > 0 { rng.random_range(0..len) } else { 0 };
        let breakup_index = (len as f32 * 0.7) as usize + jitter;

        Self {
            id,
            tier: path.tier,
            walker: PathWalker::new(path.path.clone(), 0, speed),
            hp: blueprint.hp,
            damage: blueprint.damage,
            max_scale,
            breakup_index,
            fading_in: true,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.walker.index()
    }

    #[inline]
    pub fn hp(&self) -> f32 {
        self.hp
    }

    #[inline]
    pub fn is_fading_in(&self) -> bool {
        self.fading_in
    }

    #[inline]
    pub fn breakup_index(&self) -> usize {
        self.breakup_index
    }

    pub fn position(&self) -> Vec2 {
        self.walker.position()
    }

    /// Path scale times this asteroid's own size
    pub fn scale(&self) -> f32 {
        self.path_scale() * self.max_scale
    }

    pub fn rotation(&self) -> f32 {
        self.walker.rotation()
    }

    fn path_scale(&self) -> f32 {
        self.walker.scale().max(MIN_FADE_SCALE)
    }

    /// Apply damage; returns true when it destroyed the asteroid
    pub fn hit(&mut self, amount: f32) -> bool {
        self.hp -= amount;
        self.hp <= 0.0
    }

    /// Advance along the path; `Some` once the flight is over
    pub fn tick<R: Rng>(&mut self, delta_ms: f32, rng: &mut R) -> Option<EnemyOutcome> {
        if self.fading_in {
            // Crawl in proportion to visibility until fully faded in
            let scale = self.path_scale();
            self.walker.speed_multiplier = scale;
            if scale > FADE_IN_END_SCALE {
                self.fading_in = false;
            }
        } else {
            self.walker.speed_multiplier = 1.0;
        }
        self.walker.advance(delta_ms);

        // Passing a breakup index inside the path wins over reaching the end in the same tick
        let len = self.walker.table().len();
        if self.breakup_index < len && self.index() >= self.breakup_index {
            return Some(self.break_up(rng));
        }
        if self.walker.is_finished() {
            return Some(EnemyOutcome::Impact {
                position: self.position(),
                damage: self.damage,
            });
        }
        None
    }

    /// Shatter into debris fanned around the circle
    pub fn break_up<R: Rng>(&self, rng: &mut R) -> EnemyOutcome {
        let step = TAU / DEBRIS_PER_BREAKUP as f32;
        let start = step * rng.random::<f32>();
        let directions = (0..DEBRIS_PER_BREAKUP)
            .map(|i| start + step * i as f32 + step * 0.5 * rng.random::<f32>())
            .collect();
        EnemyOutcome::Breakup {
            position: self.position(),
            scale: self.scale(),
            directions,
        }
    }
}

/// Distance along `direction` from `position` to the planet surface, if the ray hits it
fn distance_to_planet(position: Vec2, direction: Vec2) -> Option<f32> {
    let projection = -position.dot(direction);
    if projection < 0.0 {
        return None;
    }
    let closest = position + direction * projection;
    let miss_sq = closest.length_squared();
    let radius_sq = PLANET_RADIUS * PLANET_RADIUS;
    if miss_sq > radius_sq {
        return None;
    }
    let distance = projection - (radius_sq - miss_sq).sqrt();
    (distance > 0.0).then_some(distance)
}

/// A rock fragment flying in a straight line and shrinking away
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Debris {
    pub position: Vec2,
    pub direction: f32,
    pub scale: f32,
    speed: f32,
    /// Scale lost per world unit travelled
    shrink: f32,
}

impl Debris {
    pub fn new<R: Rng>(position: Vec2, scale: f32, direction: f32, rng: &mut R) -> Self {
        let heading = Vec2::from_angle(direction);
        let shrink = match distance_to_planet(position, heading) {
            Some(distance) => scale / distance,
            None => DEBRIS_FALLBACK_SHRINK,
        };
        Self {
            position,
            direction,
            scale,
            speed: rng.random_range(0.05..0.1),
            shrink,
        }
    }

    /// Move and shrink; returns false once the piece has vanished
    pub fn tick(&mut self, delta_ms: f32) -> bool {
        let travelled = self.speed * delta_ms;
        let scale = self.scale - travelled * self.shrink;
        if scale < 0.0 {
            return false;
        }
        self.scale = scale;
        self.position += Vec2::from_angle(self.direction) * travelled;
        true
    }
}
