//! Inbound enemy spiral generation
//!
//! Each path starts at the spawn radius and spirals in toward the planet.
//! The angular step is chosen per sample so consecutive samples stay about
//! one world unit apart whatever the radius, tightened to half a unit while
//! the enemy is fading in or out.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::path::{PathKind, PathSample, PathTable};
use crate::consts::*;
use crate::error::CoreResult;

/// Difficulty/length class of an approach path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyTier {
    /// Nearly radial, hardest to intercept
    Short,
    /// About half a turn
    Medium,
    /// About a full turn and a half, easiest
    Long,
}

impl EnemyTier {
    pub const ALL: [EnemyTier; 3] = [EnemyTier::Short, EnemyTier::Medium, EnemyTier::Long];

    /// Tiers alternate around the circle so every direction sees each class
    pub fn for_sector(sector: usize) -> Self {
        Self::ALL[sector % Self::ALL.len()]
    }

    pub fn turns(&self) -> f32 {
        match self {
            EnemyTier::Short => 0.3,
            EnemyTier::Medium => 0.9,
            EnemyTier::Long => 1.5,
        }
    }

    pub fn end_radius(&self) -> f32 {
        match self {
            EnemyTier::Short => PLANET_RADIUS - 50.0,
            EnemyTier::Medium => PLANET_RADIUS - 40.0,
            EnemyTier::Long => PLANET_RADIUS - 30.0,
        }
    }

    /// Extra sprite rotation on top of the tangent
    fn heading_offset(&self) -> f32 {
        match self {
            EnemyTier::Short => 0.0,
            EnemyTier::Medium | EnemyTier::Long => FRAC_PI_4,
        }
    }
}

/// An approach path tagged for selection
#[derive(Debug, Clone)]
pub struct EnemyPath {
    pub path: Arc<PathTable>,
    pub tier: EnemyTier,
    pub variant: usize,
}

/// Fade in near the spawn radius, fade out approaching the planet
fn approach_scale(radius: f32, end_radius: f32) -> f32 {
    let scale = if radius < ENEMY_SCALE_DOWN_RADIUS {
        (radius - end_radius) / (ENEMY_SCALE_DOWN_RADIUS - end_radius)
    } else if radius > ENEMY_SCALE_UP_RADIUS {
        1.0 - (radius - ENEMY_SCALE_UP_RADIUS) / ENEMY_SCALE_UP_DISTANCE
    } else {
        1.0
    };
    scale.clamp(0.0, 1.0)
}

/// Build one inbound spiral starting at `angle_offset`
pub fn generate_enemy_path(
    tier: EnemyTier,
    variant: usize,
    angle_offset: f32,
) -> CoreResult<EnemyPath> {
    let total_angle = tier.turns() * TAU;
    let start_radius = ENEMY_SPAWN_RADIUS;
    let end_radius = tier.end_radius();
    let dr_dtheta = -(start_radius - end_radius) / total_angle;

    let mut samples = Vec::new();
    let mut angle = 0.0_f32;
    let mut radius = start_radius;

    while angle < total_angle {
        let x = (angle_offset + angle).cos() * radius;
        let y = (angle_offset + angle).sin() * radius;
        let scale = approach_scale(radius, end_radius);
        let rotation = angle_offset + angle + FRAC_PI_2 + tier.heading_offset();
        samples.push(PathSample::new(x, y, scale, rotation));

        // One unit of arc length per step at full scale, half a unit when faded
        let density = 0.5 + 0.5 * (scale * FRAC_PI_2).sin();
        let base_step = 1.0 / (dr_dtheta * dr_dtheta + radius * radius).sqrt();
        angle += base_step * density;
        radius = start_radius - (angle / total_angle) * (start_radius - end_radius);
    }

    Ok(EnemyPath {
        path: Arc::new(PathTable::new(PathKind::Open, samples)?),
        tier,
        variant,
    })
}

/// All approach paths of a level, bucketed by tier
#[derive(Debug, Clone, Default)]
pub struct EnemyPathSet {
    short: Vec<EnemyPath>,
    medium: Vec<EnemyPath>,
    long: Vec<EnemyPath>,
}

impl EnemyPathSet {
    /// One path per sector; tier = sector mod 3, variant = sector div 3
    pub fn generate(sectors: usize) -> CoreResult<Self> {
        let mut set = Self::default();
        if sectors == 0 {
            return Ok(set);
        }
        let sector_angle = TAU / sectors as f32;
        for sector in 0..sectors {
            let tier = EnemyTier::for_sector(sector);
            let variant = sector / EnemyTier::ALL.len();
            let path = generate_enemy_path(tier, variant, sector as f32 * sector_angle)?;
            set.bucket_mut(tier).push(path);
        }
        log::info!(
            "Enemy paths generated: {} short, {} medium, {} long",
            set.short.len(),
            set.medium.len(),
            set.long.len()
        );
        Ok(set)
    }

    pub fn standard() -> CoreResult<Self> {
        Self::generate(ENEMY_SECTORS)
    }

    pub fn tier(&self, tier: EnemyTier) -> &[EnemyPath] {
        match tier {
            EnemyTier::Short => &self.short,
            EnemyTier::Medium => &self.medium,
            EnemyTier::Long => &self.long,
        }
    }

    fn bucket_mut(&mut self, tier: EnemyTier) -> &mut Vec<EnemyPath> {
        match tier {
            EnemyTier::Short => &mut self.short,
            EnemyTier::Medium => &mut self.medium,
            EnemyTier::Long => &mut self.long,
        }
    }

    /// Random variant of `tier`
    pub fn pick<R: Rng>(&self, tier: EnemyTier, rng: &mut R) -> Option<&EnemyPath> {
        let paths = self.tier(tier);
        if paths.is_empty() {
            return None;
        }
        paths.get(rng.random_range(0..paths.len()))
    }

    pub fn len(&self) -> usize {
        self.short.len() + self.medium.len() + self.long.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
