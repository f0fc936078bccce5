//! Game settings
//!
//! Loaded from a JSON file; any field left out takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CameraSpeeds;
use crate::consts::MAX_FRAME_DELTA_MS;
use crate::error::CoreResult;

fn default_seed() -> u64 {
    0x0DEF_E45E
}

fn default_true() -> bool {
    true
}

fn default_start_mines() -> usize {
    3
}

fn default_satellites_inner() -> usize {
    5
}

fn default_satellites_outer() -> usize {
    9
}

fn default_spawn_interval_ms() -> f32 {
    3000.0
}

fn default_max_frame_delta_ms() -> f32 {
    MAX_FRAME_DELTA_MS
}

fn default_planet_integrity() -> f32 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for the world RNG (enemy paths, speeds, debris)
    #[serde(default = "default_seed")]
    pub seed: u64,

    // === Camera ===
    /// Overrides for the camera controller speeds; invalid values fall back to defaults
    pub camera_move_speed: Option<f32>,
    pub camera_zoom_speed: Option<f32>,
    pub camera_rotate_speed: Option<f32>,
    pub camera_return_speed: Option<f32>,
    /// Shake on planet impacts
    #[serde(default = "default_true")]
    pub screen_shake: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,

    // === World ===
    /// Mines on the mine orbit at start
    #[serde(default = "default_start_mines")]
    pub start_mines: usize,
    #[serde(default = "default_satellites_inner")]
    pub satellites_inner: usize,
    #[serde(default = "default_satellites_outer")]
    pub satellites_outer: usize,
    /// Time between enemy spawns (0 disables spawning)
    #[serde(default = "default_spawn_interval_ms")]
    pub enemy_spawn_interval_ms: f32,
    #[serde(default = "default_planet_integrity")]
    pub planet_integrity: f32,

    /// Longest frame delta fed to the simulation
    #[serde(default = "default_max_frame_delta_ms")]
    pub max_frame_delta_ms: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            camera_move_speed: None,
            camera_zoom_speed: None,
            camera_rotate_speed: None,
            camera_return_speed: None,
            screen_shake: true,
            reduced_motion: false,
            start_mines: default_start_mines(),
            satellites_inner: default_satellites_inner(),
            satellites_outer: default_satellites_outer(),
            enemy_spawn_interval_ms: default_spawn_interval_ms(),
            planet_integrity: default_planet_integrity(),
            max_frame_delta_ms: default_max_frame_delta_ms(),
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Camera speeds with the overrides validated
    pub fn camera_speeds(&self) -> CameraSpeeds {
        CameraSpeeds::with_overrides(
            self.camera_move_speed,
            self.camera_zoom_speed,
            self.camera_rotate_speed,
            self.camera_return_speed,
        )
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path`, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings from {}: {}", path.as_ref().display(), e);
                Self::default()
            }
        }
    }
}
