//! Two-level world scale fitted to the screen
//!
//! Near fits the outer orbit plus view margin at twice its diameter, far at
//! three times. Toggling eases between the two at a fixed rate.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewScaleState {
    Near,
    Far,
    ToNear,
    ToFar,
}

#[derive(Debug, Clone)]
pub struct ViewScale {
    near: f32,
    far: f32,
    scale: f32,
    state: ViewScaleState,
}

impl ViewScale {
    pub fn new(width: f32, height: f32) -> Self {
        let mut view = Self {
            near: 1.0,
            far: 1.0,
            scale: 1.0,
            state: ViewScaleState::Near,
        };
        view.resize(width, height);
        view
    }

    /// Recompute both levels for a new screen size and snap to the current one
    pub fn resize(&mut self, width: f32, height: f32) {
        let min_side = width.min(height);
        if !min_side.is_finite() || min_side <= 0.0 {
            log::warn!("Ignoring view scale resize to {}x{}", width, height);
            return;
        }
        self.near = (min_side / VIEW_SIZE_NEAR).min(1.0);
        self.far = (min_side / VIEW_SIZE_FAR).min(1.0);
        match self.state {
            ViewScaleState::Far | ViewScaleState::ToFar => {
                self.scale = self.far;
                self.state = ViewScaleState::Far;
            }
            ViewScaleState::Near | ViewScaleState::ToNear => {
                self.scale = self.near;
                self.state = ViewScaleState::Near;
            }
        }
    }

    pub fn zoom_in(&mut self) {
        if matches!(self.state, ViewScaleState::Far | ViewScaleState::ToFar) {
            self.state = ViewScaleState::ToNear;
        }
    }

    pub fn zoom_out(&mut self) {
        if matches!(self.state, ViewScaleState::Near | ViewScaleState::ToNear) {
            self.state = ViewScaleState::ToFar;
        }
    }

    pub fn tick(&mut self, delta_ms: f32) {
        let step = VIEW_SCALE_SPEED * delta_ms;
        match self.state {
            ViewScaleState::ToFar => {
                self.scale = (self.scale - step).max(self.far);
                if self.scale == self.far {
                    self.state = ViewScaleState::Far;
                }
            }
            ViewScaleState::ToNear => {
                self.scale = (self.scale + step).min(self.near);
                if self.scale == self.near {
                    self.state = ViewScaleState::Near;
                }
            }
            ViewScaleState::Near | ViewScaleState::Far => {}
        }
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn state(&self) -> ViewScaleState {
        self.state
    }
}
