//! Precomputed path tables
//!
//! A path table is an immutable, contiguous run of `(x, y, scale, rotation)`
//! samples. Closed tables (orbits) wrap modulo their length; open tables
//! (launch spirals, enemy approaches) end at their last sample and walking
//! past it is a state transition for the owner.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One sample of a path table
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct PathSample {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
}

impl PathSample {
    pub fn new(x: f32, y: f32, scale: f32, rotation: f32) -> Self {
        Self { x, y, scale, rotation }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.scale.is_finite()
            && self.rotation.is_finite()
    }
}

/// Whether index arithmetic wraps around the end of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathKind {
    /// Circular track, indices reduce modulo the sample count
    Closed,
    /// Track with a terminal sample, motion beyond it signals completion
    Open,
}

/// Immutable table of path samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathTable {
    kind: PathKind,
    samples: Vec<PathSample>,
}

impl PathTable {
    /// Build a table, rejecting any non-finite sample
    pub fn new(kind: PathKind, samples: Vec<PathSample>) -> CoreResult<Self> {
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            log::error!("Generated {:?} path has a non-finite sample at {}", kind, index);
            return Err(CoreError::NonFiniteSample { index });
        }
        Ok(Self { kind, samples })
    }

    /// Table with no samples (degenerate generator input)
    pub fn empty(kind: PathKind) -> Self {
        Self {
            kind,
            samples: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.kind == PathKind::Closed
    }

    /// Number of samples, fixed at creation
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last valid index of an open table
    #[inline]
    pub fn terminal_index(&self) -> Option<usize> {
        self.samples.len().checked_sub(1)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&PathSample> {
        self.samples.get(index)
    }

    /// Sample at `index`, wrapping on closed tables and clamping to the
    /// terminal sample on open ones
    pub fn sample(&self, index: usize) -> Option<&PathSample> {
        if self.samples.is_empty() {
            return None;
        }
        let index = match self.kind {
            PathKind::Closed => index % self.samples.len(),
            PathKind::Open => index.min(self.samples.len() - 1),
        };
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    /// Samples as a flat `[x, y, scale, rotation, ...]` buffer
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.samples)
    }

    /// Index of the sample closest to `point` (full linear scan by squared distance)
    pub fn nearest_index(&self, point: Vec2) -> Option<usize> {
        let mut closest = None;
        let mut min_distance = f32::INFINITY;
        for (i, sample) in self.samples.iter().enumerate() {
            let distance = sample.position().distance_squared(point);
            if distance < min_distance {
                min_distance = distance;
                closest = Some(i);
            }
        }
        closest
    }
}
