//! Decaying screen shake driven by a precomputed sine table

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

const TABLE_SIZE: usize = 64;
/// Quarter period, so the Y offset is the cosine of the X offset
const QUARTER: usize = TABLE_SIZE / 4;

/// Shake request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeParams {
    pub duration_ms: f32,
    pub amplitude: f32,
    /// Oscillations over the whole duration
    pub count: f32,
    /// Suspend camera movement while shaking
    pub freeze: bool,
}

impl Default for ShakeParams {
    fn default() -> Self {
        Self {
            duration_ms: SHAKE_DEFAULT_DURATION,
            amplitude: SHAKE_DEFAULT_AMPLITUDE,
            count: SHAKE_DEFAULT_COUNT,
            freeze: false,
        }
    }
}

impl ShakeParams {
    pub fn new(duration_ms: f32, amplitude: f32, count: f32, freeze: bool) -> Self {
        Self {
            duration_ms,
            amplitude,
            count,
            freeze,
        }
    }

    /// Replace non-positive or non-finite values with the defaults
    pub fn validated(self) -> Self {
        fn valid(v: f32) -> bool {
            v.is_finite() && v > 0.0
        }
        let defaults = Self::default();
        let fixed = Self {
            duration_ms: if valid(self.duration_ms) {
                self.duration_ms
            } else {
                defaults.duration_ms
            },
            amplitude: if valid(self.amplitude) { self.amplitude } else { defaults.amplitude },
            count: if valid(self.count) { self.count } else { defaults.count },
            freeze: self.freeze,
        };
        if fixed != self {
            log::warn!("Invalid shake parameters {:?}, using defaults where needed", self);
        }
        fixed
    }
}

#[derive(Debug, Clone)]
pub struct Shake {
    table: [f32; TABLE_SIZE],
    params: ShakeParams,
    active: bool,
    elapsed_ms: f32,
    offset: Vec2,
}

impl Default for Shake {
    fn default() -> Self {
        Self::new()
    }
}

impl Shake {
    pub fn new() -> Self {
        let table =
            std::array::from_fn(|i| (i as f32 / TABLE_SIZE as f32 * std::f32::consts::TAU).sin());
        Self {
            table,
            params: ShakeParams::default(),
            active: false,
            elapsed_ms: 0.0,
            offset: Vec2::ZERO,
        }
    }

    pub fn start(&mut self, params: ShakeParams) {
        self.params = params.validated();
        self.active = true;
        self.elapsed_ms = 0.0;
        self.offset = Vec2::ZERO;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.offset = Vec2::ZERO;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Camera movement is suspended
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.active && self.params.freeze
    }

    /// Current offset, zero when inactive
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// 0 at trigger, 1 when done
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / self.params.duration_ms).min(1.0)
    }

    pub fn update(&mut self, delta_ms: f32) {
        if !self.active {
            return;
        }
        self.elapsed_ms += delta_ms.max(0.0);
        let progress = self.progress();
        let decay = 1.0 - progress;
        let phase = (progress * self.params.count).fract();
        let index = (phase * TABLE_SIZE as f32) as usize % TABLE_SIZE;

        let magnitude = self.params.amplitude * decay;
        self.offset = Vec2::new(
            self.table[index] * magnitude,
            self.table[(index + QUARTER) % TABLE_SIZE] * magnitude,
        );

        if progress >= 1.0 {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_at_rest_and_ends_at_zero() {
        let mut shake = Shake::new();
        shake.start(ShakeParams::new(1000.0, 8.0, 10.0, false));
        assert_eq!(shake.offset(), Vec2::ZERO);
        shake.update(16.0);
        assert!(shake.offset().length() > 0.0);
        for _ in 0..70 {
            shake.update(16.0);
        }
        assert!(!shake.is_active());
        assert_eq!(shake.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_invalid_params_fall_back() {
        let params = ShakeParams::new(-1.0, f32::NAN, 0.0, true).validated();
        assert_eq!(params.duration_ms, SHAKE_DEFAULT_DURATION);
        assert_eq!(params.amplitude, SHAKE_DEFAULT_AMPLITUDE);
        assert_eq!(params.count, SHAKE_DEFAULT_COUNT);
        assert!(params.freeze);
    }

    #[test]
    fn test_freeze_only_while_active() {
        let mut shake = Shake::new();
        shake.start(ShakeParams::new(100.0, 5.0, 3.0, true));
        assert!(shake.is_frozen());
        shake.update(100.0);
        assert!(!shake.is_frozen());
    }

    proptest! {
        #[test]
        fn prop_offset_bounded_by_amplitude(
            amplitude in 0.1f32..50.0,
            count in 1.0f32..30.0,
            steps in proptest::collection::vec(0.0f32..120.0, 1..60),
        ) {
            let mut shake = Shake::new();
            shake.start(ShakeParams::new(1000.0, amplitude, count, false));
            for dt in steps {
                shake.update(dt);
                prop_assert!(shake.offset().length() <= amplitude * 1.0001);
            }
        }
    }
}
