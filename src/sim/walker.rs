//! Path walkers
//!
//! A walker is a cursor into a shared [`PathTable`]. Each tick it converts
//! `speed * speed_multiplier * dt` into whole sample steps, carrying the
//! remainder in `fraction` so average speed is independent of how the
//! elapsed time is chunked. Positions are read from the nearest sample, no
//! interpolation.

use std::sync::Arc;

use glam::Vec2;

use super::path::{PathKind, PathSample, PathTable};

/// Stateful cursor along a path table
#[derive(Debug, Clone)]
pub struct PathWalker {
    table: Arc<PathTable>,
    index: usize,
    fraction: f32,
    /// Base speed in samples per millisecond
    pub speed: f32,
    /// Scales `speed` (catch-up, braking, fade-in)
    pub speed_multiplier: f32,
}

impl PathWalker {
    pub fn new(table: Arc<PathTable>, index: usize, speed: f32) -> Self {
        let index = wrap_index(&table, index);
        Self {
            table,
            index,
            fraction: 0.0,
            speed,
            speed_multiplier: 1.0,
        }
    }

    #[inline]
    pub fn table(&self) -> &Arc<PathTable> {
        &self.table
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sub-sample progress carried to the next tick
    #[inline]
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Whole sample steps covered by `delta_ms`, updating only the carried fraction.
    ///
    /// Owners that need to inspect the step before committing it (interception)
    /// call this and then [`PathWalker::set_index`] or [`PathWalker::snap_to`].
    pub fn take_steps(&mut self, delta_ms: f32) -> usize {
        let movement = self.speed * self.speed_multiplier * delta_ms + self.fraction;
        if !movement.is_finite() || movement <= 0.0 {
            return 0;
        }
        let steps = movement.floor();
        self.fraction = movement - steps;
        steps as usize
    }

    /// Advance by `delta_ms`, returning the number of whole steps taken
    pub fn advance(&mut self, delta_ms: f32) -> usize {
        let steps = self.take_steps(delta_ms);
        self.index = self.offset_index(steps);
        steps
    }

    /// Index `steps` ahead of the current one (wrapped on closed tables,
    /// saturating on open ones)
    pub fn offset_index(&self, steps: usize) -> usize {
        match self.table.kind() {
            PathKind::Closed if !self.table.is_empty() => {
                let len = self.table.len();
                (self.index + steps % len) % len
            }
            PathKind::Closed => 0,
            PathKind::Open => self.index.saturating_add(steps),
        }
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = wrap_index(&self.table, index);
    }

    /// Snap onto `index`, folding `carry` whole steps back into the fraction
    pub fn snap_to(&mut self, index: usize, carry: usize) {
        self.set_index(index);
        self.fraction += carry as f32;
    }

    /// Move onto another table at `index`, keeping the carried fraction
    pub fn switch_table(&mut self, table: Arc<PathTable>, index: usize) {
        self.table = table;
        self.set_index(index);
    }

    /// True once an open walker has stepped past its terminal sample
    pub fn is_finished(&self) -> bool {
        self.table.kind() == PathKind::Open && self.index >= self.table.len()
    }

    /// Current sample (clamped to the terminal sample on open tables)
    pub fn sample(&self) -> Option<&PathSample> {
        self.table.sample(self.index)
    }

    pub fn position(&self) -> Vec2 {
        self.sample().map(PathSample::position).unwrap_or(Vec2::ZERO)
    }

    pub fn scale(&self) -> f32 {
        self.sample().map(|s| s.scale).unwrap_or(0.0)
    }

    pub fn rotation(&self) -> f32 {
        self.sample().map(|s| s.rotation).unwrap_or(0.0)
    }
}

fn wrap_index(table: &PathTable, index: usize) -> usize {
    match table.kind() {
        PathKind::Closed if !table.is_empty() => index % table.len(),
        PathKind::Closed => 0,
        PathKind::Open => index,
    }
}

/// Linear speed ramp applied before each tick's movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRamp {
    pub start: f32,
    pub max: f32,
    /// Speed gained per millisecond
    pub per_ms: f32,
}

impl SpeedRamp {
    /// Ramp from `start` to `max` over `ramp_ms` milliseconds
    pub fn over(start: f32, max: f32, ramp_ms: f32) -> Self {
        let per_ms = if ramp_ms > 0.0 { (max - start) / ramp_ms } else { max - start };
        Self { start, max, per_ms }
    }

    #[inline]
    pub fn step(&self, speed: f32, delta_ms: f32) -> f32 {
        (speed + self.per_ms * delta_ms).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circular_distance;
    use crate::sim::orbit::{DepthScale, generate_circular_path};
    use proptest::prelude::*;

    fn orbit(radius: f32) -> Arc<PathTable> {
        Arc::new(generate_circular_path(radius, 1.0, &DepthScale::standard()).unwrap())
    }

    #[test]
    fn test_fraction_carries_over() {
        let mut walker = PathWalker::new(orbit(100.0), 0, 0.25);
        assert_eq!(walker.advance(3.0), 0);
        assert_eq!(walker.advance(3.0), 1);
        assert_eq!(walker.index(), 1);
        assert!((walker.fraction() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_closed_walker_wraps() {
        let table = orbit(10.0);
        let len = table.len();
        let mut walker = PathWalker::new(table, len - 1, 1.0);
        walker.advance(3.0);
        assert_eq!(walker.index(), 2);
    }

    #[test]
    fn test_open_walker_finishes() {
        let table = Arc::new(
            PathTable::new(PathKind::Open, vec![PathSample::default(); 10]).unwrap(),
        );
        let mut walker = PathWalker::new(table, 0, 1.0);
        walker.advance(9.0);
        assert!(!walker.is_finished());
        walker.advance(1.0);
        assert!(walker.is_finished());
        assert_eq!(walker.index(), 10);
        assert!(walker.sample().is_some());
    }

    #[test]
    fn test_empty_table_is_noop() {
        let mut walker = PathWalker::new(Arc::new(PathTable::empty(PathKind::Closed)), 5, 1.0);
        walker.advance(100.0);
        assert_eq!(walker.index(), 0);
        assert_eq!(walker.position(), Vec2::ZERO);
    }

    #[test]
    fn test_full_revolution_on_inner_orbit() {
        let table = orbit(180.0);
        let len = table.len();
        assert_eq!(len, 1131);
        let mut walker = PathWalker::new(table, 0, 0.06);
        let total_ms = len as f32 / 0.06;
        let mut elapsed = 0.0;
        while elapsed + 1000.0 <= total_ms {
            walker.advance(1000.0);
            elapsed += 1000.0;
        }
        walker.advance(total_ms - elapsed);
        assert!(circular_distance(walker.index(), 0, len) <= 1);
    }

    #[test]
    fn test_speed_ramp_clamps() {
        let ramp = SpeedRamp::over(0.001, 0.2, 180.0);
        let mut speed = ramp.start;
        for _ in 0..10 {
            speed = ramp.step(speed, 16.0);
        }
        // 160 ms in, still ramping
        let expected = 0.001 + (0.2 - 0.001) / 180.0 * 160.0;
        assert!((speed - expected).abs() < 1e-5);
        assert!(speed < ramp.max);

        speed = ramp.step(speed, 20.0);
        assert!((speed - 0.2).abs() < 1e-5);
        for _ in 0..10 {
            speed = ramp.step(speed, 16.0);
            assert_eq!(speed, ramp.max);
        }
    }

    #[test]
    fn test_huge_delta_does_not_overflow() {
        let table = orbit(100.0);
        let len = table.len();
        let mut walker = PathWalker::new(table, len - 1, 1.0);
        walker.advance(1.0e25);
        assert!(walker.index() < len);

        let open = Arc::new(
            PathTable::new(PathKind::Open, vec![PathSample::default(); 10]).unwrap(),
        );
        let mut walker = PathWalker::new(open, 5, 1.0);
        walker.advance(1.0e25);
        assert!(walker.is_finished());
        assert_eq!(walker.index(), usize::MAX);
    }

    proptest! {
        // Dyadic speeds and even deltas keep every product exact in f32
        #[test]
        fn prop_split_tick_matches_single_tick(
            speed_k in 1u32..256,
            half in 1u32..5000,
            start in 0usize..1700,
        ) {
            let table = orbit(270.0);
            let speed = speed_k as f32 / 64.0;
            let delta = (half * 2) as f32;

            let mut whole = PathWalker::new(table.clone(), start, speed);
            whole.advance(delta);

            let mut split = PathWalker::new(table, start, speed);
            split.advance(delta / 2.0);
            split.advance(delta / 2.0);

            prop_assert_eq!(whole.index(), split.index());
            prop_assert_eq!(whole.fraction(), split.fraction());
        }

        #[test]
        fn prop_split_tick_close_for_any_delta(speed in 0.001f32..0.5, delta in 0.1f32..2000.0) {
            let table = orbit(390.0);
            let len = table.len();

            let mut whole = PathWalker::new(table.clone(), 0, speed);
            whole.advance(delta);

            let mut split = PathWalker::new(table, 0, speed);
            split.advance(delta / 2.0);
            split.advance(delta / 2.0);

            let a = whole.index() as f32 + whole.fraction();
            let b = split.index() as f32 + split.fraction();
            let diff = (a - b).abs();
            prop_assert!(diff < 1e-2 || (len as f32 - diff) < 1e-2);
        }
    }
}
