//! Frame clock turning host timestamps into simulation deltas

use crate::consts::MAX_FRAME_DELTA_MS;

/// Tracks host frame timestamps (milliseconds) and hands out clamped deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta_ms: f32,
    elapsed_ms: f64,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DELTA_MS)
    }
}

impl FrameClock {
    pub fn new(max_delta_ms: f32) -> Self {
        let max_delta_ms = if max_delta_ms.is_finite() && max_delta_ms > 0.0 {
            max_delta_ms
        } else {
            log::warn!("Invalid max frame delta {}, using {}", max_delta_ms, MAX_FRAME_DELTA_MS);
            MAX_FRAME_DELTA_MS
        };
        Self {
            last_ms: None,
            max_delta_ms,
            elapsed_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Record a frame at host time `now_ms`, returning the delta to simulate.
    ///
    /// The first frame after construction or [`FrameClock::reset`] yields zero.
    /// Timestamps that go backwards also yield zero.
    pub fn update(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) if now_ms > last => ((now_ms - last) as f32).min(self.max_delta_ms),
            _ => 0.0,
        };
        self.last_ms = Some(now_ms);
        self.elapsed_ms += delta as f64;
        self.frame_count += 1;
        delta
    }

    /// Forget the last timestamp, e.g. after the window lost focus
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Simulated time so far (sum of clamped deltas)
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn max_delta_ms(&self) -> f32 {
        self.max_delta_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.update(5000.0), 0.0);
        assert_eq!(clock.update(5016.0), 16.0);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = FrameClock::new(50.0);
        clock.update(0.0);
        assert_eq!(clock.update(3000.0), 50.0);
        assert_eq!(clock.elapsed_ms(), 50.0);
    }

    #[test]
    fn test_reset_and_backwards_time() {
        let mut clock = FrameClock::default();
        clock.update(100.0);
        assert_eq!(clock.update(90.0), 0.0);
        clock.reset();
        assert_eq!(clock.update(1000.0), 0.0);
        assert_eq!(FrameClock::new(f32::NAN).max_delta_ms(), MAX_FRAME_DELTA_MS);
    }
}
