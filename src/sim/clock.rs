//! Frame timing
//!
//! Wall-clock deltas between display frames become simulated time steps.
//! Deltas are clamped before scaling so a backgrounded tab or a debugger
//! pause cannot produce a huge integration jump.

/// Source of frame timestamps in milliseconds
pub trait TimeSource {
    fn now_ms(&mut self) -> f64;
}

/// Hand-driven clock for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: f64,
    /// Added after every read
    pub frame_ms: f64,
}

impl ManualClock {
    /// Clock that advances by a fixed frame period on every read
    pub fn with_frame_rate(hz: f64) -> Self {
        Self {
            now_ms: 0.0,
            frame_ms: 1000.0 / hz,
        }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&mut self) -> f64 {
        let now = self.now_ms;
        self.now_ms += self.frame_ms;
        now
    }
}

/// Converts successive timestamps into clamped simulation deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f64,
}

impl FrameClock {
    pub fn new(max_dt: f64) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Seconds of simulated time for a frame at `now_ms`.
    /// The first frame only records the baseline and yields zero.
    pub fn delta(&mut self, now_ms: f64, time_scale: f64) -> f64 {
        let last = self.last_ms.replace(now_ms).unwrap_or(now_ms);
        let raw = ((now_ms - last) / 1000.0).max(0.0);
        raw.min(self.max_dt) * time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new(0.033);
        assert_eq!(clock.delta(12_345.0, 1.0), 0.0);
        assert!((clock.delta(12_361.0, 1.0) - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_long_gap_is_clamped_then_scaled() {
        let mut clock = FrameClock::new(0.033);
        clock.delta(0.0, 0.25);
        assert!((clock.delta(5_000.0, 0.25) - 0.033 * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_backwards_timestamp_yields_zero() {
        let mut clock = FrameClock::new(0.033);
        clock.delta(100.0, 1.0);
        assert_eq!(clock.delta(90.0, 1.0), 0.0);
    }

    #[test]
    fn test_manual_clock_advances_per_read() {
        let mut clock = ManualClock::with_frame_rate(50.0);
        assert_eq!(clock.now_ms(), 0.0);
        assert_eq!(clock.now_ms(), 20.0);
        clock.advance(100.0);
        assert_eq!(clock.now_ms(), 140.0);
    }
}
