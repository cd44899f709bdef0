//! Frame timing and delta time.
//!
//! [`Time`] is advanced by the [`Engine`](crate::engine::Engine) once per
//! tick, either from the wall clock or by a fixed step supplied by the
//! caller (tests, replays, editor stepping).

use std::time::{Duration, Instant};

/// Frame timing, owned by the engine context.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// When the current frame started.
    frame_start: Instant,
    /// Duration of the previous frame.
    delta: Duration,
    /// Sum of all deltas so far.
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Start a frame, measuring delta from the wall clock.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.frame_start;
        self.frame_start = now;
        self.step(delta);
    }

    /// Start a frame with a caller-supplied delta.
    pub fn advance(&mut self, delta: Duration) {
        self.frame_start = Instant::now();
        self.step(delta);
    }

    fn step(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Duration of the previous frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(250));
        time.advance(Duration::from_millis(250));

        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.elapsed(), Duration::from_millis(500));
        assert_eq!(time.delta_secs(), 0.25);
        assert_eq!(time.fps(), 4.0);
    }

    #[test]
    fn zero_delta_reports_zero_fps() {
        let mut time = Time::new();
        time.advance(Duration::ZERO);
        assert_eq!(time.fps(), 0.0);
    }
}
