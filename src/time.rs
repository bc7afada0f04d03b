//! Frame clock for the driver loop
//!
//! Popup animations advance on *unscaled* wall-clock time so they keep
//! moving while the rest of the application is paused or slowed down.
//! The clock therefore reports two deltas: the raw one used for popups and
//! a scaled one for whatever simulation sits next to them.

use std::time::{Duration, Instant};

/// Longest frame delta handed out; a stalled frame must not teleport animations
const MAX_DELTA: Duration = Duration::from_millis(250);

/// Fastest time scale accepted by [`FrameClock::set_time_scale`]
pub const MAX_TIME_SCALE: f32 = 16.0;

#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    delta: Duration,
    time_scale: f32,
    paused: bool,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last: now,
            delta: Duration::ZERO,
            time_scale: 1.0,
            paused: false,
            frame_count: 0,
        }
    }

    /// Measure the time since the previous tick and return it unscaled
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Duration {
        self.delta = now.saturating_duration_since(self.last).min(MAX_DELTA);
        self.last = now;
        self.frame_count += 1;
        self.delta
    }

    /// Last unscaled delta; what popup animations consume
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Last delta after pause and time scale are applied
    pub fn scaled_delta(&self) -> Duration {
        if self.paused {
            return Duration::ZERO;
        }
        self.delta.mul_f32(self.time_scale)
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Clamped to `0..=MAX_TIME_SCALE`; NaN counts as zero
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0).min(MAX_TIME_SCALE);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn elapsed(&self) -> Duration {
        self.last.saturating_duration_since(self.start)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Target frame interval for a frame rate; 0 fps is treated as 1
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}
