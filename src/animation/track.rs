//! Interpolation tracks and per-property channels
//!
//! A [`Track`] is the explicit state of one running interpolation:
//! `{elapsed, delay, duration, start, end, easing}`. It never reads a clock;
//! the owner advances it with the frame delta. A [`Channel`] holds the live
//! value of one animated property and at most one track driving it.

use cgmath::Vector2;
use std::time::Duration;

use super::Easing;

/// Values that can be linearly interpolated
pub trait Interpolate: Copy {
    fn lerp(self, target: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn lerp(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }
}

impl Interpolate for Vector2<f32> {
    fn lerp(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }
}

/// One fixed-duration eased interpolation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track<T> {
    start: T,
    end: T,
    elapsed: Duration,
    delay: Duration,
    duration: Duration,
    easing: Easing,
}

impl<T: Interpolate> Track<T> {
    pub fn new(start: T, end: T, duration: Duration, easing: Easing) -> Self {
        Self {
            start,
            end,
            elapsed: Duration::ZERO,
            delay: Duration::ZERO,
            duration,
            easing,
        }
    }

    /// Hold the start value for `delay` before interpolating
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Advance by one frame and return the new value
    pub fn advance(&mut self, delta: Duration) -> T {
        self.elapsed = self.elapsed.saturating_add(delta);
        self.value()
    }

    /// Normalized progress of the interpolation phase, before easing
    pub fn progress(&self) -> f32 {
        if self.elapsed <= self.delay {
            return 0.0;
        }
        if self.duration.is_zero() {
            return 1.0;
        }
        let active = self.elapsed - self.delay;
        (active.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn value(&self) -> T {
        if self.is_finished() {
            return self.end;
        }
        self.start.lerp(self.end, self.easing.apply(self.progress()))
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.delay + self.duration
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }
}

/// Live value of one animated property plus the track driving it, if any
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel<T> {
    value: T,
    track: Option<Track<T>>,
}

impl<T: Interpolate> Channel<T> {
    pub fn new(value: T) -> Self {
        Self { value, track: None }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn track(&self) -> Option<&Track<T>> {
        self.track.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.track.is_some()
    }

    /// Replace whatever drives this channel with a new track that starts
    /// from the live (possibly intermediate) value.
    pub fn animate_to(&mut self, target: T, duration: Duration, delay: Duration, easing: Easing) {
        self.track = Some(Track::new(self.value, target, duration, easing).with_delay(delay));
    }

    /// Stop in place. Returns whether a track was running.
    pub fn cancel(&mut self) -> bool {
        self.track.take().is_some()
    }

    /// Advance the running track. Returns `true` on the tick the track finishes.
    pub fn advance(&mut self, delta: Duration) -> bool {
        let Some(track) = self.track.as_mut() else {
            return false;
        };

        self.value = track.advance(delta);
        if track.is_finished() {
            self.track = None;
            return true;
        }
        false
    }
}
