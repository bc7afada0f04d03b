//! Frame-driven popup animation
//!
//! This module replaces coroutine-style tweening with explicit state:
//! - [`Easing`]: timing curves (overshoot for scale, deceleration for fade/slide)
//! - [`Track`] / [`Channel`]: one interpolation and the property it drives
//! - [`AnimationController`]: the per-popup owner of the scale, accent, fade
//!   and slide channels
//!
//! Nothing in here reads a clock. The registry's driver loop passes the
//! unscaled frame delta to `tick`, so animations keep moving while the
//! simulation is paused or time-scaled.

mod controller;
mod easing;
mod track;

pub use controller::{
    hidden_position, resting_position, AnimationController, AnimationPhase, ChannelSet,
    CloseProgress, ControllerTick, LayoutMetrics,
};
pub use easing::Easing;
pub use track::{Channel, Interpolate, Track};
