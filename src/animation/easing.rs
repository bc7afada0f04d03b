//! Easing curves and timing functions

use serde::{Deserialize, Serialize};

/// Easing curve applied to the normalized progress of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Smooth deceleration, used for fades and slides
    CubicOut,
    /// Overshoots the target slightly before settling, used for scale pops
    BackOut,
}

impl Easing {
    /// Overshoot amount of [`Easing::BackOut`]
    const BACK_OVERSHOOT: f32 = 1.70158;

    /// Map linear progress `t` (clamped to 0..=1) onto the curve
    pub fn apply(self, progress: f32) -> f32 {
        let t = progress.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Easing::BackOut => {
                let s = Self::BACK_OVERSHOOT;
                let t = t - 1.0;
                t * t * ((s + 1.0) * t + s) + 1.0
            }
        }
    }
}
