//! Per-popup animation controller
//!
//! Owns four independent channels:
//! - **scale**: panel pop from the hidden scale to 1.0
//! - **accent**: the close button's own pop, delayed behind the panel
//! - **fade**: panel opacity
//! - **slide**: panel position along the configured direction
//!
//! The slide channel governs the closing transition: its completion is the
//! moment the owning popup may be removed and destroyed.

use cgmath::Vector2;
use log::debug;
use std::time::Duration;

use super::{Channel, Easing};
use crate::config::AnimationConfig;
use crate::popup::{PopupTemplate, SlideDirection};

/// Layout inputs for computing off-screen slide positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Size of the popup's panel rect
    pub panel_size: Vector2<f32>,
    /// Size of the screen/canvas hosting the popup layer
    pub viewport: Vector2<f32>,
}

impl LayoutMetrics {
    pub fn new(panel_size: Vector2<f32>, viewport: Vector2<f32>) -> Self {
        Self { panel_size, viewport }
    }
}

/// Animation lifecycle of one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Opening,
    Open,
    Closing,
    Closed,
}

/// Result of starting a closing transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseProgress {
    /// The slide channel is running; completion arrives through `tick`
    Running,
    /// Nothing to animate out; the caller may remove the popup right away
    Finished,
}

/// What happened during one controller tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerTick {
    pub open_finished: bool,
    pub close_finished: bool,
}

/// Which channels a popup animates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSet {
    pub scale: bool,
    pub fade: bool,
    pub slide: SlideDirection,
    pub accent: bool,
}

impl From<&PopupTemplate> for ChannelSet {
    fn from(template: &PopupTemplate) -> Self {
        Self {
            scale: template.scale,
            fade: template.fade,
            slide: template.slide,
            // The close button only pops when the panel itself scales
            accent: template.close_button && template.scale,
        }
    }
}

pub struct AnimationController {
    channels: ChannelSet,
    duration: Duration,
    accent_delay: Duration,
    phase: AnimationPhase,
    scale: Channel<f32>,
    accent: Channel<f32>,
    alpha: Channel<f32>,
    position: Channel<Vector2<f32>>,
    close_pending: bool,
}

impl AnimationController {
    /// Create a controller and put every enabled channel in its hidden pose
    pub fn new(
        channels: ChannelSet,
        config: &AnimationConfig,
        anchor: Vector2<f32>,
        metrics: LayoutMetrics,
    ) -> Self {
        let hidden_scale = config.hidden_scale;
        let start_position = if channels.slide == SlideDirection::None {
            anchor
        } else {
            hidden_position(channels.slide, anchor, metrics)
        };

        Self {
            channels,
            duration: config.duration(),
            accent_delay: config.accent_delay(),
            phase: AnimationPhase::Idle,
            scale: Channel::new(if channels.scale { hidden_scale } else { 1.0 }),
            accent: Channel::new(if channels.accent { 0.0 } else { 1.0 }),
            alpha: Channel::new(if channels.fade { 0.0 } else { 1.0 }),
            position: Channel::new(start_position),
            close_pending: false,
        }
    }

    /// Start the opening transition on every enabled channel at once
    pub fn open(&mut self) {
        self.phase = AnimationPhase::Opening;
        self.close_pending = false;

        if self.channels.scale {
            self.scale
                .animate_to(1.0, self.duration, Duration::ZERO, Easing::BackOut);
            if self.channels.accent {
                self.accent
                    .animate_to(1.0, self.duration, self.accent_delay, Easing::BackOut);
            }
        }

        if self.channels.fade {
            self.alpha
                .animate_to(1.0, self.duration, Duration::ZERO, Easing::CubicOut);
        }

        if self.channels.slide != SlideDirection::None {
            let target = resting_position(self.channels.slide, self.position.value());
            self.position
                .animate_to(target, self.duration, Duration::ZERO, Easing::CubicOut);
        }

        if !self.is_running() {
            self.phase = AnimationPhase::Open;
        }
    }

    /// Start the closing transition.
    ///
    /// The off-screen target is recomputed from `metrics` because the
    /// viewport may have changed since the popup opened. Without a slide
    /// channel, or if the popup never opened, closing finishes immediately.
    pub fn close(&mut self, metrics: LayoutMetrics) -> CloseProgress {
        if self.channels.slide == SlideDirection::None || self.phase == AnimationPhase::Idle {
            self.cancel_all();
            self.phase = AnimationPhase::Closed;
            return CloseProgress::Finished;
        }

        self.phase = AnimationPhase::Closing;
        self.close_pending = true;

        if self.channels.accent {
            self.accent
                .animate_to(0.0, self.duration, Duration::ZERO, Easing::CubicOut);
        }

        let target = hidden_position(self.channels.slide, self.position.value(), metrics);
        self.position
            .animate_to(target, self.duration, Duration::ZERO, Easing::CubicOut);

        CloseProgress::Running
    }

    /// Advance all channels by one frame of unscaled time
    pub fn tick(&mut self, delta: Duration) -> ControllerTick {
        let mut result = ControllerTick::default();
        if matches!(self.phase, AnimationPhase::Idle | AnimationPhase::Closed) {
            return result;
        }

        self.scale.advance(delta);
        self.accent.advance(delta);
        self.alpha.advance(delta);
        let slide_done = self.position.advance(delta);

        match self.phase {
            AnimationPhase::Opening if !self.is_running() => {
                self.phase = AnimationPhase::Open;
                result.open_finished = true;
            }
            AnimationPhase::Closing if slide_done && self.close_pending => {
                self.close_pending = false;
                self.cancel_all();
                self.phase = AnimationPhase::Closed;
                result.close_finished = true;
            }
            _ => {}
        }

        result
    }

    /// Abrupt stop: every channel freezes where it is and no completion is
    /// ever reported for the interrupted transition.
    pub fn halt(&mut self) {
        let stopped = self.cancel_all();
        self.close_pending = false;
        if stopped > 0 {
            debug!("⏹️ Halted {} animation channel(s) in phase {:?}", stopped, self.phase);
        }
    }

    fn cancel_all(&mut self) -> usize {
        [
            self.scale.cancel(),
            self.accent.cancel(),
            self.alpha.cancel(),
            self.position.cancel(),
        ]
        .into_iter()
        .filter(|stopped| *stopped)
        .count()
    }

    pub fn is_running(&self) -> bool {
        self.scale.is_animating()
            || self.accent.is_animating()
            || self.alpha.is_animating()
            || self.position.is_animating()
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn channels(&self) -> ChannelSet {
        self.channels
    }

    pub fn scale(&self) -> f32 {
        self.scale.value()
    }

    pub fn accent_scale(&self) -> f32 {
        self.accent.value()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha.value()
    }

    pub fn position(&self) -> Vector2<f32> {
        self.position.value()
    }
}

/// Off-screen pose for `direction`, keeping the other axis of `from`
pub fn hidden_position(
    direction: SlideDirection,
    from: Vector2<f32>,
    metrics: LayoutMetrics,
) -> Vector2<f32> {
    let mut target = from;
    match direction {
        SlideDirection::TopToBottom => target.y = metrics.panel_size.y,
        SlideDirection::BottomToTop => target.y = -metrics.viewport.y,
        SlideDirection::LeftToRight => target.x = -metrics.panel_size.x,
        SlideDirection::RightToLeft => target.x = metrics.panel_size.x,
        SlideDirection::None => {}
    }
    target
}

/// Resting pose for `direction`: the moving axis returns to zero
pub fn resting_position(direction: SlideDirection, from: Vector2<f32>) -> Vector2<f32> {
    let mut target = from;
    match direction {
        SlideDirection::TopToBottom | SlideDirection::BottomToTop => target.y = 0.0,
        SlideDirection::LeftToRight | SlideDirection::RightToLeft => target.x = 0.0,
        SlideDirection::None => {}
    }
    target
}
