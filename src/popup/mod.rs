//! Popup identities, categories, templates and instances
//!
//! A [`PopupInstance`] is one instantiated popup. Its identity and declared
//! category never change after creation; its visibility, closing guard,
//! draw order and animation state are driven by the registry and by the
//! instance's own close sequence.
//!
//! Lifecycle: `Created → Shown → Closing → Destroyed`, linear, no cycles.

use cgmath::Vector2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::time::Duration;

use crate::animation::{
    AnimationController, ChannelSet, CloseProgress, ControllerTick, LayoutMetrics,
};
use crate::config::AnimationConfig;
use crate::error::PopupError;
use crate::layer::PersistentOverlay;

/// The logical "which popup" tag.
///
/// Implemented for every clonable, hashable, displayable type, so both
/// application enums and plain `String` names work. The `Display` form is
/// what the asset resolver uses to build template paths.
pub trait PopupIdentity: Clone + Eq + Hash + fmt::Debug + fmt::Display + 'static {}

impl<T> PopupIdentity for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + 'static {}

/// Unique handle of one popup instance within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopupId(u64);

impl PopupId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popup#{}", self.0)
    }
}

/// Placement policy bucket a popup belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupCategory {
    /// Stacked, user-dismissible
    #[default]
    Ui,
    /// Stacked, dismissed before UI popups by "close last"
    System,
    /// Tracked for lookups, excluded from "close last"
    Ignore,
    /// Serialized: only the head is ever shown
    Queue,
}

impl PopupCategory {
    /// Every category, in the order bulk closes walk them
    pub const CLOSE_ORDER: [PopupCategory; 4] = [
        PopupCategory::Ui,
        PopupCategory::Ignore,
        PopupCategory::System,
        PopupCategory::Queue,
    ];

    /// Categories visible to identity lookups, in search order
    pub const LOOKUP_ORDER: [PopupCategory; 3] =
        [PopupCategory::Ui, PopupCategory::System, PopupCategory::Ignore];

    pub fn as_str(self) -> &'static str {
        match self {
            PopupCategory::Ui => "ui",
            PopupCategory::System => "system",
            PopupCategory::Ignore => "ignore",
            PopupCategory::Queue => "queue",
        }
    }
}

impl fmt::Display for PopupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PopupCategory {
    type Err = PopupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ui" => Ok(PopupCategory::Ui),
            "system" => Ok(PopupCategory::System),
            "ignore" => Ok(PopupCategory::Ignore),
            "queue" => Ok(PopupCategory::Queue),
            other => Err(PopupError::InvariantViolation(format!(
                "unknown popup category '{}'",
                other
            ))),
        }
    }
}

/// Direction a popup slides in from (and back out to)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideDirection {
    #[default]
    None,
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl FromStr for SlideDirection {
    type Err = PopupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SlideDirection::None),
            "left-to-right" => Ok(SlideDirection::LeftToRight),
            "right-to-left" => Ok(SlideDirection::RightToLeft),
            "top-to-bottom" => Ok(SlideDirection::TopToBottom),
            "bottom-to-top" => Ok(SlideDirection::BottomToTop),
            other => Err(PopupError::InvariantViolation(format!(
                "unknown slide direction '{}'",
                other
            ))),
        }
    }
}

/// Instantiable description of a popup, as returned by the asset resolver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PopupTemplate {
    /// Declared placement category
    pub category: PopupCategory,

    /// Attach an animation controller
    pub animated: bool,

    /// Scale channel (pop from the hidden scale)
    pub scale: bool,

    /// Fade channel
    pub fade: bool,

    /// Slide channel direction
    pub slide: SlideDirection,

    /// Animate the close button along with the panel scale
    pub close_button: bool,

    /// Close when the navigation/back handler runs
    pub close_on_navigation: bool,

    /// Ask the persistent overlay to come to front when shown
    pub raise_above_overlay: bool,

    /// Panel width (pixels)
    pub width: f32,

    /// Panel height (pixels)
    pub height: f32,

    /// Anchored resting position, x
    pub anchor_x: f32,

    /// Anchored resting position, y
    pub anchor_y: f32,
}

impl Default for PopupTemplate {
    fn default() -> Self {
        Self {
            category: PopupCategory::Ui,
            animated: true,
            scale: true,
            fade: true,
            slide: SlideDirection::None,
            close_button: false,
            close_on_navigation: false,
            raise_above_overlay: false,
            width: 800.0,
            height: 600.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
        }
    }
}

impl PopupTemplate {
    pub fn panel_size(&self) -> Vector2<f32> {
        Vector2::new(self.width, self.height)
    }

    pub fn anchor(&self) -> Vector2<f32> {
        Vector2::new(self.anchor_x, self.anchor_y)
    }
}

/// Lifecycle phase of a popup instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupPhase {
    Created,
    Shown,
    Closing,
    Destroyed,
}

/// What the registry must do after an instance starts closing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseOutcome {
    /// A close was already in progress; nothing happened
    AlreadyClosing,
    /// No animation controller: remove and destroy now
    Detached,
    /// The controller had nothing to animate out: remove and destroy now
    Completed,
    /// The closing transition is running; removal waits for its completion
    Animating,
}

type CloseCallback = Box<dyn FnMut(PopupId)>;
type Disposer = Box<dyn FnOnce()>;

/// One instantiated popup
pub struct PopupInstance<I> {
    id: PopupId,
    identity: I,
    category: PopupCategory,
    placement: PopupCategory,
    phase: PopupPhase,
    shown: bool,
    closing: bool,
    active: bool,
    close_on_navigation: bool,
    raise_above_overlay: bool,
    draw_order: i32,
    panel_size: Vector2<f32>,
    on_close: Option<CloseCallback>,
    subscription: Option<Disposer>,
    animation: Option<AnimationController>,
}

impl<I: PopupIdentity> PopupInstance<I> {
    /// Instantiate a popup from its template.
    ///
    /// `placement` is the collection the registry puts it in, which differs
    /// from the declared category when the popup is enqueued.
    pub(crate) fn new(
        id: PopupId,
        identity: I,
        template: &PopupTemplate,
        placement: PopupCategory,
        animation: &AnimationConfig,
        viewport: Vector2<f32>,
    ) -> Self {
        let controller = (animation.enabled && template.animated).then(|| {
            AnimationController::new(
                ChannelSet::from(template),
                animation,
                template.anchor(),
                LayoutMetrics::new(template.panel_size(), viewport),
            )
        });

        Self {
            id,
            identity,
            category: template.category,
            placement,
            phase: PopupPhase::Created,
            shown: false,
            closing: false,
            active: true,
            close_on_navigation: template.close_on_navigation,
            raise_above_overlay: template.raise_above_overlay,
            draw_order: 0,
            panel_size: template.panel_size(),
            on_close: None,
            subscription: None,
            animation: controller,
        }
    }

    /// Make the popup visible and start its opening transition.
    ///
    /// Returns `false` without side effects if it is already shown or closing.
    pub(crate) fn show(&mut self, overlay: Option<&mut Box<dyn PersistentOverlay>>) -> bool {
        if self.shown || self.closing {
            return false;
        }
        self.shown = true;
        self.phase = PopupPhase::Shown;

        if self.raise_above_overlay {
            if let Some(overlay) = overlay {
                overlay.bring_to_front();
            }
        }

        if let Some(animation) = self.animation.as_mut() {
            animation.open();
        }
        true
    }

    /// Enter the close sequence: hide, release the held subscription, notify
    /// the close callback, then start the closing transition if animated.
    pub(crate) fn begin_close(&mut self, viewport: Vector2<f32>) -> CloseOutcome {
        if self.closing {
            debug!("{} ({}) is already closing", self.id, self.identity);
            return CloseOutcome::AlreadyClosing;
        }
        self.closing = true;
        self.shown = false;
        self.phase = PopupPhase::Closing;

        if let Some(dispose) = self.subscription.take() {
            dispose();
        }
        if let Some(callback) = self.on_close.as_mut() {
            callback(self.id);
        }

        let metrics = LayoutMetrics::new(self.panel_size, viewport);
        match self.animation.as_mut() {
            None => CloseOutcome::Detached,
            Some(animation) => match animation.close(metrics) {
                CloseProgress::Finished => CloseOutcome::Completed,
                CloseProgress::Running => CloseOutcome::Animating,
            },
        }
    }

    /// Advance the controller and report which transitions finished this
    /// tick. Inactive instances do not advance.
    pub(crate) fn tick(&mut self, delta: Duration) -> ControllerTick {
        if !self.active {
            return ControllerTick::default();
        }
        match self.animation.as_mut() {
            Some(animation) => animation.tick(delta),
            None => ControllerTick::default(),
        }
    }

    /// Deactivating halts every channel without reporting completion
    pub(crate) fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if !active {
            if let Some(animation) = self.animation.as_mut() {
                animation.halt();
            }
            if self.closing {
                warn!(
                    "{} ({}) deactivated mid-close; it must now be removed explicitly",
                    self.id, self.identity
                );
            }
        }
    }

    pub(crate) fn destroy(&mut self) {
        if let Some(animation) = self.animation.as_mut() {
            animation.halt();
        }
        if let Some(dispose) = self.subscription.take() {
            dispose();
        }
        self.on_close = None;
        self.shown = false;
        self.phase = PopupPhase::Destroyed;
    }

    /// Record the draw order one above `current_order`
    pub fn set_draw_order(&mut self, current_order: i32) {
        self.draw_order = current_order.saturating_add(1);
    }

    /// Callback fired once when the close sequence begins
    pub fn set_on_close<F>(&mut self, callback: F)
    where
        F: FnMut(PopupId) + 'static,
    {
        self.on_close = Some(Box::new(callback));
    }

    /// Hold a subscription that is disposed when the popup closes.
    /// A previously held subscription is disposed first.
    pub fn hold_subscription<F>(&mut self, dispose: F)
    where
        F: FnOnce() + 'static,
    {
        if let Some(previous) = self.subscription.replace(Box::new(dispose)) {
            previous();
        }
    }

    pub fn set_close_on_navigation(&mut self, close_on_navigation: bool) {
        self.close_on_navigation = close_on_navigation;
    }

    pub fn id(&self) -> PopupId {
        self.id
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Category declared by the template
    pub fn category(&self) -> PopupCategory {
        self.category
    }

    /// Collection actually holding this popup
    pub fn placement(&self) -> PopupCategory {
        self.placement
    }

    pub fn phase(&self) -> PopupPhase {
        self.phase
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn close_on_navigation(&self) -> bool {
        self.close_on_navigation
    }


    pub fn draw_order(&self) -> i32 {
        self.draw_order
    }

    pub fn panel_size(&self) -> Vector2<f32> {
        self.panel_size
    }

    pub fn animation(&self) -> Option<&AnimationController> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.active && self.animation.as_ref().is_some_and(|a| a.is_running())
    }
}

impl<I: fmt::Debug> fmt::Debug for PopupInstance<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupInstance")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("category", &self.category)
            .field("placement", &self.placement)
            .field("phase", &self.phase)
            .field("shown", &self.shown)
            .field("closing", &self.closing)
            .field("active", &self.active)
            .field("draw_order", &self.draw_order)
            .field("animated", &self.animation.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
