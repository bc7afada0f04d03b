//! Unit tests for popup instances
//!
//! Tests show idempotence, the close sequence and its double-close guard,
//! subscription disposal and the category/slide parsers.

use super::*;
use crate::animation::AnimationPhase;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct CountingOverlay(Rc<Cell<u32>>);

impl PersistentOverlay for CountingOverlay {
    fn bring_to_front(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn viewport() -> Vector2<f32> {
    Vector2::new(1920.0, 1080.0)
}

fn instance(template: PopupTemplate) -> PopupInstance<&'static str> {
    PopupInstance::new(
        PopupId::new(1),
        "Settings",
        &template,
        template.category,
        &AnimationConfig::default(),
        viewport(),
    )
}

fn sliding() -> PopupTemplate {
    PopupTemplate {
        slide: SlideDirection::TopToBottom,
        ..PopupTemplate::default()
    }
}

#[test]
fn test_new_instance_starts_created_and_hidden() {
    let popup = instance(PopupTemplate::default());
    assert_eq!(popup.phase(), PopupPhase::Created);
    assert!(!popup.is_shown());
    assert!(!popup.is_closing());
    assert!(popup.is_active());
    assert_eq!(popup.identity(), &"Settings");
    assert_eq!(popup.placement(), PopupCategory::Ui);
}

#[test]
fn test_show_is_idempotent() {
    let mut popup = instance(sliding());
    assert!(popup.show(None));
    assert_eq!(popup.phase(), PopupPhase::Shown);
    assert_eq!(
        popup.animation().map(|a| a.phase()),
        Some(AnimationPhase::Opening)
    );

    popup.tick(Duration::from_millis(50));
    let position = popup.animation().map(|a| a.position());

    // A second show must not restart the opening tracks
    assert!(!popup.show(None));
    assert_eq!(popup.animation().map(|a| a.position()), position);
}

#[test]
fn test_show_raises_overlay_only_when_flagged() {
    let raised = Rc::new(Cell::new(0));
    let mut overlay: Box<dyn PersistentOverlay> = Box::new(CountingOverlay(raised.clone()));

    let mut plain = instance(PopupTemplate::default());
    plain.show(Some(&mut overlay));
    assert_eq!(raised.get(), 0);

    let mut flagged = instance(PopupTemplate {
        raise_above_overlay: true,
        ..PopupTemplate::default()
    });
    flagged.show(Some(&mut overlay));
    flagged.show(Some(&mut overlay));
    assert_eq!(raised.get(), 1);
}

#[test]
fn test_close_without_controller_detaches_immediately() {
    let mut popup = instance(PopupTemplate {
        animated: false,
        ..PopupTemplate::default()
    });
    popup.show(None);
    assert_eq!(popup.begin_close(viewport()), CloseOutcome::Detached);
    assert_eq!(popup.phase(), PopupPhase::Closing);
    assert!(!popup.is_shown());
}

#[test]
fn test_close_with_slide_animates() {
    let mut popup = instance(sliding());
    popup.show(None);
    popup.tick(Duration::from_millis(250));

    assert_eq!(popup.begin_close(viewport()), CloseOutcome::Animating);
    assert!(!popup.tick(Duration::from_millis(100)).close_finished);
    assert!(popup.tick(Duration::from_millis(150)).close_finished);
}

#[test]
fn test_close_without_slide_completes_synchronously() {
    let mut popup = instance(PopupTemplate::default());
    popup.show(None);
    assert_eq!(popup.begin_close(viewport()), CloseOutcome::Completed);
}

#[test]
fn test_double_close_notifies_once() {
    let calls = Rc::new(Cell::new(0));
    let disposed = Rc::new(Cell::new(0));

    let mut popup = instance(sliding());
    let counter = calls.clone();
    popup.set_on_close(move |_| counter.set(counter.get() + 1));
    let released = disposed.clone();
    popup.hold_subscription(move || released.set(released.get() + 1));
    popup.show(None);

    assert_eq!(popup.begin_close(viewport()), CloseOutcome::Animating);
    assert_eq!(popup.begin_close(viewport()), CloseOutcome::AlreadyClosing);
    assert_eq!(calls.get(), 1);
    assert_eq!(disposed.get(), 1);
}

#[test]
fn test_close_callback_receives_instance_id() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut popup = instance(PopupTemplate::default());
    let sink = seen.clone();
    popup.set_on_close(move |id| sink.borrow_mut().push(id));

    popup.begin_close(viewport());
    assert_eq!(*seen.borrow(), vec![PopupId::new(1)]);
}

#[test]
fn test_replacing_subscription_disposes_previous() {
    let disposed = Rc::new(Cell::new(0));
    let mut popup = instance(PopupTemplate::default());

    let first = disposed.clone();
    popup.hold_subscription(move || first.set(first.get() + 1));
    let second = disposed.clone();
    popup.hold_subscription(move || second.set(second.get() + 10));
    assert_eq!(disposed.get(), 1);

    popup.destroy();
    assert_eq!(disposed.get(), 11);
    assert_eq!(popup.phase(), PopupPhase::Destroyed);
}

#[test]
fn test_show_after_close_is_ignored() {
    let mut popup = instance(sliding());
    popup.show(None);
    popup.begin_close(viewport());
    assert!(!popup.show(None));
    assert_eq!(popup.phase(), PopupPhase::Closing);
}

#[test]
fn test_deactivated_instance_never_reports_completion() {
    let mut popup = instance(sliding());
    popup.show(None);
    popup.tick(Duration::from_millis(250));
    popup.begin_close(viewport());

    popup.set_active(false);
    assert!(!popup.tick(Duration::from_secs(1)).close_finished);

    popup.set_active(true);
    assert!(!popup.tick(Duration::from_secs(1)).close_finished);
}

#[test]
fn test_draw_order_is_one_above_current() {
    let mut popup = instance(PopupTemplate::default());
    popup.set_draw_order(41);
    assert_eq!(popup.draw_order(), 42);
}

#[test]
fn test_category_parsing() {
    assert_eq!("UI".parse::<PopupCategory>(), Ok(PopupCategory::Ui));
    assert_eq!("queue".parse::<PopupCategory>(), Ok(PopupCategory::Queue));
    assert!(matches!(
        "modal".parse::<PopupCategory>(),
        Err(PopupError::InvariantViolation(_))
    ));
}

#[test]
fn test_slide_parsing() {
    assert_eq!(
        "bottom-to-top".parse::<SlideDirection>(),
        Ok(SlideDirection::BottomToTop)
    );
    assert!("diagonal".parse::<SlideDirection>().is_err());
}

#[test]
fn test_template_deserializes_with_defaults() {
    let template: PopupTemplate = toml::from_str(
        r#"
category = "system"
slide = "right-to-left"
close_on_navigation = true
"#,
    )
    .expect("template parses");

    assert_eq!(template.category, PopupCategory::System);
    assert_eq!(template.slide, SlideDirection::RightToLeft);
    assert!(template.close_on_navigation);
    assert!(template.animated);
    assert_eq!(template.width, 800.0);
}
