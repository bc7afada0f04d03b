//! Integration tests for the popup registry
//!
//! These tests drive the public API end to end: templates loaded from disk,
//! the lifecycle scenarios of a typical UI session, and the collaborator
//! traits (layer host, persistent overlay) checked with mocks.

use anyhow::Result;
use mockall::mock;
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::time::Duration;
use tempfile::tempdir;

use veil::assets::POPUP_PATH;
use veil::{
    LayerHost, PersistentOverlay, PopupCategory, PopupEvent, PopupId, PopupPhase, PopupRegistry,
    TemplateLibrary, VeilConfig,
};

const FRAME: Duration = Duration::from_millis(16);

mock! {
    pub Overlay {}
    impl PersistentOverlay for Overlay {
        fn bring_to_front(&mut self);
    }
}

mock! {
    pub Host {}
    impl LayerHost for Host {
        fn attach_first(&mut self, id: PopupId);
        fn detach(&mut self, id: PopupId);
        fn top_draw_order(&self) -> i32;
        fn set_draw_order(&mut self, id: PopupId, order: i32);
        fn sibling_index(&self, id: PopupId) -> Option<usize>;
    }
}

const CONFIG: &str = r#"
[animation]
duration_ms = 160

[popups.Settings]
slide = "top-to-bottom"
close_on_navigation = true

[popups.Confirm]
category = "system"
slide = "bottom-to-top"
raise_above_overlay = true
"#;

/// Config plus a template directory holding the queue popups
fn registry_from_disk() -> Result<PopupRegistry<String, TemplateLibrary>> {
    let root = tempdir()?;
    let config_path = root.path().join("veil.toml");
    fs::write(&config_path, CONFIG)?;

    let popup_dir = root.path().join(POPUP_PATH);
    fs::create_dir_all(&popup_dir)?;
    for name in ["B", "C", "D"] {
        fs::write(
            popup_dir.join(format!("{}.toml", name)),
            "slide = \"right-to-left\"\n",
        )?;
    }
    fs::write(popup_dir.join("A.toml"), "slide = \"left-to-right\"\n")?;

    let config = VeilConfig::load(&config_path)?;
    let mut library = TemplateLibrary::from_config(&config);
    library.load_dir(root.path())?;

    Ok(PopupRegistry::new(&config, library))
}

fn settle(registry: &mut PopupRegistry<String, TemplateLibrary>) {
    for _ in 0..30 {
        registry.tick(FRAME);
    }
}

#[test]
fn test_open_single_popup() -> Result<()> {
    let mut registry = registry_from_disk()?;
    let counts = Rc::new(RefCell::new(Vec::new()));
    let sink = counts.clone();
    registry.on_popup_count_changed(move |total| sink.borrow_mut().push(total));

    let a = registry.create("A".to_string(), true, false)?;

    assert_eq!(*counts.borrow(), vec![1]);
    assert_eq!(registry.get(a).map(|p| p.phase()), Some(PopupPhase::Shown));
    assert!(registry.is_animating());

    settle(&mut registry);
    assert!(!registry.is_animating());
    Ok(())
}

#[test]
fn test_replace_scenario() -> Result<()> {
    let mut registry = registry_from_disk()?;
    let first = registry.create("A".to_string(), true, false)?;
    settle(&mut registry);

    let second = registry.create_replacing_same_identity("A".to_string())?;
    assert_eq!(registry.get(first).map(|p| p.phase()), Some(PopupPhase::Closing));
    assert!(registry.get(second).is_some_and(|p| p.is_shown()));

    settle(&mut registry);
    assert_eq!(registry.popup_count(), 1);
    assert_eq!(registry.is_active(&"A".to_string()), Some(second));
    Ok(())
}

#[test]
fn test_queue_scenario() -> Result<()> {
    let mut registry = registry_from_disk()?;
    let b = registry.create("B".to_string(), true, true)?;
    let c = registry.create("C".to_string(), true, true)?;
    let d = registry.create("D".to_string(), true, true)?;

    assert!(registry.get(b).is_some_and(|p| p.is_shown()));
    assert!(registry.get(c).is_some_and(|p| !p.is_shown()));

    registry.remove(b);
    assert!(registry.get(b).is_none());
    assert!(registry.get(c).is_some_and(|p| p.is_shown()));
    assert!(registry.get(d).is_some_and(|p| !p.is_shown()));
    Ok(())
}

#[test]
fn test_close_all_scenario() -> Result<()> {
    let mut registry = registry_from_disk()?;
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    registry.add_event_listener(move |event| sink.borrow_mut().push(*event));

    registry.create("Settings".to_string(), true, false)?;
    registry.create("A".to_string(), true, false)?;
    registry.create("Confirm".to_string(), true, false)?;
    registry.create("B".to_string(), true, true)?;
    assert_eq!(registry.ids_in(PopupCategory::Ui).len(), 2);
    assert_eq!(registry.ids_in(PopupCategory::System).len(), 1);
    assert_eq!(registry.ids_in(PopupCategory::Queue).len(), 1);
    settle(&mut registry);

    registry.close_all();
    settle(&mut registry);

    assert!(registry.is_idle());
    let last_count = events.borrow().iter().rev().find_map(|event| match event {
        PopupEvent::CountChanged(total) => Some(*total),
        _ => None,
    });
    assert_eq!(last_count, Some(0));
    Ok(())
}

#[test]
fn test_back_and_navigation_handlers() -> Result<()> {
    let mut registry = registry_from_disk()?;
    let settings = registry.create("Settings".to_string(), true, false)?;
    let a = registry.create("A".to_string(), true, false)?;
    let confirm = registry.create("Confirm".to_string(), true, false)?;
    settle(&mut registry);

    // Back dismisses the system dialog before any UI panel
    assert!(registry.close_last_opened());
    assert!(registry.get(confirm).is_some_and(|p| p.is_closing()));

    registry.check_close_on_navigation();
    assert!(registry.get(settings).is_some_and(|p| p.is_closing()));
    assert!(registry.get(a).is_some_and(|p| !p.is_closing()));

    settle(&mut registry);
    assert_eq!(registry.ids_in(PopupCategory::Ui), &[a]);
    Ok(())
}

#[test]
fn test_unknown_template_is_reported() -> Result<()> {
    let mut registry = registry_from_disk()?;
    let error = registry.create("Missing".to_string(), true, false).unwrap_err();
    assert_eq!(
        error.to_string(),
        "cannot resolve popup 'Missing' at '_UI/Popup/Missing': no template registered"
    );
    assert!(registry.is_idle());
    Ok(())
}

#[test]
fn test_overlay_raised_for_flagged_popup() -> Result<()> {
    let mut overlay = MockOverlay::new();
    overlay.expect_bring_to_front().times(1).return_const(());

    let mut registry = registry_from_disk()?.with_overlay(Box::new(overlay));
    registry.create("Settings".to_string(), true, false)?;
    let confirm = registry.create("Confirm".to_string(), true, false)?;

    // Showing again must not raise a second time
    registry.show(confirm);
    Ok(())
}

#[test]
fn test_layer_host_sees_attach_order_and_detach() -> Result<()> {
    let mut host = MockHost::new();
    host.expect_attach_first().times(2).return_const(());
    host.expect_top_draw_order().return_const(7);
    host.expect_set_draw_order()
        .withf(|_, order| *order == 8)
        .times(2)
        .return_const(());
    host.expect_detach().times(1).return_const(());

    let mut registry = registry_from_disk()?.with_layer_host(Box::new(host));
    let a = registry.create("A".to_string(), true, false)?;
    let b = registry.create("B".to_string(), true, false)?;
    assert_eq!(registry.get(a).map(|p| p.draw_order()), Some(8));
    assert_eq!(registry.get(b).map(|p| p.draw_order()), Some(8));

    registry.close(a);
    settle(&mut registry);
    assert!(registry.get(a).is_none());
    Ok(())
}

#[test]
fn test_close_callback_fires_before_teardown() -> Result<()> {
    let mut registry = registry_from_disk()?;
    let log = Rc::new(RefCell::new(Vec::new()));

    let id = registry.create("Settings".to_string(), true, false)?;
    settle(&mut registry);

    let sink = log.clone();
    registry.set_on_close(id, move |_| sink.borrow_mut().push("close callback".to_string()));
    let sink = log.clone();
    registry.add_event_listener(move |event| sink.borrow_mut().push(event.to_string()));

    registry.close(id);
    registry.close(id);
    settle(&mut registry);

    assert_eq!(
        *log.borrow(),
        vec![
            "close callback".to_string(),
            format!("closing {}", id),
            format!("close animation completed {}", id),
            format!("destroyed {}", id),
            "count changed to 0".to_string(),
        ]
    );
    Ok(())
}
