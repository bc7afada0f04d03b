//! Popup registry
//!
//! The registry owns every live popup instance and the four category
//! collections that order them:
//!
//! - **UI**: stacked, user-dismissible
//! - **System**: stacked, dismissed before UI by [`PopupRegistry::close_last_opened`]
//! - **Ignore**: visible to identity lookups, skipped by "close last"
//! - **Queue**: serialized, only the head is ever shown
//!
//! Closing is a two-step affair. `close` starts an instance's close
//! sequence; the instance stays registered until its closing transition
//! reports completion during [`PopupRegistry::tick`], and only then is it
//! removed and destroyed. Instances without anything to animate out are
//! removed within the `close` call itself.

use cgmath::Vector2;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::assets::AssetResolver;
use crate::config::{AnimationConfig, VeilConfig};
use crate::error::PopupResult;
use crate::events::{EventHub, PopupEvent};
use crate::layer::{LayerHost, PersistentOverlay, PopupLayer};
use crate::popup::{CloseOutcome, PopupCategory, PopupId, PopupIdentity, PopupInstance};

/// Explicitly constructed popup coordinator.
///
/// Created by the UI bootstrap, passed by `&mut` to whatever needs popup
/// control, and torn down with [`PopupRegistry::shutdown`].
pub struct PopupRegistry<I, R> {
    resolver: R,
    animation: AnimationConfig,
    viewport: Vector2<f32>,
    layer: Box<dyn LayerHost>,
    overlay: Option<Box<dyn PersistentOverlay>>,
    instances: BTreeMap<PopupId, PopupInstance<I>>,
    ui: Vec<PopupId>,
    system: Vec<PopupId>,
    ignore: Vec<PopupId>,
    queue: Vec<PopupId>,
    next_id: u64,
    events: EventHub,
}

impl<I: PopupIdentity, R: AssetResolver<I>> PopupRegistry<I, R> {
    /// Create a registry on a default [`PopupLayer`]
    pub fn new(config: &VeilConfig, resolver: R) -> Self {
        info!(
            "🪟 Initializing popup registry ({}x{} viewport, animations {})",
            config.layer.viewport_width,
            config.layer.viewport_height,
            if config.animation.enabled { "on" } else { "off" }
        );

        Self {
            resolver,
            animation: config.animation.clone(),
            viewport: config.layer.viewport(),
            layer: Box::new(PopupLayer::new(config.layer.base_draw_order)),
            overlay: None,
            instances: BTreeMap::new(),
            ui: Vec::new(),
            system: Vec::new(),
            ignore: Vec::new(),
            queue: Vec::new(),
            next_id: 1,
            events: EventHub::new(),
        }
    }

    /// Replace the layer host popups are parented to
    pub fn with_layer_host(mut self, layer: Box<dyn LayerHost>) -> Self {
        self.layer = layer;
        self
    }

    /// Install the persistent overlay flagged popups raise when shown
    pub fn with_overlay(mut self, overlay: Box<dyn PersistentOverlay>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Instantiate a popup for `identity`.
    ///
    /// The popup goes into the category its template declares, or into the
    /// Queue when `enqueue` is set (a template declaring `queue` is always
    /// enqueued). It is shown right away when `show` is set, unless it joins
    /// a queue that already has a head.
    pub fn create(&mut self, identity: I, show: bool, enqueue: bool) -> PopupResult<PopupId> {
        let template = self.resolver.resolve(&identity).map_err(|e| {
            warn!("❌ Failed to create popup {}: {}", identity, e);
            e
        })?;

        let enqueue = enqueue || template.category == PopupCategory::Queue;
        let placement = if enqueue {
            PopupCategory::Queue
        } else {
            template.category
        };

        let id = PopupId::new(self.next_id);
        self.next_id += 1;

        let mut instance = PopupInstance::new(
            id,
            identity,
            &template,
            placement,
            &self.animation,
            self.viewport,
        );

        self.layer.attach_first(id);
        instance.set_draw_order(self.layer.top_draw_order());
        self.layer.set_draw_order(id, instance.draw_order());

        let becomes_head = self.queue.is_empty();
        info!(
            "🪟 Created {} ({}) in {} at draw order {}",
            id,
            instance.identity(),
            placement,
            instance.draw_order()
        );
        self.instances.insert(id, instance);
        self.collection_mut(placement).push(id);
        self.events.emit(PopupEvent::Created(id));

        if show && (!enqueue || becomes_head) {
            self.show(id);
        }

        self.notify_count();
        Ok(id)
    }

    /// Close any live instance of `identity` in UI, System or Ignore, then
    /// create and show a fresh one.
    pub fn create_replacing_same_identity(&mut self, identity: I) -> PopupResult<PopupId> {
        if let Some(existing) = self.is_active(&identity) {
            debug!("🔁 Replacing {} ({})", existing, identity);
            self.close(existing);
        }
        self.create(identity, true, false)
    }

    /// Close the first live instance of `identity`, searching UI, System,
    /// then Ignore. Does nothing when there is none.
    pub fn close_by_identity(&mut self, identity: &I) {
        match self.is_active(identity) {
            Some(id) => self.close(id),
            None => debug!("No open popup for {}, nothing to close", identity),
        }
    }

    /// Close the newest live System popup, else the newest live UI popup.
    /// Returns `false` when neither collection has one.
    pub fn close_last_opened(&mut self) -> bool {
        let target = [PopupCategory::System, PopupCategory::Ui]
            .into_iter()
            .find_map(|category| self.newest_live(category));

        match target {
            Some(id) => {
                self.close(id);
                true
            }
            None => {
                debug!("No system or UI popup to close");
                false
            }
        }
    }

    /// Close every popup, walking UI, Ignore, System, then Queue
    pub fn close_all(&mut self) {
        info!("🚪 Closing all {} popup(s)", self.popup_count());
        for category in PopupCategory::CLOSE_ORDER {
            self.close_all_by_category(category);
        }
    }

    /// Close every popup in one collection, newest first
    pub fn close_all_by_category(&mut self, category: PopupCategory) {
        let snapshot = self.collection(category).to_vec();
        if !snapshot.is_empty() {
            debug!("🚪 Closing {} {} popup(s)", snapshot.len(), category);
        }
        for id in snapshot.into_iter().rev() {
            self.close(id);
        }
    }

    /// Close every UI and System popup flagged close-on-navigation
    pub fn check_close_on_navigation(&mut self) {
        let flagged: Vec<PopupId> = [PopupCategory::Ui, PopupCategory::System]
            .into_iter()
            .flat_map(|category| self.collection(category).iter().copied())
            .filter(|id| {
                self.instances
                    .get(id)
                    .is_some_and(|p| p.close_on_navigation() && !p.is_closing())
            })
            .collect();

        if !flagged.is_empty() {
            debug!("🧭 Navigation closes {} popup(s)", flagged.len());
        }
        for id in flagged {
            self.close(id);
        }
    }

    /// Live (not closing) instance of `identity` in UI, System or Ignore.
    /// Queue members are never matched.
    pub fn is_active(&self, identity: &I) -> Option<PopupId> {
        PopupCategory::LOOKUP_ORDER.into_iter().find_map(|category| {
            self.collection(category).iter().copied().find(|id| {
                self.instances
                    .get(id)
                    .is_some_and(|p| !p.is_closing() && p.identity() == identity)
            })
        })
    }

    pub fn current_by_identity(&self, identity: &I) -> Option<&PopupInstance<I>> {
        self.is_active(identity).and_then(|id| self.instances.get(&id))
    }

    /// Take `id` out of its collection and destroy it.
    ///
    /// Removing from the Queue shows the new head. Always notifies count
    /// listeners; returns `false` for ids the registry does not hold.
    pub fn remove(&mut self, id: PopupId) -> bool {
        let Some(mut instance) = self.instances.remove(&id) else {
            debug!("{} is not registered, nothing to remove", id);
            return false;
        };

        let placement = instance.placement();
        self.collection_mut(placement).retain(|member| *member != id);
        self.layer.detach(id);
        instance.destroy();
        info!("🗑️ Destroyed {} ({})", id, instance.identity());
        self.events.emit(PopupEvent::Destroyed(id));

        if placement == PopupCategory::Queue {
            if let Some(&head) = self.queue.first() {
                debug!("📬 Queue advanced to {}", head);
                self.show(head);
            }
        }

        self.notify_count();
        true
    }

    /// Show `id` and start its opening transition.
    ///
    /// No-op for shown or closing popups, and for queue members that are
    /// not the head.
    pub fn show(&mut self, id: PopupId) -> bool {
        let queued_behind_head = self
            .instances
            .get(&id)
            .is_some_and(|p| p.placement() == PopupCategory::Queue)
            && self.queue.first() != Some(&id);
        if queued_behind_head {
            debug!("{} is waiting in the queue, not showing", id);
            return false;
        }

        let Some(instance) = self.instances.get_mut(&id) else {
            debug!("{} is not registered, nothing to show", id);
            return false;
        };

        if !instance.show(self.overlay.as_mut()) {
            return false;
        }
        debug!("✨ Showing {} ({})", id, instance.identity());
        self.events.emit(PopupEvent::Shown(id));
        true
    }

    /// Start the close sequence of `id`.
    ///
    /// The close callback fires once, however often this is called. Removal
    /// happens here when there is nothing to animate out, otherwise on the
    /// tick the closing transition completes.
    pub fn close(&mut self, id: PopupId) {
        let viewport = self.viewport;
        let Some(instance) = self.instances.get_mut(&id) else {
            debug!("{} is not registered, nothing to close", id);
            return;
        };

        let outcome = instance.begin_close(viewport);
        if outcome == CloseOutcome::AlreadyClosing {
            return;
        }
        debug!("🚪 Closing {} ({}): {:?}", id, instance.identity(), outcome);
        self.events.emit(PopupEvent::Closing(id));

        match outcome {
            CloseOutcome::Detached | CloseOutcome::Completed => {
                self.remove(id);
            }
            CloseOutcome::Animating | CloseOutcome::AlreadyClosing => {}
        }
    }

    /// Advance every active popup by one frame of unscaled time and release
    /// those whose closing transition finished.
    pub fn tick(&mut self, delta: Duration) {
        let mut opened = Vec::new();
        let mut finished = Vec::new();
        for (id, instance) in self.instances.iter_mut() {
            let progress = instance.tick(delta);
            if progress.open_finished {
                opened.push(*id);
            }
            if progress.close_finished {
                finished.push(*id);
            }
        }

        for id in opened {
            self.events.emit(PopupEvent::Opened(id));
        }
        for id in finished {
            self.events.emit(PopupEvent::CloseAnimationCompleted(id));
            self.remove(id);
        }
    }

    /// Total across all four collections
    pub fn popup_count(&self) -> usize {
        self.ui.len() + self.system.len() + self.ignore.len() + self.queue.len()
    }

    /// No popup in any collection
    pub fn is_idle(&self) -> bool {
        self.popup_count() == 0
    }

    pub fn has_ui_popup(&self) -> bool {
        !self.ui.is_empty()
    }

    pub fn is_animating(&self) -> bool {
        self.instances.values().any(PopupInstance::is_animating)
    }

    /// Members of one collection, oldest first
    pub fn ids_in(&self, category: PopupCategory) -> &[PopupId] {
        self.collection(category)
    }

    pub fn get(&self, id: PopupId) -> Option<&PopupInstance<I>> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: PopupId) -> Option<&mut PopupInstance<I>> {
        self.instances.get_mut(&id)
    }

    pub fn layer(&self) -> &dyn LayerHost {
        self.layer.as_ref()
    }


    pub fn viewport(&self) -> Vector2<f32> {
        self.viewport
    }

    /// Screen size used for closing slide targets from now on
    pub fn set_viewport(&mut self, viewport: Vector2<f32>) {
        debug!("📐 Viewport is now {}x{}", viewport.x, viewport.y);
        self.viewport = viewport;
    }

    /// Re-stack `id` one above `current_order`
    pub fn set_draw_order(&mut self, id: PopupId, current_order: i32) -> bool {
        let Some(instance) = self.instances.get_mut(&id) else {
            return false;
        };
        instance.set_draw_order(current_order);
        self.layer.set_draw_order(id, instance.draw_order());
        true
    }

    /// Deactivating halts a popup's animations without completion; a
    /// popup deactivated mid-close must be removed explicitly.
    pub fn set_active(&mut self, id: PopupId, active: bool) -> bool {
        match self.instances.get_mut(&id) {
            Some(instance) => {
                instance.set_active(active);
                true
            }
            None => false,
        }
    }

    pub fn set_on_close<F>(&mut self, id: PopupId, callback: F) -> bool
    where
        F: FnMut(PopupId) + 'static,
    {
        match self.instances.get_mut(&id) {
            Some(instance) => {
                instance.set_on_close(callback);
                true
            }
            None => false,
        }
    }

    pub fn hold_subscription<F>(&mut self, id: PopupId, dispose: F) -> bool
    where
        F: FnOnce() + 'static,
    {
        match self.instances.get_mut(&id) {
            Some(instance) => {
                instance.hold_subscription(dispose);
                true
            }
            None => false,
        }
    }

    /// Listener told the live popup total after every creation and removal
    pub fn on_popup_count_changed<F>(&mut self, listener: F)
    where
        F: FnMut(usize) + 'static,
    {
        self.events.add_count_listener(listener);
    }

    pub fn add_event_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&PopupEvent) + 'static,
    {
        self.events.add_event_listener(listener);
    }

    /// Destroy every popup immediately, skipping close animations and close
    /// callbacks, report a final count of zero and drop all listeners.
    pub fn shutdown(&mut self) {
        info!("🛑 Shutting down popup registry ({} popup(s))", self.popup_count());

        let instances = std::mem::take(&mut self.instances);
        for (id, mut instance) in instances {
            self.layer.detach(id);
            instance.destroy();
            self.events.emit(PopupEvent::Destroyed(id));
        }
        self.ui.clear();
        self.system.clear();
        self.ignore.clear();
        self.queue.clear();

        self.notify_count();
        self.events.clear();
    }

    fn newest_live(&self, category: PopupCategory) -> Option<PopupId> {
        self.collection(category)
            .iter()
            .rev()
            .copied()
            .find(|id| self.instances.get(id).is_some_and(|p| !p.is_closing()))
    }

    fn collection(&self, category: PopupCategory) -> &Vec<PopupId> {
        match category {
            PopupCategory::Ui => &self.ui,
            PopupCategory::System => &self.system,
            PopupCategory::Ignore => &self.ignore,
            PopupCategory::Queue => &self.queue,
        }
    }

    fn collection_mut(&mut self, category: PopupCategory) -> &mut Vec<PopupId> {
        match category {
            PopupCategory::Ui => &mut self.ui,
            PopupCategory::System => &mut self.system,
            PopupCategory::Ignore => &mut self.ignore,
            PopupCategory::Queue => &mut self.queue,
        }
    }

    fn notify_count(&mut self) {
        let total = self.popup_count();
        self.events.count_changed(total);
    }
}
