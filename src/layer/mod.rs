//! Popup layer: sibling order and draw ordering
//!
//! The layer is the host every popup is parented to. New popups are attached
//! as the *first* sibling, and each gets a draw-order value one above the
//! current topmost, so stacking is decided by draw order first and sibling
//! position second.

use log::debug;
use std::collections::HashMap;

use crate::popup::PopupId;

/// External controller of an always-on overlay (HUD, toast bar, ...) that
/// flagged popups ask to come to front when they are shown.
pub trait PersistentOverlay {
    fn bring_to_front(&mut self);
}

/// Parenting/ordering host the registry attaches popups to
pub trait LayerHost {
    /// Parent `id` to the layer as its first sibling
    fn attach_first(&mut self, id: PopupId);

    /// Unparent `id`. Unknown ids are ignored.
    fn detach(&mut self, id: PopupId);

    /// Highest draw order currently in use on the layer
    fn top_draw_order(&self) -> i32;

    /// Record the draw order assigned to `id`
    fn set_draw_order(&mut self, id: PopupId, order: i32);

    /// Position of `id` among the layer's children, first sibling = 0
    fn sibling_index(&self, id: PopupId) -> Option<usize>;
}

/// Default in-memory layer host.
///
/// Siblings are stored first to last, mirrored by a position map for O(1)
/// index lookups.
#[derive(Debug, Clone)]
pub struct PopupLayer {
    /// Children ordered first to last
    siblings: Vec<PopupId>,

    /// Fast lookup: popup ID → sibling index
    positions: HashMap<PopupId, usize>,

    /// Draw order assigned to each child
    orders: HashMap<PopupId, i32>,

    /// Draw order of the layer canvas itself
    base_order: i32,
}

impl PopupLayer {
    pub fn new(base_order: i32) -> Self {
        Self {
            siblings: Vec::new(),
            positions: HashMap::new(),
            orders: HashMap::new(),
            base_order,
        }
    }

    pub fn base_order(&self) -> i32 {
        self.base_order
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    pub fn contains(&self, id: PopupId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Children first to last
    pub fn siblings(&self) -> &[PopupId] {
        &self.siblings
    }

    pub fn draw_order(&self, id: PopupId) -> Option<i32> {
        self.orders.get(&id).copied()
    }

    /// Children bottom to top as they would be drawn: ascending draw order,
    /// later siblings above earlier ones on ties.
    pub fn render_order(&self) -> Vec<PopupId> {
        let mut ids = self.siblings.clone();
        ids.sort_by_key(|id| {
            (
                self.orders.get(id).copied().unwrap_or(self.base_order),
                self.positions.get(id).copied().unwrap_or(0),
            )
        });
        ids
    }

    /// Topmost child as drawn
    pub fn top(&self) -> Option<PopupId> {
        self.render_order().last().copied()
    }

    /// Rebuilds the position map from the sibling vector.
    ///
    /// Called after any insertion or removal that shifts indices.
    fn rebuild_positions(&mut self) {
        self.positions.clear();
        for (index, &id) in self.siblings.iter().enumerate() {
            self.positions.insert(id, index);
        }
    }
}

impl Default for PopupLayer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LayerHost for PopupLayer {
    fn attach_first(&mut self, id: PopupId) {
        if self.contains(id) {
            return;
        }
        self.siblings.insert(0, id);
        self.rebuild_positions();
        debug!("🧩 Attached {} to popup layer ({} children)", id, self.siblings.len());
    }

    fn detach(&mut self, id: PopupId) {
        let Some(index) = self.positions.remove(&id) else {
            return;
        };
        self.siblings.remove(index);
        self.orders.remove(&id);
        self.rebuild_positions();
        debug!("🧩 Detached {} from popup layer ({} children)", id, self.siblings.len());
    }

    fn top_draw_order(&self) -> i32 {
        self.orders
            .values()
            .copied()
            .max()
            .map_or(self.base_order, |top| top.max(self.base_order))
    }

    fn set_draw_order(&mut self, id: PopupId, order: i32) {
        if self.contains(id) {
            self.orders.insert(id, order);
        }
    }

    fn sibling_index(&self, id: PopupId) -> Option<usize> {
        self.positions.get(&id).copied()
    }
}
