//! Registry notifications
//!
//! Two kinds of listeners hang off the registry: count listeners, told the
//! live total across all four collections after every creation or removal,
//! and lifecycle listeners that see every [`PopupEvent`].

use std::fmt;

use crate::popup::PopupId;

/// Lifecycle events emitted by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEvent {
    Created(PopupId),
    Shown(PopupId),
    /// The opening transition settled
    Opened(PopupId),
    Closing(PopupId),
    CloseAnimationCompleted(PopupId),
    Destroyed(PopupId),
    CountChanged(usize),
}

impl PopupEvent {
    /// Popup the event is about, if any
    pub fn popup(&self) -> Option<PopupId> {
        match *self {
            PopupEvent::Created(id)
            | PopupEvent::Shown(id)
            | PopupEvent::Opened(id)
            | PopupEvent::Closing(id)
            | PopupEvent::CloseAnimationCompleted(id)
            | PopupEvent::Destroyed(id) => Some(id),
            PopupEvent::CountChanged(_) => None,
        }
    }
}

impl fmt::Display for PopupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopupEvent::Created(id) => write!(f, "created {}", id),
            PopupEvent::Shown(id) => write!(f, "shown {}", id),
            PopupEvent::Opened(id) => write!(f, "opened {}", id),
            PopupEvent::Closing(id) => write!(f, "closing {}", id),
            PopupEvent::CloseAnimationCompleted(id) => write!(f, "close animation completed {}", id),
            PopupEvent::Destroyed(id) => write!(f, "destroyed {}", id),
            PopupEvent::CountChanged(total) => write!(f, "count changed to {}", total),
        }
    }
}

type CountListener = Box<dyn FnMut(usize)>;
type EventListener = Box<dyn FnMut(&PopupEvent)>;

/// Listener storage and dispatch
#[derive(Default)]
pub struct EventHub {
    count_listeners: Vec<CountListener>,
    event_listeners: Vec<EventListener>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_count_listener<F>(&mut self, listener: F)
    where
        F: FnMut(usize) + 'static,
    {
        self.count_listeners.push(Box::new(listener));
    }

    pub fn add_event_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&PopupEvent) + 'static,
    {
        self.event_listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: PopupEvent) {
        for listener in &mut self.event_listeners {
            listener(&event);
        }
    }

    /// Tell count listeners the new total, then emit `CountChanged`
    pub fn count_changed(&mut self, total: usize) {
        for listener in &mut self.count_listeners {
            listener(total);
        }
        self.emit(PopupEvent::CountChanged(total));
    }

    pub fn listener_count(&self) -> usize {
        self.count_listeners.len() + self.event_listeners.len()
    }

    pub fn clear(&mut self) {
        self.count_listeners.clear();
        self.event_listeners.clear();
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("count_listeners", &self.count_listeners.len())
            .field("event_listeners", &self.event_listeners.len())
            .finish()
    }
}
