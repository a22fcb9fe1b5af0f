use std::cell::RefCell;

use crate::event::{EditorEvent, EventHandler};

/// Fan-out of editor events to the host's observers, in subscription order
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    /// Deliver one event to every observer.
    ///
    /// Observers get a shared view of the event while the bus is borrowed, so
    /// an observer that emits on this bus from inside its handler has that
    /// nested event dropped with a warning. Returns whether it was delivered.
    pub fn emit(&self, event: EditorEvent) -> bool {
        self.emit_all([event])
    }

    /// Deliver a batch, e.g. the scene changes of one gesture step, in order
    pub fn emit_all(&self, events: impl IntoIterator<Item = EditorEvent>) -> bool {
        let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
            log::warn!("Observer emitted while handling an event, nested events dropped");
            return false;
        };
        for event in events {
            for handler in handlers.iter_mut() {
                handler.handle_event(&event);
            }
        }
        true
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.try_borrow().map_or(0, |handlers| handlers.len())
    }
}
