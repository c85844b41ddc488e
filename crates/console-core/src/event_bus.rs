//! Simple event bus for decoupled communication between the console
//! pipeline and the presentation layer.
//!
//! The bus is single-threaded (WASM constraint) and uses interior mutability
//! via RefCell. Events are buffered and drained by the view on each update.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use console_types::event::{ConsoleEvent, Notification};

/// Shared event bus, clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<ConsoleEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn emit(&self, event: ConsoleEvent) {
        self.inner.borrow_mut().push_back(event);
    }

    pub fn notify(&self, notification: Notification) {
        self.emit(ConsoleEvent::Notify(notification));
    }

    /// Drain all pending events. Called by the presentation layer.
    pub fn drain(&self) -> Vec<ConsoleEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
