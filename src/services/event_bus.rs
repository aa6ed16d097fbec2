//! Event bus for frameshell.
//!
//! Process-wide publish/subscribe channel for the notifications the shell
//! core produces. Payloads are a typed enum rather than stringly-named
//! messages; delivery is synchronous, in registration order, to all
//! currently-registered listeners. The bus is constructed explicitly and
//! passed by reference (`Rc`) to whoever publishes or listens.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::command::Notice;

type Listener = Box<dyn Fn(&Notice)>;

/// Synchronous, single-threaded pub/sub bus.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Registers a listener. Listeners are invoked in registration order
    /// and must not register further listeners from inside a callback.
    pub fn subscribe(&self, listener: impl Fn(&Notice) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Delivers a notice to every registered listener, synchronously.
    pub fn publish(&self, notice: &Notice) {
        for listener in self.listeners.borrow().iter() {
            listener(notice);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Test helper: a listener that records every notice it sees.
pub fn recording_listener(bus: &EventBus) -> Rc<RefCell<Vec<Notice>>> {
    let log: Rc<RefCell<Vec<Notice>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    bus.subscribe(move |notice| sink.borrow_mut().push(notice.clone()));
    log
}
