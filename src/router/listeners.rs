use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Single-threaded callback registry.
///
/// `emit` snapshots the handler list before calling out, so handlers may add
/// or remove listeners (including themselves) while being notified.
pub struct Listeners<T: ?Sized> {
    next_id: Cell<u64>,
    #[allow(clippy::type_complexity)]
    handlers: RefCell<Vec<(ListenerId, Rc<RefCell<Box<dyn FnMut(&T)>>>)>>,
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            handlers: RefCell::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handler: Box<dyn FnMut(&T)>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(handler))));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn emit(&self, value: &T) {
        let snapshot = self.handlers.borrow().clone();
        for (id, handler) in snapshot {
            match handler.try_borrow_mut() {
                Ok(mut handler) => (*handler)(value),
                Err(_) => warn!("listener {id:?} re-entered during its own notification; skipped"),
            }
        }
    }
}

impl<T: ?Sized> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}

/// Keeps a listener registered for as long as it is alive.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Registers `handler` on `listeners`; dropping the guard removes it.
    pub fn attach<T: ?Sized + 'static>(
        listeners: &Rc<Listeners<T>>,
        handler: Box<dyn FnMut(&T)>,
    ) -> Self {
        let id = listeners.add(handler);
        let listeners = Rc::downgrade(listeners);
        Self::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.remove(id);
            }
        })
    }

    /// Leaves the listener registered for good.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
