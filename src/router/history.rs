use std::cell::{Cell, RefCell};

use log::trace;

use super::listeners::{ListenerId, Listeners};

/// The slice of a browser history API the router relies on.
///
/// Methods take `&self`: a history is shared between the router and whatever
/// drives the event loop, so implementations use interior mutability.
pub trait History {
    /// Path of the active entry.
    fn current_path(&self) -> String;

    /// Adds an entry after the active one and activates it. Does not notify
    /// pop listeners.
    fn push(&self, path: &str);

    /// Requests a step back. Listeners hear about it later, with the path
    /// that is current once the step lands.
    fn back(&self);

    fn listen(&self, handler: Box<dyn FnMut(&str)>) -> ListenerId;

    fn unlisten(&self, id: ListenerId);
}

/// In-memory history with browser semantics.
///
/// Pushing truncates forward entries. `back`, `forward` and `go` move the
/// cursor immediately but only queue the pop notification;
/// [`MemoryHistory::dispatch_pending`] delivers queued notifications, the way
/// a browser delivers `popstate` on a later event-loop turn.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    index: Cell<usize>,
    pending: Cell<usize>,
    listeners: Listeners<str>,
}

impl MemoryHistory {
    pub fn new(initial_path: &str) -> Self {
        Self {
            entries: RefCell::new(vec![initial_path.to_string()]),
            index: Cell::new(0),
            pending: Cell::new(0),
            listeners: Listeners::new(),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> usize {
        self.index.get()
    }

    pub fn forward(&self) {
        self.go(1);
    }

    /// Moves the cursor by `delta`, clamped to the stack. A move that lands
    /// where it started is dropped, as browsers do.
    pub fn go(&self, delta: isize) {
        let last = self.len().saturating_sub(1);
        let current = self.index.get();
        let target = current.saturating_add_signed(delta).min(last);
        if target == current {
            return;
        }
        self.index.set(target);
        self.pending.set(self.pending.get() + 1);
        trace!("history cursor {current} -> {target}");
    }

    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Delivers every queued pop notification, one at a time. Returns how
    /// many were delivered.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        while self.pending.get() > 0 {
            self.pending.set(self.pending.get() - 1);
            let path = self.current_path();
            self.listeners.emit(path.as_str());
            delivered += 1;
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        self.entries
            .borrow()
            .get(self.index.get())
            .cloned()
            .unwrap_or_default()
    }

    fn push(&self, path: &str) {
        let mut entries = self.entries.borrow_mut();
        entries.truncate(self.index.get() + 1);
        entries.push(path.to_string());
        self.index.set(entries.len() - 1);
    }

    fn back(&self) {
        self.go(-1);
    }

    fn listen(&self, handler: Box<dyn FnMut(&str)>) -> ListenerId {
        self.listeners.add(handler)
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn push_truncates_forward_entries() {
        let history = MemoryHistory::new("/a");
        history.push("/b");
        history.push("/c");
        history.back();
        history.back();
        assert_eq!(history.current_path(), "/a");
        history.push("/d");
        assert_eq!(history.entries(), vec!["/a", "/d"]);
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn pop_events_are_deferred() {
        let history = MemoryHistory::new("/a");
        history.push("/b");
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            history.listen(Box::new(move |path: &str| seen.borrow_mut().push(path.to_string())));
        }
        history.back();
        assert!(seen.borrow().is_empty());
        assert_eq!(history.pending(), 1);
        assert_eq!(history.dispatch_pending(), 1);
        assert_eq!(*seen.borrow(), vec!["/a".to_string()]);
    }

    #[test]
    fn clamped_moves_do_not_fire() {
        let history = MemoryHistory::new("/a");
        history.back();
        history.forward();
        history.go(0);
        assert_eq!(history.pending(), 0);
        history.push("/b");
        history.go(-5);
        assert_eq!(history.current_path(), "/a");
        assert_eq!(history.pending(), 1);
    }

    #[test]
    fn push_does_not_notify() {
        let history = MemoryHistory::new("/a");
        let count = Rc::new(Cell::new(0));
        {
            let count = Rc::clone(&count);
            history.listen(Box::new(move |_: &str| count.set(count.get() + 1)));
        }
        history.push("/b");
        assert_eq!(history.dispatch_pending(), 0);
        assert_eq!(count.get(), 0);
    }
}
