//! In-page navigation between dashboard views, mirrored onto browser history.

mod history;
mod listeners;
mod path;
mod view;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, trace};

use crate::config::RouterConfig;

pub use history::{History, MemoryHistory};
pub use listeners::{ListenerId, Listeners, Subscription};
pub use path::PathCodec;
pub use view::{View, ViewContext, ViewState};

#[derive(Debug, Clone, Default)]
struct RouterState {
    current: ViewState,
    log: Vec<View>,
    initialized: bool,
}

/// Owns the active view and keeps it in step with a [`History`].
///
/// Programmatic navigation pushes entries; back/forward arrive as pop
/// notifications and overwrite the state from the landed-on path. The pop
/// listener is registered by [`ViewRouter::mount`] and removed on
/// [`ViewRouter::unmount`] or drop.
#[derive(Debug)]
pub struct ViewRouter<H: History + ?Sized + 'static> {
    history: Rc<H>,
    codec: PathCodec,
    state: Rc<RefCell<RouterState>>,
    subscribers: Rc<Listeners<ViewState>>,
    pop_subscription: Option<Subscription>,
}

impl<H: History + ?Sized + 'static> ViewRouter<H> {
    pub fn new(history: Rc<H>, codec: PathCodec) -> Self {
        Self {
            history,
            codec,
            state: Rc::new(RefCell::new(RouterState {
                current: ViewState::default(),
                log: vec![View::Chat],
                initialized: false,
            })),
            subscribers: Rc::new(Listeners::new()),
            pop_subscription: None,
        }
    }

    pub fn with_config(history: Rc<H>, config: &RouterConfig) -> Self {
        Self::new(history, PathCodec::from_config(config))
    }

    pub fn codec(&self) -> &PathCodec {
        &self.codec
    }

    pub fn history(&self) -> &Rc<H> {
        &self.history
    }

    /// Hydrates from the current path and starts listening for pops.
    ///
    /// A router that is already mounted is left alone. Hydrating onto a
    /// different non-default view appends it to the visit log.
    pub fn mount(&mut self) {
        if self.pop_subscription.is_some() {
            debug!("router already mounted");
            return;
        }

        let initial = self.codec.decode(&self.history.current_path());
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.current != initial;
            // The log only grows: a remount at an unchanged URL adds nothing.
            if changed && !initial.is_default() {
                state.log.push(initial.view.clone());
            }
            state.current = initial.clone();
            state.initialized = true;
            changed
        };
        debug!("router mounted at {}", initial.view);

        let handler = pop_handler(
            Rc::downgrade(&self.state),
            Rc::downgrade(&self.subscribers),
            self.codec.clone(),
        );
        let id = self.history.listen(handler);
        let history = Rc::clone(&self.history);
        self.pop_subscription = Some(Subscription::new(move || history.unlisten(id)));

        if changed {
            self.subscribers.emit(&initial);
        }
    }

    /// Stops listening for pops. State is kept; the next mount re-hydrates.
    pub fn unmount(&mut self) {
        if self.pop_subscription.take().is_some() {
            self.state.borrow_mut().initialized = false;
            debug!("router unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.pop_subscription.is_some()
    }

    /// Whether the state reflects the URL yet.
    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    pub fn current(&self) -> ViewState {
        self.state.borrow().current.clone()
    }

    pub fn current_path(&self) -> String {
        self.codec.encode(&self.state.borrow().current)
    }

    /// Views visited through [`ViewRouter::navigate`], oldest first.
    pub fn history_log(&self) -> Vec<View> {
        self.state.borrow().log.clone()
    }

    /// Pushes a new history entry for `view` and switches to it.
    pub fn navigate(&self, view: View, context: Option<ViewContext>) {
        let next = ViewState::new(view, context);
        let path = self.codec.encode(&next);
        trace!("navigate -> {path}");
        self.history.push(&path);
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.current != next;
            state.current = next.clone();
            state.log.push(next.view.clone());
            changed
        };
        if changed {
            self.subscribers.emit(&next);
        }
    }

    /// Pushes the root path and resets to the default view. The visit log
    /// is left as is.
    pub fn return_to_default(&self) {
        let root = self.codec.root();
        trace!("return to default -> {root}");
        self.history.push(&root);
        let next = ViewState::default();
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.current != next;
            state.current = next.clone();
            changed
        };
        if changed {
            self.subscribers.emit(&next);
        }
    }

    /// Asks the history to step back. State follows once the pop arrives.
    pub fn go_back(&self) {
        self.history.back();
    }

    /// Applies a pop notification by hand, for hosts that deliver history
    /// events themselves. Never pushes.
    pub fn handle_pop(&self, path: &str) {
        apply_location(&self.state, &self.subscribers, &self.codec, path);
    }

    /// Calls `listener` after every state change until the guard drops.
    pub fn subscribe(&self, listener: impl FnMut(&ViewState) + 'static) -> Subscription {
        Subscription::attach(&self.subscribers, Box::new(listener))
    }
}

fn pop_handler(
    state: Weak<RefCell<RouterState>>,
    subscribers: Weak<Listeners<ViewState>>,
    codec: PathCodec,
) -> Box<dyn FnMut(&str)> {
    Box::new(move |path: &str| {
        let (Some(state), Some(subscribers)) = (state.upgrade(), subscribers.upgrade()) else {
            return;
        };
        apply_location(&state, &subscribers, &codec, path);
    })
}

/// Overwrites the state with what `path` decodes to. Applying the same path
/// again changes nothing and notifies nobody.
fn apply_location(
    state: &RefCell<RouterState>,
    subscribers: &Listeners<ViewState>,
    codec: &PathCodec,
    path: &str,
) {
    let next = codec.decode(path);
    let changed = {
        let mut state = state.borrow_mut();
        if state.current == next {
            false
        } else {
            state.current = next.clone();
            true
        }
    };
    trace!("pop -> {path} (changed: {changed})");
    if changed {
        subscribers.emit(&next);
    }
}
