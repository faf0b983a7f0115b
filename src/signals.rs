//! Scoped signal-subscription bookkeeping.
//!
//! Shell objects hand out opaque handler ids on `connect` and expect a
//! matching `disconnect` before the subscriber goes away. Tracking those
//! pairs by hand is where leaks creep in, so every connect in this crate is
//! recorded in a [`Subscriptions`] registry whose `release_all` tears the
//! whole set down at once. Dropping the registry releases anything left.

use log::debug;

/// Opaque id of a registered signal handler, as returned by
/// [`SignalEmitter::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(pub u64);

/// An object that hands out signal subscriptions.
///
/// The shell delivers the actual callbacks through its own dispatch (here:
/// the event loop); `connect`/`disconnect` are the registration contract
/// the subscriber must balance.
pub trait SignalEmitter {
    /// Register interest in `signal` and return the handler id.
    fn connect(&self, signal: &str) -> SignalId;

    /// Release a previously registered handler.
    fn disconnect(&self, id: SignalId);
}

/// A registry of subscriptions released together.
///
/// `track` stores a teardown closure (typically `move || emitter.disconnect(id)`);
/// [`release_all`](Subscriptions::release_all) runs every stored closure in
/// reverse registration order. The registry releases itself on drop so a
/// forgotten teardown path cannot leak handlers.
#[derive(Default)]
pub struct Subscriptions {
    teardowns: Vec<Box<dyn FnOnce()>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `signal` on `emitter` and record the matching disconnect.
    pub fn connect<E>(&mut self, emitter: std::rc::Rc<E>, signal: &str)
    where
        E: SignalEmitter + 'static,
    {
        let id = emitter.connect(signal);
        self.track(move || emitter.disconnect(id));
    }

    /// Record an arbitrary teardown closure.
    pub fn track(&mut self, teardown: impl FnOnce() + 'static) {
        self.teardowns.push(Box::new(teardown));
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.teardowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teardowns.is_empty()
    }

    /// Release every tracked subscription, newest first.
    pub fn release_all(&mut self) {
        let count = self.teardowns.len();
        for teardown in self.teardowns.drain(..).rev() {
            teardown();
        }
        if count > 0 {
            debug!("released {} signal subscription(s)", count);
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.release_all();
    }
}
