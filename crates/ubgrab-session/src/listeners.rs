//! Listener registry: fan-out of session changes to subscribers.
//!
//! Every subscriber is a callback stored in a slot. Publishing walks a copy
//! of the slot list, so a callback may subscribe or unsubscribe (even
//! itself) without deadlocking the registry.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::SessionSnapshot;

type Callback = dyn Fn(&SessionSnapshot) + Send + Sync + 'static;

struct Slot {
    id: u64,
    /// Cleared on unsubscribe. Checked right before every call, so a
    /// publish that copied the list earlier still skips this slot.
    active: AtomicBool,
    callback: Box<Callback>,
}

#[derive(Default)]
pub(crate) struct Listeners {
    slots: Mutex<Vec<Arc<Slot>>>,
    next_id: AtomicU64,
}

impl Listeners {
    pub(crate) fn register<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let slot = Arc::new(Slot {
            id,
            active: AtomicBool::new(true),
            callback: Box::new(callback),
        });
        self.slots.lock().push(Arc::clone(&slot));

        Subscription {
            slot: Some(slot),
            registry: Arc::downgrade(self),
        }
    }

    /// Calls every active listener once with `snapshot`.
    pub(crate) fn notify(&self, snapshot: &SessionSnapshot) {
        // Clone the `Arc`s out so the lock isn't held while user code runs.
        let slots: Vec<Arc<Slot>> = self.slots.lock().clone();
        for slot in slots {
            if slot.active.load(Ordering::Acquire) {
                (slot.callback)(snapshot);
            }
        }
    }

    /// Drops every listener. Used on manager shutdown.
    pub(crate) fn clear(&self) {
        for slot in self.slots.lock().drain(..) {
            slot.active.store(false, Ordering::Release);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }

    fn remove(&self, id: u64) {
        self.slots.lock().retain(|slot| slot.id != id);
    }
}

/// Handle returned by [`SessionManager::subscribe`](crate::SessionManager::subscribe).
///
/// Dropping it unsubscribes, just like calling [`unsubscribe`](Self::unsubscribe).
/// Use [`detach`](Self::detach) to keep the listener for as long as the
/// manager lives.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    /// `None` once detached or for an inert subscription.
    slot: Option<Arc<Slot>>,
    registry: Weak<Listeners>,
}

impl Subscription {
    /// A subscription that was never registered (the manager was already
    /// shut down).
    pub(crate) fn inert() -> Self {
        Self {
            slot: None,
            registry: Weak::new(),
        }
    }

    /// Stops notifications. Once this returns, no new call to the
    /// listener begins.
    pub fn unsubscribe(self) {
        // The work happens in `Drop`.
    }

    /// Keeps the listener registered without holding on to the handle.
    pub fn detach(mut self) {
        self.slot = None;
    }

    /// `true` while the listener will still be called.
    pub fn is_active(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|slot| slot.active.load(Ordering::Acquire))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        slot.active.store(false, Ordering::Release);
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(slot.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
