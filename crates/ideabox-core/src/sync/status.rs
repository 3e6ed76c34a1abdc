//! Sync status and status observers.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

/// Record sync state machine: `Idle -> Syncing -> Idle | Error`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Error,
}

impl SyncStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Error => "error",
        }
    }
}

type Listener = Arc<dyn Fn(SyncStatus) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Current status plus the listeners to tell when it changes.
#[derive(Default)]
pub(crate) struct StatusCell {
    status: Mutex<SyncStatus>,
    registry: Arc<Mutex<Registry>>,
}

impl StatusCell {
    pub(crate) fn get(&self) -> SyncStatus {
        *self.status.lock()
    }

    /// Store `next` and notify listeners if it differs from the current value.
    pub(crate) fn set(&self, next: SyncStatus) {
        {
            let mut status = self.status.lock();
            if *status == next {
                return;
            }
            *status = next;
        }

        // Call outside the lock so listeners may subscribe or read status
        let listeners = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect::<Vec<_>>();
        for listener in listeners {
            listener(next);
        }
    }

    pub(crate) fn subscribe(&self, listener: Listener) -> Subscription {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, listener));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }
}

/// Handle for a status listener. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
