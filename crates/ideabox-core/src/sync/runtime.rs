//! Clock and connectivity seams used by the sync engine.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of "now" for push stamps and `lastSync` metadata.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Runtime reachability signal consulted by `should_sync`.
pub trait NetworkStatus: Send + Sync {
    fn is_online(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl NetworkStatus for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Connectivity flag flipped by the embedding app.
#[derive(Debug)]
pub struct NetworkFlag(AtomicBool);

impl NetworkFlag {
    pub const fn new(online: bool) -> Self {
        Self(AtomicBool::new(online))
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::SeqCst);
    }
}

impl NetworkStatus for NetworkFlag {
    fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
