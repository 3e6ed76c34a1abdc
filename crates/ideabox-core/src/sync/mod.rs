//! Record synchronization with remote providers

mod engine;
mod merge;
mod runtime;
mod status;

pub use engine::{ProviderRef, ProviderSyncResult, SyncEngine, SyncError, SyncReport};
pub use merge::{merge_ideas, MergeOutcome};
pub use runtime::{AlwaysOnline, Clock, FixedClock, NetworkFlag, NetworkStatus, SystemClock};
pub use status::{Subscription, SyncStatus};
