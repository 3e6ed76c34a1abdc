//! Record sync engine
//!
//! One cycle per provider: read local state, fetch the remote dataset, merge,
//! write the merge back locally, push the full dataset if anything local is
//! newer or pending, then record the sync time. Cycles never overlap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use crate::providers::{ProviderError, RemoteDataset, RemoteProvider};
use crate::store::{last_sync_key, LocalStore};

use super::merge::merge_ideas;
use super::runtime::{AlwaysOnline, Clock, NetworkStatus, SystemClock};
use super::status::{StatusCell, Subscription, SyncStatus};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Sync already in progress")]
    AlreadyInProgress,
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),
    #[error(transparent)]
    Store(#[from] crate::Error),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Outcome of one provider's cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSyncResult {
    pub provider: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Records in the merged dataset, zero on failure.
    pub merged: usize,
}

impl ProviderSyncResult {
    fn succeeded(provider: &str, merged: usize) -> Self {
        Self {
            provider: provider.to_string(),
            success: true,
            error: None,
            merged,
        }
    }

    fn failed(provider: &str, error: &SyncError) -> Self {
        Self {
            provider: provider.to_string(),
            success: false,
            error: Some(error.to_string()),
            merged: 0,
        }
    }
}

/// Aggregate of [`SyncEngine::sync`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// True iff every provider succeeded (vacuously true with none).
    pub success: bool,
    pub results: Vec<ProviderSyncResult>,
}

impl SyncReport {
    fn from_results(results: Vec<ProviderSyncResult>) -> Self {
        Self {
            success: results.iter().all(|result| result.success),
            results,
        }
    }
}

/// Provider selector for [`SyncEngine::sync_to_provider`].
pub enum ProviderRef<'a> {
    Name(&'a str),
    Provider(Arc<dyn RemoteProvider>),
}

impl<'a> From<&'a str> for ProviderRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<Arc<dyn RemoteProvider>> for ProviderRef<'_> {
    fn from(provider: Arc<dyn RemoteProvider>) -> Self {
        Self::Provider(provider)
    }
}

/// Clears the in-progress flag when a cycle ends, even if its future is dropped.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SyncEngine {
    store: Arc<dyn LocalStore>,
    network: Arc<dyn NetworkStatus>,
    clock: Arc<dyn Clock>,
    providers: RwLock<Vec<Arc<dyn RemoteProvider>>>,
    in_progress: AtomicBool,
    status: StatusCell,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn LocalStore>, network: Arc<dyn NetworkStatus>) -> Self {
        Self {
            store,
            network,
            clock: Arc::new(SystemClock),
            providers: RwLock::new(Vec::new()),
            in_progress: AtomicBool::new(false),
            status: StatusCell::default(),
        }
    }

    /// Engine that considers the network always reachable.
    pub fn online(store: Arc<dyn LocalStore>) -> Self {
        Self::new(store, Arc::new(AlwaysOnline))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a provider, replacing any existing one with the same name.
    pub fn register_provider(&self, provider: Arc<dyn RemoteProvider>) {
        let mut providers = self.providers.write();
        if let Some(slot) = providers
            .iter_mut()
            .find(|existing| existing.name() == provider.name())
        {
            tracing::debug!("Replacing sync provider {}", provider.name());
            *slot = provider;
        } else {
            tracing::debug!("Registered sync provider {}", provider.name());
            providers.push(provider);
        }
    }

    /// Returns whether a provider with that name was registered.
    pub fn unregister_provider(&self, name: &str) -> bool {
        let mut providers = self.providers.write();
        let before = providers.len();
        providers.retain(|provider| provider.name() != name);
        before != providers.len()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .read()
            .iter()
            .map(|provider| provider.name().to_string())
            .collect()
    }

    fn provider(&self, name: &str) -> Option<Arc<dyn RemoteProvider>> {
        self.providers
            .read()
            .iter()
            .find(|provider| provider.name() == name)
            .cloned()
    }

    /// Online and at least one provider registered.
    pub fn should_sync(&self) -> bool {
        self.network.is_online() && !self.providers.read().is_empty()
    }

    pub fn status(&self) -> SyncStatus {
        self.status.get()
    }

    /// Observe status transitions until the returned handle is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(SyncStatus) + Send + Sync + 'static,
    {
        self.status.subscribe(Arc::new(listener))
    }

    /// Last successful sync with `provider`, if any.
    pub async fn last_sync(&self, provider: &str) -> crate::Result<Option<DateTime<Utc>>> {
        let Some(value) = self.store.get_meta(&last_sync_key(provider)).await? else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(&value)
            .map(|time| Some(time.with_timezone(&Utc)))
            .map_err(|error| {
                crate::Error::InvalidInput(format!("Invalid lastSync value '{value}': {error}"))
            })
    }

    /// Sync with every registered provider in registration order.
    ///
    /// A failing provider does not stop the others.
    pub async fn sync(&self) -> SyncReport {
        let providers = self.providers.read().clone();
        if providers.is_empty() {
            tracing::debug!("No sync providers registered");
            return SyncReport::from_results(Vec::new());
        }

        let mut results = Vec::with_capacity(providers.len());
        for provider in providers {
            results.push(self.sync_to_provider(provider).await);
        }
        SyncReport::from_results(results)
    }

    /// Run one sync cycle against a registered provider name or a provider.
    pub async fn sync_to_provider<'a>(
        &self,
        target: impl Into<ProviderRef<'a>>,
    ) -> ProviderSyncResult {
        let provider = match target.into() {
            ProviderRef::Provider(provider) => provider,
            ProviderRef::Name(name) => match self.provider(name) {
                Some(provider) => provider,
                None => {
                    return ProviderSyncResult::failed(
                        name,
                        &SyncError::ProviderNotFound(name.to_string()),
                    )
                }
            },
        };
        let name = provider.name().to_string();

        let Some(guard) = CycleGuard::acquire(&self.in_progress) else {
            tracing::debug!("Skipping sync with {name}: another sync is running");
            return ProviderSyncResult::failed(&name, &SyncError::AlreadyInProgress);
        };

        self.status.set(SyncStatus::Syncing);
        let outcome = self.run_cycle(provider.as_ref()).await;

        // Final status is published while the guard is still held
        let result = match outcome {
            Ok(merged) => {
                tracing::info!("Synced {merged} ideas with {name}");
                self.status.set(SyncStatus::Idle);
                ProviderSyncResult::succeeded(&name, merged)
            }
            Err(error) => {
                tracing::warn!("Sync with {name} failed: {error}");
                self.status.set(SyncStatus::Error);
                ProviderSyncResult::failed(&name, &error)
            }
        };
        drop(guard);
        result
    }

    async fn run_cycle(&self, provider: &dyn RemoteProvider) -> Result<usize, SyncError> {
        let name = provider.name();
        let meta_key = last_sync_key(name);

        let local = self.store.all_ideas().await?;
        let pending = self.store.pending_ideas().await?;
        let last_sync = self.store.get_meta(&meta_key).await?;
        tracing::debug!(
            "Syncing with {name}: {} local, {} pending, last sync {}",
            local.len(),
            pending.len(),
            last_sync.as_deref().unwrap_or("never")
        );

        let remote = provider.fetch().await?;
        let unrecognized = remote.unrecognized;
        let outcome = merge_ideas(local, remote.ideas);
        self.store.upsert_ideas(&outcome.merged).await?;

        if !outcome.to_upload.is_empty() || !pending.is_empty() {
            let ideas = outcome
                .merged
                .iter()
                .cloned()
                .map(|mut idea| {
                    idea.pending_sync = false;
                    idea
                })
                .collect();
            let dataset =
                RemoteDataset::new(ideas, self.clock.now()).with_unrecognized(unrecognized);
            provider.push(&dataset).await?;
            for idea in &pending {
                self.store.mark_synced(&idea.id).await?;
            }
            tracing::debug!(
                "Pushed {} ideas to {name} ({} newer locally)",
                outcome.merged.len(),
                outcome.to_upload.len()
            );
        }

        self.store
            .set_meta(&meta_key, &self.clock.now().to_rfc3339())
            .await?;
        Ok(outcome.merged.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::models::{Attachment, AttachmentId, Idea, IdeaId};
    use crate::providers::{FolderProvider, MemoryProvider, ProviderResult};
    use crate::store::MemoryStore;
    use crate::sync::{FixedClock, NetworkFlag};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn note(id: &str, content: &str, day: u32, pending: bool) -> Idea {
        let mut idea = Idea::note(content);
        idea.id = IdeaId::from(id);
        idea.created_at = at(1);
        idea.updated_at = at(day);
        idea.pending_sync = pending;
        idea
    }

    fn engine_with(store: Arc<dyn LocalStore>) -> SyncEngine {
        SyncEngine::online(store).with_clock(Arc::new(FixedClock::new(at(10))))
    }

    /// Store wrapper counting every call, to prove a path does no I/O.
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl LocalStore for CountingStore {
        async fn all_ideas(&self) -> crate::Result<Vec<Idea>> {
            self.hit();
            self.inner.all_ideas().await
        }
        async fn get_idea(&self, id: &IdeaId) -> crate::Result<Option<Idea>> {
            self.hit();
            self.inner.get_idea(id).await
        }
        async fn pending_ideas(&self) -> crate::Result<Vec<Idea>> {
            self.hit();
            self.inner.pending_ideas().await
        }
        async fn upsert_idea(&self, idea: &Idea) -> crate::Result<()> {
            self.hit();
            self.inner.upsert_idea(idea).await
        }
        async fn upsert_ideas(&self, ideas: &[Idea]) -> crate::Result<()> {
            self.hit();
            self.inner.upsert_ideas(ideas).await
        }
        async fn delete_idea(&self, id: &IdeaId) -> crate::Result<bool> {
            self.hit();
            self.inner.delete_idea(id).await
        }
        async fn mark_synced(&self, id: &IdeaId) -> crate::Result<()> {
            self.hit();
            self.inner.mark_synced(id).await
        }
        async fn get_blob(&self, id: &AttachmentId) -> crate::Result<Option<Vec<u8>>> {
            self.hit();
            self.inner.get_blob(id).await
        }
        async fn put_blob(&self, id: &AttachmentId, blob: &[u8]) -> crate::Result<()> {
            self.hit();
            self.inner.put_blob(id, blob).await
        }
        async fn delete_blob(&self, id: &AttachmentId) -> crate::Result<()> {
            self.hit();
            self.inner.delete_blob(id).await
        }
        async fn save_attachment(&self, attachment: &Attachment) -> crate::Result<()> {
            self.hit();
            self.inner.save_attachment(attachment).await
        }
        async fn get_attachment(&self, id: &AttachmentId) -> crate::Result<Option<Attachment>> {
            self.hit();
            self.inner.get_attachment(id).await
        }
        async fn get_meta(&self, key: &str) -> crate::Result<Option<String>> {
            self.hit();
            self.inner.get_meta(key).await
        }
        async fn set_meta(&self, key: &str, value: &str) -> crate::Result<()> {
            self.hit();
            self.inner.set_meta(key, value).await
        }
    }

    /// Provider whose fetch parks until released.
    struct GatedProvider {
        inner: MemoryProvider,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RemoteProvider for GatedProvider {
        fn name(&self) -> &str {
            self.inner.name()
        }

        async fn fetch(&self) -> ProviderResult<RemoteDataset> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.fetch().await
        }

        async fn push(&self, data: &RemoteDataset) -> ProviderResult<()> {
            self.inner.push(data).await
        }
    }

    #[tokio::test]
    async fn no_providers_is_a_successful_no_op() {
        let store = Arc::new(CountingStore::new(MemoryStore::new()));
        let engine = engine_with(store.clone());

        let report = engine.sync().await;

        assert!(report.success);
        assert!(report.results.is_empty());
        assert_eq!(store.calls(), 0);
        assert_eq!(engine.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn newer_remote_copy_replaces_local_and_clears_pending() {
        let store = Arc::new(MemoryStore::with_ideas([note("a", "local", 1, true)]));
        let remote = Arc::new(MemoryProvider::new("drive").with_ideas(vec![note(
            "a", "remote", 2, false,
        )]));
        let engine = engine_with(store.clone());
        engine.register_provider(remote.clone());

        let result = engine.sync_to_provider("drive").await;

        assert!(result.success, "{result:?}");
        assert_eq!(result.merged, 1);
        let stored = store.get_idea(&IdeaId::from("a")).await.unwrap().unwrap();
        assert_eq!(stored.title(), "remote");
        assert!(!stored.pending_sync);
        assert!(store.pending_ideas().await.unwrap().is_empty());

        // the local record was pending, so the merged dataset is pushed
        let pushed = remote.dataset().unwrap();
        assert_eq!(pushed.last_modified, Some(at(10)));
        assert_eq!(pushed.ideas.len(), 1);
        assert_eq!(pushed.ideas[0].title(), "remote");
        assert!(!pushed.ideas[0].pending_sync);
    }

    #[tokio::test]
    async fn newer_local_copy_is_pushed() {
        let store = Arc::new(MemoryStore::with_ideas([note("a", "local", 3, true)]));
        let remote = Arc::new(MemoryProvider::new("drive").with_ideas(vec![
            note("a", "remote", 2, false),
            note("b", "other device", 1, false),
        ]));
        let engine = engine_with(store.clone());
        engine.register_provider(remote.clone());

        let result = engine.sync_to_provider("drive").await;

        assert!(result.success);
        let pushed = remote.dataset().unwrap();
        let titles: Vec<_> = pushed.ideas.iter().map(Idea::title).collect();
        assert_eq!(titles, vec!["local", "other device"]);
        assert!(pushed.ideas.iter().all(|idea| !idea.pending_sync));
        assert!(store.pending_ideas().await.unwrap().is_empty());
        assert_eq!(store.all_ideas().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn nothing_pending_and_nothing_newer_skips_push() {
        let store = Arc::new(MemoryStore::with_ideas([note("a", "same", 2, false)]));
        let remote = Arc::new(MemoryProvider::new("drive").with_ideas(vec![
            note("a", "same", 2, false),
            note("b", "new remote", 1, false),
        ]));
        let engine = engine_with(store.clone());
        engine.register_provider(remote.clone());

        let result = engine.sync_to_provider("drive").await;

        assert!(result.success);
        assert_eq!(remote.push_count(), 0);
        assert_eq!(store.all_ideas().await.unwrap().len(), 2);
        assert_eq!(engine.last_sync("drive").await.unwrap(), Some(at(10)));
    }

    #[tokio::test]
    async fn repeated_sync_converges() {
        let store = Arc::new(MemoryStore::with_ideas([note("a", "local", 3, true)]));
        let remote = Arc::new(
            MemoryProvider::new("drive").with_ideas(vec![note("c", "remote", 1, false)]),
        );
        let engine = engine_with(store.clone());
        engine.register_provider(remote.clone());

        assert!(engine.sync().await.success);
        let after_first = store.all_ideas().await.unwrap();
        assert!(engine.sync().await.success);

        assert_eq!(store.all_ideas().await.unwrap(), after_first);
        assert_eq!(remote.push_count(), 1);
    }

    #[tokio::test]
    async fn unknown_provider_name_fails_without_io() {
        let store = Arc::new(CountingStore::new(MemoryStore::new()));
        let engine = engine_with(store.clone());

        let result = engine.sync_to_provider("nowhere").await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Provider not found: nowhere"));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn unregistered_provider_object_can_still_sync() {
        let store = Arc::new(MemoryStore::with_ideas([note("a", "local", 1, true)]));
        let engine = engine_with(store);
        let provider: Arc<dyn RemoteProvider> = Arc::new(MemoryProvider::new("adhoc"));

        let result = engine.sync_to_provider(provider).await;

        assert!(result.success);
        assert!(engine.provider_names().is_empty());
    }

    #[tokio::test]
    async fn failing_provider_sets_error_and_others_still_run() {
        let store = Arc::new(MemoryStore::with_ideas([note("a", "local", 1, true)]));
        let broken = Arc::new(MemoryProvider::new("broken"));
        broken.fail_fetch(Some("offline"));
        let healthy = Arc::new(MemoryProvider::new("healthy"));
        let engine = engine_with(store.clone());
        engine.register_provider(broken);
        engine.register_provider(healthy.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = engine.subscribe(move |status| sink.lock().push(status));

        let report = engine.sync().await;

        assert!(!report.success);
        assert_eq!(report.results.len(), 2);
        assert_eq!(
            report.results[0].error.as_deref(),
            Some("Transport error: offline")
        );
        assert!(report.results[1].success);
        assert_eq!(healthy.push_count(), 1);
        assert_eq!(engine.last_sync("broken").await.unwrap(), None);
        assert_eq!(
            *seen.lock(),
            vec![
                SyncStatus::Syncing,
                SyncStatus::Error,
                SyncStatus::Syncing,
                SyncStatus::Idle,
            ]
        );
    }

    #[tokio::test]
    async fn failed_push_keeps_records_pending() {
        let store = Arc::new(MemoryStore::with_ideas([note("a", "local", 1, true)]));
        let remote = Arc::new(MemoryProvider::new("drive"));
        remote.fail_push(Some("quota"));
        let engine = engine_with(store.clone());
        engine.register_provider(remote);

        let result = engine.sync_to_provider("drive").await;

        assert!(!result.success);
        assert_eq!(engine.status(), SyncStatus::Error);
        assert_eq!(store.pending_ideas().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn overlapping_sync_is_rejected_without_touching_store() {
        let store = Arc::new(CountingStore::new(MemoryStore::with_ideas([note(
            "a", "local", 1, true,
        )])));
        let gated = Arc::new(GatedProvider {
            inner: MemoryProvider::new("slow"),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let engine = Arc::new(engine_with(store.clone()));
        engine.register_provider(gated.clone());

        let running = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.sync_to_provider("slow").await })
        };
        gated.entered.notified().await;
        assert_eq!(engine.status(), SyncStatus::Syncing);

        let calls_before = store.calls();
        let rejected = engine.sync_to_provider("slow").await;
        let report = engine.sync().await;

        assert!(!rejected.success);
        assert_eq!(rejected.error.as_deref(), Some("Sync already in progress"));
        assert!(!report.success);
        assert_eq!(store.calls(), calls_before);

        gated.release.notify_one();
        let finished = running.await.unwrap();
        assert!(finished.success);
        assert_eq!(engine.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn undecodable_remote_records_survive_a_push() {
        let tmp = tempfile::tempdir().unwrap();
        let foreign = serde_json::json!({
            "id": "other-device",
            "type": "project",
            "title": "no interest yet",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        });
        let seeded = serde_json::json!({ "ideas": [foreign.clone()] });
        std::fs::write(
            tmp.path().join("ideas.json"),
            serde_json::to_vec(&seeded).unwrap(),
        )
        .unwrap();

        let store = Arc::new(MemoryStore::with_ideas([note("a", "local", 3, true)]));
        let engine = engine_with(store.clone());
        engine.register_provider(Arc::new(FolderProvider::new("drive", tmp.path())));

        let result = engine.sync_to_provider("drive").await;
        assert!(result.success);
        assert_eq!(result.merged, 1);

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(tmp.path().join("ideas.json")).unwrap())
                .unwrap();
        let ideas = written["ideas"].as_array().unwrap();
        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[0]["id"], "a");
        assert_eq!(ideas[1], foreign);
        assert_eq!(store.all_ideas().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn final_status_is_published_while_cycle_is_still_held() {
        let store = Arc::new(MemoryStore::with_ideas([note("a", "local", 1, true)]));
        let broken = Arc::new(MemoryProvider::new("broken"));
        broken.fail_fetch(Some("offline"));
        let engine = Arc::new(engine_with(store));
        engine.register_provider(Arc::new(MemoryProvider::new("drive")));
        engine.register_provider(broken);

        let weak = Arc::downgrade(&engine);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = engine.subscribe(move |status: SyncStatus| {
            if let Some(engine) = weak.upgrade() {
                sink.lock()
                    .push((status, engine.in_progress.load(Ordering::SeqCst)));
            }
        });

        engine.sync().await;

        assert_eq!(
            *seen.lock(),
            vec![
                (SyncStatus::Syncing, true),
                (SyncStatus::Idle, true),
                (SyncStatus::Syncing, true),
                (SyncStatus::Error, true),
            ]
        );
        assert!(!engine.in_progress.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn registering_same_name_replaces_in_place() {
        let engine = engine_with(Arc::new(MemoryStore::new()));
        engine.register_provider(Arc::new(MemoryProvider::new("a")));
        engine.register_provider(Arc::new(MemoryProvider::new("b")));
        engine.register_provider(Arc::new(MemoryProvider::new("a")));

        assert_eq!(engine.provider_names(), vec!["a", "b"]);
        assert!(engine.unregister_provider("a"));
        assert!(!engine.unregister_provider("a"));
        assert_eq!(engine.provider_names(), vec!["b"]);
    }

    #[tokio::test]
    async fn should_sync_needs_network_and_provider() {
        let network = Arc::new(NetworkFlag::new(true));
        let engine = SyncEngine::new(Arc::new(MemoryStore::new()), network.clone());
        assert!(!engine.should_sync());

        engine.register_provider(Arc::new(MemoryProvider::new("drive")));
        assert!(engine.should_sync());

        network.set_online(false);
        assert!(!engine.should_sync());
    }
}
