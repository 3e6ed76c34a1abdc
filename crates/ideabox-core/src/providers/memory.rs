//! In-process remote provider
//!
//! Keeps the "remote" dataset and blobs in memory. Useful for tests, demos
//! and embedding apps that want to exercise sync without a backend. Failures
//! can be injected per operation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::models::{AttachmentId, Idea, RemoteAttachment};

use super::{
    AttachmentCapabilities, AttachmentProvider, ProviderError, ProviderResult, RemoteDataset,
    RemoteProvider,
};

#[derive(Default)]
struct Failures {
    fetch: Option<String>,
    push: Option<String>,
    list: Option<String>,
    upload_filenames: HashSet<String>,
}

/// [`RemoteProvider`] holding its dataset in memory.
pub struct MemoryProvider {
    name: String,
    dataset: Mutex<Option<RemoteDataset>>,
    capabilities: Option<AttachmentCapabilities>,
    blobs: Mutex<HashMap<String, (RemoteAttachment, Vec<u8>)>>,
    failures: Mutex<Failures>,
    fetches: AtomicUsize,
    pushes: AtomicUsize,
    uploads: AtomicUsize,
    downloads: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryProvider {
    /// A record-only provider that was never written to.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dataset: Mutex::new(None),
            capabilities: None,
            blobs: Mutex::new(HashMap::new()),
            failures: Mutex::new(Failures::default()),
            fetches: AtomicUsize::new(0),
            pushes: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Enable blob storage with the given capabilities.
    #[must_use]
    pub const fn with_attachments(mut self, capabilities: AttachmentCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Seed the remote dataset.
    #[must_use]
    pub fn with_ideas(self, ideas: Vec<Idea>) -> Self {
        *self.dataset.lock() = Some(RemoteDataset {
            ideas,
            ..RemoteDataset::default()
        });
        self
    }

    /// Current remote dataset, `None` if never written.
    pub fn dataset(&self) -> Option<RemoteDataset> {
        self.dataset.lock().clone()
    }

    /// Seed a remote blob as if another device had uploaded it.
    pub fn insert_blob(&self, entry: RemoteAttachment, blob: Vec<u8>) {
        self.blobs
            .lock()
            .insert(entry.remote_id.clone(), (entry, blob));
    }

    pub fn has_blob(&self, remote_id: &str) -> bool {
        self.blobs.lock().contains_key(remote_id)
    }

    /// Make every fetch fail with `message` (or succeed again with `None`).
    pub fn fail_fetch(&self, message: Option<&str>) {
        self.failures.lock().fetch = message.map(ToOwned::to_owned);
    }

    pub fn fail_push(&self, message: Option<&str>) {
        self.failures.lock().push = message.map(ToOwned::to_owned);
    }

    pub fn fail_list(&self, message: Option<&str>) {
        self.failures.lock().list = message.map(ToOwned::to_owned);
    }

    /// Make uploads of files named `filename` fail.
    pub fn fail_upload_of(&self, filename: &str) {
        self.failures
            .lock()
            .upload_filenames
            .insert(filename.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteProvider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> ProviderResult<RemoteDataset> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failures.lock().fetch.clone() {
            return Err(ProviderError::Transport(message));
        }
        Ok(self.dataset.lock().clone().unwrap_or_default())
    }

    async fn push(&self, data: &RemoteDataset) -> ProviderResult<()> {
        if let Some(message) = self.failures.lock().push.clone() {
            return Err(ProviderError::Transport(message));
        }
        self.pushes.fetch_add(1, Ordering::SeqCst);
        *self.dataset.lock() = Some(data.clone());
        Ok(())
    }

    fn attachments(&self) -> Option<&dyn AttachmentProvider> {
        self.capabilities.map(|_| self as &dyn AttachmentProvider)
    }
}

#[async_trait]
impl AttachmentProvider for MemoryProvider {
    fn capabilities(&self) -> AttachmentCapabilities {
        self.capabilities.unwrap_or(AttachmentCapabilities::NONE)
    }

    async fn upload_attachment(
        &self,
        id: &AttachmentId,
        filename: &str,
        blob: &[u8],
        mime_type: &str,
    ) -> ProviderResult<String> {
        if self.failures.lock().upload_filenames.contains(filename) {
            return Err(ProviderError::Transport(format!(
                "upload rejected for {filename}"
            )));
        }

        self.uploads.fetch_add(1, Ordering::SeqCst);
        let remote_id = format!("{}-{id}", self.name);
        let entry = RemoteAttachment {
            id: id.clone(),
            remote_id: remote_id.clone(),
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            size: blob.len() as u64,
        };
        self.insert_blob(entry, blob.to_vec());
        Ok(remote_id)
    }

    async fn download_attachment(&self, remote_id: &str) -> ProviderResult<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .lock()
            .get(remote_id)
            .map(|(_, blob)| blob.clone())
            .ok_or_else(|| ProviderError::NotFound(remote_id.to_string()))
    }

    async fn delete_attachment(&self, remote_id: &str) -> ProviderResult<()> {
        if !self.capabilities().delete {
            return Err(ProviderError::Unsupported("attachment delete"));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.blobs.lock().remove(remote_id);
        Ok(())
    }

    async fn list_attachments(&self) -> ProviderResult<Vec<RemoteAttachment>> {
        if !self.capabilities().list {
            return Err(ProviderError::Unsupported("attachment listing"));
        }
        if let Some(message) = self.failures.lock().list.clone() {
            return Err(ProviderError::Transport(message));
        }
        let mut entries = self
            .blobs
            .lock()
            .values()
            .map(|(entry, _)| entry.clone())
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| a.remote_id.cmp(&b.remote_id));
        Ok(entries)
    }
}
