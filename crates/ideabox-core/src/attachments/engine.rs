use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::models::{infer_mime_type, Attachment, AttachmentSyncStatus, IdeaId, RemoteAttachment};
use crate::providers::{AttachmentProvider, RemoteProvider};
use crate::store::LocalStore;

use super::{AttachmentError, AttachmentResult, AttachmentSyncResult};

/// Moves attachment blobs between the local store and one active provider.
pub struct AttachmentSyncEngine {
    store: Arc<dyn LocalStore>,
    provider: RwLock<Option<Arc<dyn RemoteProvider>>>,
}

impl AttachmentSyncEngine {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            provider: RwLock::new(None),
        }
    }

    /// Swap the active provider. `None` clears it.
    pub fn set_provider(&self, provider: Option<Arc<dyn RemoteProvider>>) {
        if let Some(provider) = &provider {
            tracing::debug!("Attachment provider set to {}", provider.name());
        }
        *self.provider.write() = provider;
    }

    pub fn provider(&self) -> Option<Arc<dyn RemoteProvider>> {
        self.provider.read().clone()
    }

    fn require_provider(&self) -> AttachmentResult<Arc<dyn RemoteProvider>> {
        self.provider().ok_or(AttachmentError::NoProvider)
    }

    /// Capture path: store `blob` locally and embed a new attachment in the idea.
    pub async fn attach_file(
        &self,
        idea_id: &IdeaId,
        filename: &str,
        mime_type: Option<&str>,
        blob: &[u8],
    ) -> AttachmentResult<Attachment> {
        let Some(mut idea) = self.store.get_idea(idea_id).await? else {
            return Err(crate::Error::NotFound(format!("Idea {idea_id}")).into());
        };

        let mime_type = infer_mime_type(mime_type, filename);
        let attachment = Attachment::new(filename, mime_type, blob.len() as u64)?;
        self.store.put_blob(&attachment.id, blob).await?;

        idea.upsert_attachment(attachment.clone());
        idea.touch(Utc::now());
        self.store.upsert_idea(&idea).await?;
        tracing::debug!("Attached {} to idea {idea_id}", attachment.filename);
        Ok(attachment)
    }

    /// Upload one blob and persist the resulting status.
    ///
    /// The attachment is saved as `syncing` before the provider is called,
    /// then as `synced` or `error`. Provider failures are returned after the
    /// error status is saved.
    pub async fn upload_attachment(
        &self,
        attachment: &Attachment,
        blob: &[u8],
    ) -> AttachmentResult<Attachment> {
        let provider = self.require_provider()?;
        let blobs = provider
            .attachments()
            .filter(|blobs| blobs.capabilities().upload)
            .ok_or(AttachmentError::Unsupported("upload"))?;

        let mut attachment = attachment.clone();
        attachment.mark_syncing();
        self.store.save_attachment(&attachment).await?;

        match blobs
            .upload_attachment(
                &attachment.id,
                &attachment.filename,
                blob,
                &attachment.mime_type,
            )
            .await
        {
            Ok(remote_id) => {
                attachment.mark_synced(remote_id);
                self.store.save_attachment(&attachment).await?;
                tracing::debug!(
                    "Uploaded {} to {}",
                    attachment.filename,
                    provider.name()
                );
                Ok(attachment)
            }
            Err(error) => {
                attachment.mark_error(error.to_string());
                if let Err(store_error) = self.store.save_attachment(&attachment).await {
                    tracing::warn!(
                        "Could not record upload failure for {}: {store_error}",
                        attachment.filename
                    );
                }
                Err(error.into())
            }
        }
    }

    /// Return the blob, from the local cache when present.
    ///
    /// A downloaded blob is cached under the attachment id.
    pub async fn download_attachment(&self, attachment: &Attachment) -> AttachmentResult<Vec<u8>> {
        let provider = self.require_provider()?;
        let remote_id = attachment
            .remote_id
            .as_deref()
            .ok_or(AttachmentError::NoRemoteId)?;
        let blobs = provider
            .attachments()
            .filter(|blobs| blobs.capabilities().download)
            .ok_or(AttachmentError::Unsupported("download"))?;

        if let Some(cached) = self.store.get_blob(&attachment.id).await? {
            return Ok(cached);
        }

        let blob = blobs.download_attachment(remote_id).await?;
        self.store.put_blob(&attachment.id, &blob).await?;
        tracing::debug!(
            "Downloaded {} from {}",
            attachment.filename,
            provider.name()
        );
        Ok(blob)
    }

    /// Delete the remote copy when there is one and the provider can.
    ///
    /// Missing provider, missing delete support or a missing remote id are
    /// not errors.
    pub async fn delete_remote_attachment(&self, attachment: &Attachment) -> AttachmentResult<()> {
        let Some(provider) = self.provider() else {
            return Ok(());
        };
        let Some(blobs) = provider
            .attachments()
            .filter(|blobs| blobs.capabilities().delete)
        else {
            return Ok(());
        };
        let Some(remote_id) = attachment.remote_id.as_deref() else {
            return Ok(());
        };

        blobs.delete_attachment(remote_id).await?;
        Ok(())
    }

    /// Blobs stored remotely, empty when listing is unavailable.
    pub async fn list_remote_attachments(&self) -> AttachmentResult<Vec<RemoteAttachment>> {
        let Some(provider) = self.provider() else {
            return Ok(Vec::new());
        };
        list_with(provider.attachments()).await
    }

    /// Upload `local` attachments and download missing `synced` blobs.
    ///
    /// Per-item failures are collected by filename; the batch always runs to
    /// the end.
    pub async fn sync_attachments(&self, attachments: &[Attachment]) -> AttachmentSyncResult {
        let mut result = AttachmentSyncResult::default();
        if self.provider().is_none() {
            return result;
        }

        for attachment in attachments {
            match attachment.sync_status {
                AttachmentSyncStatus::Local => match self.upload_from_store(attachment).await {
                    Ok(()) => result.uploaded += 1,
                    Err(error) => result.record_failure(&attachment.filename, &error),
                },
                AttachmentSyncStatus::Synced => match self.download_if_missing(attachment).await {
                    Ok(true) => result.downloaded += 1,
                    Ok(false) => {}
                    Err(error) => result.record_failure(&attachment.filename, &error),
                },
                AttachmentSyncStatus::Syncing | AttachmentSyncStatus::Error => {}
            }
        }

        tracing::info!(
            "Attachment sync: {} uploaded, {} downloaded, {} failed",
            result.uploaded,
            result.downloaded,
            result.errors.len()
        );
        result
    }

    /// Two-way pass against the remote listing.
    ///
    /// Uploads local attachments the remote does not know, and downloads
    /// remote attachments missing locally. A failed listing is reported as a
    /// single `"list"` failure.
    pub async fn reconcile_attachments(&self, local: &[Attachment]) -> AttachmentSyncResult {
        let mut result = AttachmentSyncResult::default();
        if self.provider().is_none() {
            return result;
        }

        let remote = match self.list_remote_attachments().await {
            Ok(remote) => remote,
            Err(error) => {
                result.record_failure("list", &error);
                return result;
            }
        };

        let remote_ids = remote.iter().map(|entry| &entry.id).collect::<HashSet<_>>();
        for attachment in local {
            if attachment.remote_id.is_some() || remote_ids.contains(&attachment.id) {
                continue;
            }
            match self.upload_from_store(attachment).await {
                Ok(()) => result.uploaded += 1,
                Err(error) => result.record_failure(&attachment.filename, &error),
            }
        }

        let local_ids = local.iter().map(|attachment| &attachment.id).collect::<HashSet<_>>();
        for entry in remote.iter().filter(|entry| !local_ids.contains(&entry.id)) {
            match self.download_attachment(&entry.to_attachment()).await {
                Ok(_) => result.downloaded += 1,
                Err(error) => result.record_failure(&entry.filename, &error),
            }
        }

        result
    }

    async fn upload_from_store(&self, attachment: &Attachment) -> AttachmentResult<()> {
        let blob = self
            .store
            .get_blob(&attachment.id)
            .await?
            .ok_or_else(|| AttachmentError::BlobNotFound(attachment.filename.clone()))?;
        self.upload_attachment(attachment, &blob).await?;
        Ok(())
    }

    async fn download_if_missing(&self, attachment: &Attachment) -> AttachmentResult<bool> {
        if self.store.get_blob(&attachment.id).await?.is_some() {
            return Ok(false);
        }
        self.download_attachment(attachment).await?;
        Ok(true)
    }
}

async fn list_with(
    blobs: Option<&dyn AttachmentProvider>,
) -> AttachmentResult<Vec<RemoteAttachment>> {
    match blobs.filter(|blobs| blobs.capabilities().list) {
        Some(blobs) => Ok(blobs.list_attachments().await?),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{AttachmentId, Idea};
    use crate::providers::{
        AttachmentCapabilities, MemoryProvider, ProviderResult, RemoteDataset,
    };
    use crate::store::MemoryStore;

    fn attachment(id: &str, filename: &str) -> Attachment {
        let mut attachment = Attachment::new(filename, "text/plain", 3).unwrap();
        attachment.id = AttachmentId::from(id);
        attachment
    }

    fn remote_entry(id: &str, filename: &str) -> RemoteAttachment {
        RemoteAttachment {
            id: AttachmentId::from(id),
            remote_id: format!("remote-{id}"),
            filename: filename.to_string(),
            mime_type: "text/plain".to_string(),
            size: 3,
        }
    }

    fn setup(
        capabilities: AttachmentCapabilities,
    ) -> (Arc<MemoryStore>, Arc<MemoryProvider>, AttachmentSyncEngine) {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(MemoryProvider::new("drive").with_attachments(capabilities));
        let engine = AttachmentSyncEngine::new(store.clone());
        engine.set_provider(Some(provider.clone()));
        (store, provider, engine)
    }

    /// Provider that records what the store held while an upload ran.
    struct SpyProvider {
        store: Arc<MemoryStore>,
        seen: Mutex<Option<AttachmentSyncStatus>>,
    }

    #[async_trait]
    impl RemoteProvider for SpyProvider {
        fn name(&self) -> &str {
            "spy"
        }

        async fn fetch(&self) -> ProviderResult<RemoteDataset> {
            Ok(RemoteDataset::empty())
        }

        async fn push(&self, _data: &RemoteDataset) -> ProviderResult<()> {
            Ok(())
        }

        fn attachments(&self) -> Option<&dyn AttachmentProvider> {
            Some(self)
        }
    }

    #[async_trait]
    impl AttachmentProvider for SpyProvider {
        async fn upload_attachment(
            &self,
            id: &AttachmentId,
            _filename: &str,
            _blob: &[u8],
            _mime_type: &str,
        ) -> ProviderResult<String> {
            let stored = self.store.get_attachment(id).await.unwrap();
            *self.seen.lock() = stored.map(|attachment| attachment.sync_status);
            Ok(format!("spy-{id}"))
        }

        async fn download_attachment(&self, _remote_id: &str) -> ProviderResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn upload_without_provider_fails_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let engine = AttachmentSyncEngine::new(store.clone());
        let file = attachment("a1", "a.txt");

        let error = engine.upload_attachment(&file, b"abc").await.unwrap_err();

        assert_eq!(error.to_string(), "No sync provider configured");
        assert!(store.get_attachment(&file.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upload_requires_upload_capability() {
        let store = Arc::new(MemoryStore::new());
        let engine = AttachmentSyncEngine::new(store.clone());
        engine.set_provider(Some(Arc::new(MemoryProvider::new("records-only"))));

        let error = engine
            .upload_attachment(&attachment("a1", "a.txt"), b"abc")
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Provider does not support attachment upload"
        );
    }

    #[tokio::test]
    async fn upload_saves_syncing_before_calling_provider() {
        let store = Arc::new(MemoryStore::new());
        let spy = Arc::new(SpyProvider {
            store: store.clone(),
            seen: Mutex::new(None),
        });
        let engine = AttachmentSyncEngine::new(store.clone());
        engine.set_provider(Some(spy.clone()));
        let file = attachment("a1", "a.txt");

        let uploaded = engine.upload_attachment(&file, b"abc").await.unwrap();

        assert_eq!(*spy.seen.lock(), Some(AttachmentSyncStatus::Syncing));
        assert_eq!(uploaded.sync_status, AttachmentSyncStatus::Synced);
        assert_eq!(uploaded.remote_id.as_deref(), Some("spy-a1"));
        assert_eq!(store.get_attachment(&file.id).await.unwrap(), Some(uploaded));
    }

    #[tokio::test]
    async fn failed_upload_is_recorded_then_returned() {
        let (store, provider, engine) = setup(AttachmentCapabilities::TRANSFER);
        provider.fail_upload_of("a.txt");
        let file = attachment("a1", "a.txt");

        let error = engine.upload_attachment(&file, b"abc").await.unwrap_err();

        assert_eq!(error.to_string(), "Transport error: upload rejected for a.txt");
        let stored = store.get_attachment(&file.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, AttachmentSyncStatus::Error);
        assert_eq!(
            stored.sync_error.as_deref(),
            Some("Transport error: upload rejected for a.txt")
        );
    }

    #[tokio::test]
    async fn download_prefers_cached_blob() {
        let (store, provider, engine) = setup(AttachmentCapabilities::TRANSFER);
        let mut file = attachment("a1", "a.txt");
        file.mark_synced("remote-a1");
        store.put_blob(&file.id, b"cached").await.unwrap();

        let blob = engine.download_attachment(&file).await.unwrap();

        assert_eq!(blob, b"cached");
        assert_eq!(provider.download_count(), 0);
    }

    #[tokio::test]
    async fn download_fetches_once_then_serves_cache() {
        let (store, provider, engine) = setup(AttachmentCapabilities::TRANSFER);
        provider.insert_blob(remote_entry("a1", "a.txt"), b"abc".to_vec());
        let mut file = attachment("a1", "a.txt");
        file.mark_synced("remote-a1");

        assert_eq!(engine.download_attachment(&file).await.unwrap(), b"abc");
        assert_eq!(engine.download_attachment(&file).await.unwrap(), b"abc");

        assert_eq!(provider.download_count(), 1);
        assert_eq!(store.get_blob(&file.id).await.unwrap(), Some(b"abc".to_vec()));
    }

    #[tokio::test]
    async fn download_requires_remote_id() {
        let (_store, _provider, engine) = setup(AttachmentCapabilities::TRANSFER);

        let error = engine
            .download_attachment(&attachment("a1", "a.txt"))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Attachment has no remote ID");
    }

    #[tokio::test]
    async fn delete_remote_is_best_effort() {
        let store = Arc::new(MemoryStore::new());
        let engine = AttachmentSyncEngine::new(store);
        let mut file = attachment("a1", "a.txt");
        file.mark_synced("remote-a1");
        engine.delete_remote_attachment(&file).await.unwrap();

        let transfer_only =
            Arc::new(MemoryProvider::new("drive").with_attachments(AttachmentCapabilities::TRANSFER));
        engine.set_provider(Some(transfer_only.clone()));
        engine.delete_remote_attachment(&file).await.unwrap();
        assert_eq!(transfer_only.delete_count(), 0);

        let full = Arc::new(MemoryProvider::new("drive").with_attachments(AttachmentCapabilities::ALL));
        full.insert_blob(remote_entry("a1", "a.txt"), b"abc".to_vec());
        engine.set_provider(Some(full.clone()));
        engine
            .delete_remote_attachment(&attachment("a2", "unsynced.txt"))
            .await
            .unwrap();
        assert_eq!(full.delete_count(), 0);

        engine.delete_remote_attachment(&file).await.unwrap();
        assert_eq!(full.delete_count(), 1);
        assert!(!full.has_blob("remote-a1"));
    }

    #[tokio::test]
    async fn batch_continues_past_a_failed_upload() {
        let (store, provider, engine) = setup(AttachmentCapabilities::TRANSFER);
        let files = vec![
            attachment("a1", "first.txt"),
            attachment("a2", "second.txt"),
            attachment("a3", "third.txt"),
        ];
        for file in &files {
            store.put_blob(&file.id, b"abc").await.unwrap();
        }
        provider.fail_upload_of("second.txt");

        let result = engine.sync_attachments(&files).await;

        assert_eq!(result.uploaded, 2);
        assert_eq!(result.downloaded, 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].target, "second.txt");
        assert_eq!(provider.upload_count(), 2);
        let third = store.get_attachment(&files[2].id).await.unwrap().unwrap();
        assert_eq!(third.sync_status, AttachmentSyncStatus::Synced);
    }

    #[tokio::test]
    async fn batch_downloads_synced_blobs_missing_locally() {
        let (store, provider, engine) = setup(AttachmentCapabilities::TRANSFER);
        provider.insert_blob(remote_entry("a1", "photo.png"), b"png".to_vec());
        let mut missing = attachment("a1", "photo.png");
        missing.mark_synced("remote-a1");
        let mut cached = attachment("a2", "cached.png");
        cached.mark_synced("remote-a2");
        store.put_blob(&cached.id, b"here").await.unwrap();
        let no_blob = attachment("a3", "lost.txt");

        let result = engine
            .sync_attachments(&[missing.clone(), cached, no_blob])
            .await;

        assert_eq!(result.downloaded, 1);
        assert_eq!(result.uploaded, 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].target, "lost.txt");
        assert_eq!(result.errors[0].message, "Local blob not found for lost.txt");
        assert_eq!(store.get_blob(&missing.id).await.unwrap(), Some(b"png".to_vec()));
    }

    #[tokio::test]
    async fn batch_without_provider_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let engine = AttachmentSyncEngine::new(store);

        let result = engine
            .sync_attachments(&[attachment("a1", "a.txt")])
            .await;

        assert_eq!(result, AttachmentSyncResult::default());
    }

    #[tokio::test]
    async fn reconcile_uploads_unknown_and_downloads_missing() {
        let (store, provider, engine) = setup(AttachmentCapabilities::ALL);
        let x = attachment("x", "x.txt");
        store.put_blob(&x.id, b"xxx").await.unwrap();
        provider.insert_blob(remote_entry("y", "y.txt"), b"yyy".to_vec());

        let result = engine.reconcile_attachments(&[x]).await;

        assert_eq!(
            result,
            AttachmentSyncResult {
                uploaded: 1,
                downloaded: 1,
                errors: Vec::new(),
            }
        );
        assert!(provider.has_blob("drive-x"));
        assert_eq!(
            store.get_blob(&AttachmentId::from("y")).await.unwrap(),
            Some(b"yyy".to_vec())
        );
    }

    #[tokio::test]
    async fn reconcile_reports_failed_listing_once() {
        let (store, provider, engine) = setup(AttachmentCapabilities::ALL);
        let x = attachment("x", "x.txt");
        store.put_blob(&x.id, b"xxx").await.unwrap();
        provider.fail_list(Some("forbidden"));

        let result = engine.reconcile_attachments(&[x]).await;

        assert_eq!(result.uploaded, 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].target, "list");
        assert_eq!(result.errors[0].message, "Transport error: forbidden");
        assert_eq!(provider.upload_count(), 0);
    }

    #[tokio::test]
    async fn listing_without_support_is_empty() {
        let (_store, provider, engine) = setup(AttachmentCapabilities::TRANSFER);
        provider.insert_blob(remote_entry("y", "y.txt"), b"yyy".to_vec());

        assert!(engine.list_remote_attachments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn attach_file_stores_blob_and_flags_idea() {
        let mut idea = Idea::note("Recipe ideas");
        idea.pending_sync = false;
        let store = Arc::new(MemoryStore::with_ideas([idea.clone()]));
        let engine = AttachmentSyncEngine::new(store.clone());

        let attached = engine
            .attach_file(&idea.id, "menu.pdf", None, b"%PDF")
            .await
            .unwrap();

        assert_eq!(attached.mime_type, "application/pdf");
        assert_eq!(attached.size, 4);
        assert_eq!(attached.sync_status, AttachmentSyncStatus::Local);
        assert_eq!(store.get_blob(&attached.id).await.unwrap(), Some(b"%PDF".to_vec()));
        let stored = store.get_idea(&idea.id).await.unwrap().unwrap();
        assert!(stored.pending_sync);
        assert_eq!(stored.attachments, vec![attached]);
    }

    #[tokio::test]
    async fn attach_file_to_missing_idea_fails() {
        let engine = AttachmentSyncEngine::new(Arc::new(MemoryStore::new()));

        let error = engine
            .attach_file(&IdeaId::from("nope"), "a.txt", None, b"abc")
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Not found: Idea nope");
    }
}
