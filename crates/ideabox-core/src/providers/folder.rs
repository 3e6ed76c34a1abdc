//! Directory-backed remote provider
//!
//! Treats a directory as the remote copy. Pointing it at a folder kept in sync
//! by a desktop cloud client (Drive, Dropbox) gives multi-device sync without
//! talking to the cloud API directly.
//!
//! Layout:
//! - `ideas.json`: the dataset
//! - `attachments/<remote id>`: blobs
//! - `attachments/index.json`: blob listing

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{AttachmentId, RemoteAttachment};
use crate::util::{sanitize_file_name, sanitize_token};

use super::{
    decode_dataset, encode_dataset, AttachmentCapabilities, AttachmentProvider, ProviderError,
    ProviderResult, RemoteDataset, RemoteProvider,
};

const DATASET_FILE: &str = "ideas.json";
const ATTACHMENT_DIR: &str = "attachments";
const INDEX_FILE: &str = "index.json";

/// [`RemoteProvider`] storing its data under a local directory.
pub struct FolderProvider {
    name: String,
    root: PathBuf,
    /// Serializes read-modify-write cycles on the blob index.
    index_lock: Mutex<()>,
}

impl FolderProvider {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            index_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_path(&self) -> PathBuf {
        self.root.join(DATASET_FILE)
    }

    fn attachment_dir(&self) -> PathBuf {
        self.root.join(ATTACHMENT_DIR)
    }

    fn index_path(&self) -> PathBuf {
        self.attachment_dir().join(INDEX_FILE)
    }

    fn blob_path(&self, remote_id: &str) -> ProviderResult<PathBuf> {
        let valid = !remote_id.is_empty()
            && remote_id != INDEX_FILE
            && remote_id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_'))
            && !remote_id.starts_with('.');
        if !valid {
            return Err(ProviderError::NotFound(remote_id.to_string()));
        }
        Ok(self.attachment_dir().join(remote_id))
    }

    async fn read_index(&self) -> ProviderResult<Vec<RemoteAttachment>> {
        match read_optional(&self.index_path()).await? {
            Some(bytes) if !bytes.is_empty() => Ok(serde_json::from_slice(&bytes)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn write_index(&self, entries: &[RemoteAttachment]) -> ProviderResult<()> {
        write_atomic(&self.index_path(), &serde_json::to_vec_pretty(entries)?).await
    }
}

#[async_trait]
impl RemoteProvider for FolderProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> ProviderResult<RemoteDataset> {
        match read_optional(&self.dataset_path()).await? {
            Some(bytes) => decode_dataset(&bytes),
            None => {
                tracing::debug!(
                    "No dataset at {}; treating as empty",
                    self.dataset_path().display()
                );
                Ok(RemoteDataset::empty())
            }
        }
    }

    async fn push(&self, data: &RemoteDataset) -> ProviderResult<()> {
        write_atomic(&self.dataset_path(), &encode_dataset(data)?).await?;
        tracing::debug!(
            "Wrote {} ideas to {}",
            data.ideas.len(),
            self.dataset_path().display()
        );
        Ok(())
    }

    fn attachments(&self) -> Option<&dyn AttachmentProvider> {
        Some(self)
    }
}

#[async_trait]
impl AttachmentProvider for FolderProvider {
    fn capabilities(&self) -> AttachmentCapabilities {
        AttachmentCapabilities::ALL
    }

    async fn upload_attachment(
        &self,
        id: &AttachmentId,
        filename: &str,
        blob: &[u8],
        mime_type: &str,
    ) -> ProviderResult<String> {
        let id_token = sanitize_token(id.as_str());
        let id_token = if id_token.is_empty() {
            "blob".to_string()
        } else {
            id_token
        };
        let remote_id = format!("{id_token}-{}", sanitize_file_name(filename));
        write_atomic(&self.blob_path(&remote_id)?, blob).await?;

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        index.retain(|entry| &entry.id != id);
        index.push(RemoteAttachment {
            id: id.clone(),
            remote_id: remote_id.clone(),
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            size: blob.len() as u64,
        });
        self.write_index(&index).await?;

        Ok(remote_id)
    }

    async fn download_attachment(&self, remote_id: &str) -> ProviderResult<Vec<u8>> {
        let path = self.blob_path(remote_id)?;
        read_optional(&path)
            .await?
            .ok_or_else(|| ProviderError::NotFound(remote_id.to_string()))
    }

    async fn delete_attachment(&self, remote_id: &str) -> ProviderResult<()> {
        let path = self.blob_path(remote_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        }

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        let before = index.len();
        index.retain(|entry| entry.remote_id != remote_id);
        if index.len() != before {
            self.write_index(&index).await?;
        }
        Ok(())
    }

    async fn list_attachments(&self) -> ProviderResult<Vec<RemoteAttachment>> {
        self.read_index().await
    }
}

async fn read_optional(path: &Path) -> ProviderResult<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Write through a sibling temp file so readers never see a partial file
async fn write_atomic(path: &Path, bytes: &[u8]) -> ProviderResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Idea;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn fetch_from_empty_folder_is_empty() {
        let tmp = tempdir().unwrap();
        let provider = FolderProvider::new("drive", tmp.path().join("never-created"));

        let dataset = provider.fetch().await.unwrap();
        assert_eq!(dataset, RemoteDataset::empty());
    }

    #[tokio::test]
    async fn push_then_fetch() {
        let tmp = tempdir().unwrap();
        let provider = FolderProvider::new("drive", tmp.path());
        let dataset = RemoteDataset::new(vec![Idea::note("synced")], Utc::now());

        provider.push(&dataset).await.unwrap();
        assert!(tmp.path().join(DATASET_FILE).exists());
        assert_eq!(provider.fetch().await.unwrap(), dataset);
    }

    #[tokio::test]
    async fn attachment_lifecycle() {
        let tmp = tempdir().unwrap();
        let provider = FolderProvider::new("dropbox", tmp.path());
        let blobs = provider.attachments().unwrap();
        let id = AttachmentId::from("0190aaaa-bbbb");

        let remote_id = blobs
            .upload_attachment(&id, "Cover Art.PNG", b"png-bytes", "image/png")
            .await
            .unwrap();
        assert_eq!(remote_id, "0190aaaa-bbbb-cover-art.png");

        let listed = blobs.list_attachments().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, "Cover Art.PNG");
        assert_eq!(listed[0].size, 9);

        assert_eq!(
            blobs.download_attachment(&remote_id).await.unwrap(),
            b"png-bytes"
        );

        blobs.delete_attachment(&remote_id).await.unwrap();
        assert!(blobs.list_attachments().await.unwrap().is_empty());
        assert!(matches!(
            blobs.download_attachment(&remote_id).await,
            Err(ProviderError::NotFound(_))
        ));
        // Deleting twice is fine
        blobs.delete_attachment(&remote_id).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_path_like_remote_ids() {
        let tmp = tempdir().unwrap();
        let provider = FolderProvider::new("drive", tmp.path());
        let blobs = provider.attachments().unwrap();

        for remote_id in ["../ideas.json", "", "index.json", ".hidden"] {
            assert!(matches!(
                blobs.download_attachment(remote_id).await,
                Err(ProviderError::NotFound(_))
            ));
        }
    }
}
