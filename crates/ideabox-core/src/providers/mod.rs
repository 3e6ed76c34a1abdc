//! Remote provider interfaces
//!
//! A provider is one remote copy of the dataset (a Drive folder, a Dropbox
//! app folder, ...). Record sync only needs [`RemoteProvider`]; blob transfer
//! is an optional capability exposed through [`RemoteProvider::attachments`].

mod dataset;
mod folder;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AttachmentId, RemoteAttachment};

pub use dataset::{decode_dataset, encode_dataset, RemoteDataset};
pub use folder::FolderProvider;
pub use memory::MemoryProvider;

/// Errors surfaced by remote providers
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider does not support {0}")]
    Unsupported(&'static str),
    #[error("Remote object not found: {0}")]
    NotFound(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A remote copy of the whole idea dataset.
#[async_trait]
pub trait RemoteProvider: Send + Sync {
    /// Stable name, used for registration and `lastSync-<name>` metadata.
    fn name(&self) -> &str;

    /// Fetch the stored dataset.
    ///
    /// A provider that was never written to returns an empty dataset.
    async fn fetch(&self) -> ProviderResult<RemoteDataset>;

    /// Overwrite the stored dataset.
    async fn push(&self, data: &RemoteDataset) -> ProviderResult<()>;

    /// Blob transfer capability, when the backend has one.
    fn attachments(&self) -> Option<&dyn AttachmentProvider> {
        None
    }
}

/// Which blob operations an [`AttachmentProvider`] implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct AttachmentCapabilities {
    pub upload: bool,
    pub download: bool,
    pub delete: bool,
    pub list: bool,
}

impl AttachmentCapabilities {
    /// Upload and download only.
    pub const TRANSFER: Self = Self {
        upload: true,
        download: true,
        delete: false,
        list: false,
    };

    pub const ALL: Self = Self {
        upload: true,
        download: true,
        delete: true,
        list: true,
    };

    pub const NONE: Self = Self {
        upload: false,
        download: false,
        delete: false,
        list: false,
    };
}

/// Blob storage on a remote provider.
#[async_trait]
pub trait AttachmentProvider: Send + Sync {
    fn capabilities(&self) -> AttachmentCapabilities {
        AttachmentCapabilities::TRANSFER
    }

    /// Store a blob and return the provider-assigned remote id.
    async fn upload_attachment(
        &self,
        id: &AttachmentId,
        filename: &str,
        blob: &[u8],
        mime_type: &str,
    ) -> ProviderResult<String>;

    async fn download_attachment(&self, remote_id: &str) -> ProviderResult<Vec<u8>>;

    async fn delete_attachment(&self, _remote_id: &str) -> ProviderResult<()> {
        Err(ProviderError::Unsupported("attachment delete"))
    }

    async fn list_attachments(&self) -> ProviderResult<Vec<RemoteAttachment>> {
        Err(ProviderError::Unsupported("attachment listing"))
    }
}
