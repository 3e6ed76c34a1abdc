//! Local store abstraction
//!
//! The local store owns idea records, the tag index, attachment blobs and
//! sync metadata. Both sync engines talk to it only through [`LocalStore`].

mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Attachment, AttachmentId, Idea, IdeaId};

pub use memory::MemoryStore;

/// Metadata key holding the last successful sync time for a provider.
#[must_use]
pub fn last_sync_key(provider_name: &str) -> String {
    format!("lastSync-{provider_name}")
}

/// Persistent storage used by the sync engines.
///
/// Every operation is asynchronous and may fail with a storage-layer error.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// All stored ideas.
    async fn all_ideas(&self) -> Result<Vec<Idea>>;

    async fn get_idea(&self, id: &IdeaId) -> Result<Option<Idea>>;

    /// Ideas whose local changes are not yet confirmed remotely.
    async fn pending_ideas(&self) -> Result<Vec<Idea>>;

    /// Insert or replace one idea, refreshing its tag index.
    async fn upsert_idea(&self, idea: &Idea) -> Result<()>;

    /// Insert or replace many ideas.
    async fn upsert_ideas(&self, ideas: &[Idea]) -> Result<()>;

    /// Delete an idea together with its attachment metadata and blobs.
    ///
    /// Returns `false` when no idea had that id.
    async fn delete_idea(&self, id: &IdeaId) -> Result<bool>;

    /// Clear the pending flag without touching `updated_at`.
    async fn mark_synced(&self, id: &IdeaId) -> Result<()>;

    async fn get_blob(&self, id: &AttachmentId) -> Result<Option<Vec<u8>>>;

    async fn put_blob(&self, id: &AttachmentId, blob: &[u8]) -> Result<()>;

    async fn delete_blob(&self, id: &AttachmentId) -> Result<()>;

    /// Persist attachment metadata.
    ///
    /// When an idea embeds the attachment, the embedded copy is replaced, the
    /// idea's `updated_at` is bumped and it is flagged for sync.
    async fn save_attachment(&self, attachment: &Attachment) -> Result<()>;

    async fn get_attachment(&self, id: &AttachmentId) -> Result<Option<Attachment>>;

    async fn get_meta(&self, key: &str) -> Result<Option<String>>;

    async fn set_meta(&self, key: &str, value: &str) -> Result<()>;
}
