//! Attachment blob synchronization
//!
//! Unlike record sync, attachments go to a single active provider and each
//! attachment tracks its own [`AttachmentSyncStatus`](crate::models::AttachmentSyncStatus).

mod engine;

use serde::Serialize;
use thiserror::Error;

use crate::providers::ProviderError;
use crate::util::compact_text;

pub use engine::AttachmentSyncEngine;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("No sync provider configured")]
    NoProvider,
    #[error("Provider does not support attachment {0}")]
    Unsupported(&'static str),
    #[error("Attachment has no remote ID")]
    NoRemoteId,
    #[error("Local blob not found for {0}")]
    BlobNotFound(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] crate::Error),
}

pub type AttachmentResult<T> = Result<T, AttachmentError>;

/// One attachment that could not be transferred during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentSyncFailure {
    /// Attachment filename, or `"list"` when the remote listing failed.
    pub target: String,
    pub message: String,
}

/// Outcome of a batch attachment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentSyncResult {
    pub uploaded: usize,
    pub downloaded: usize,
    pub errors: Vec<AttachmentSyncFailure>,
}

impl AttachmentSyncResult {
    fn record_failure(&mut self, target: impl Into<String>, error: &AttachmentError) {
        let target = target.into();
        tracing::warn!("Attachment sync failed for {target}: {error}");
        self.errors.push(AttachmentSyncFailure {
            target,
            message: compact_text(&error.to_string()),
        });
    }
}
