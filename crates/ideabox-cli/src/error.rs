use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] ideabox_core::Error),
    #[error(transparent)]
    Attachment(#[from] ideabox_core::AttachmentError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Idea ID cannot be empty")]
    EmptyIdeaId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Idea not found for id/prefix: {0}")]
    IdeaNotFound(String),
    #[error("{0}")]
    AmbiguousIdeaId(String),
    #[error("Not a readable file: {0}")]
    InvalidFile(String),
    #[error(
        "Sync is not configured. Set IDEABOX_SYNC_FOLDERS (name=path,...) to enable `ideabox sync`."
    )]
    SyncNotConfigured,
    #[error("Sync failed for: {0}")]
    SyncFailed(String),
}
