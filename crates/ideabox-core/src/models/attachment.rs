//! Attachment model

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// An opaque attachment identifier.
///
/// Fresh ids are UUID v7 strings; ids arriving from a remote copy are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(String);

impl AttachmentId {
    /// Create a new unique attachment ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttachmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AttachmentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for AttachmentId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Where an attachment's blob stands relative to the active provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentSyncStatus {
    /// Only present in the local blob table.
    #[default]
    Local,
    /// Upload in flight.
    Syncing,
    /// Uploaded; `remote_id` is set.
    Synced,
    /// Last transfer failed; `sync_error` is set.
    Error,
}

impl AttachmentSyncStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Syncing => "syncing",
            Self::Synced => "synced",
            Self::Error => "error",
        }
    }
}

/// Attachment metadata embedded in an idea.
///
/// The binary payload lives in the local blob table keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: AttachmentId,
    /// Original file name.
    pub filename: String,
    /// Content MIME type.
    pub mime_type: String,
    /// Attachment size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Provider-assigned identifier, present once uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// Transfer state.
    #[serde(default)]
    pub sync_status: AttachmentSyncStatus,
    /// Failure message, present only when `sync_status` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
}

impl Attachment {
    /// Create a new, not yet uploaded attachment record.
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Result<Self> {
        let filename = filename.into().trim().to_string();
        let mime_type = mime_type.into().trim().to_string();

        if filename.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment filename cannot be empty".to_string(),
            ));
        }
        if mime_type.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment mime_type cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: AttachmentId::new(),
            filename,
            mime_type,
            size,
            remote_id: None,
            sync_status: AttachmentSyncStatus::Local,
            sync_error: None,
        })
    }

    pub fn mark_syncing(&mut self) {
        self.sync_status = AttachmentSyncStatus::Syncing;
        self.sync_error = None;
    }

    pub fn mark_synced(&mut self, remote_id: impl Into<String>) {
        self.sync_status = AttachmentSyncStatus::Synced;
        self.remote_id = Some(remote_id.into());
        self.sync_error = None;
    }

    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.sync_status = AttachmentSyncStatus::Error;
        self.sync_error = Some(message.into());
    }
}

/// One entry of a provider's blob listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttachment {
    pub id: AttachmentId,
    pub remote_id: String,
    pub filename: String,
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
}

impl RemoteAttachment {
    /// Metadata for a blob known only remotely, ready to be downloaded.
    #[must_use]
    pub fn to_attachment(&self) -> Attachment {
        Attachment {
            id: self.id.clone(),
            filename: self.filename.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size,
            remote_id: Some(self.remote_id.clone()),
            sync_status: AttachmentSyncStatus::Synced,
            sync_error: None,
        }
    }
}

/// Pick a MIME type for a captured file.
///
/// An explicit, non-generic content type wins; otherwise the extension decides.
#[must_use]
pub fn infer_mime_type(content_type: Option<&str>, file_name: &str) -> String {
    if let Some(content_type) = content_type {
        let trimmed = content_type.trim();
        if !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("application/octet-stream") {
            return trimmed.to_string();
        }
    }

    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
