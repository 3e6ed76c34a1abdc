//! Idea model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::attachment::{Attachment, AttachmentId};
use super::tag::normalize_tags;

/// An opaque idea identifier, immutable once created.
///
/// Fresh ids are UUID v7 strings (time-sortable); ids arriving from a remote
/// copy are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(String);

impl IdeaId {
    /// Create a new unique idea ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Borrow the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IdeaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdeaId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for IdeaId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for IdeaId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Kind of recommended media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    Book,
    Movie,
    Show,
    Podcast,
    Music,
    Game,
    Article,
    Other,
}

/// Consumption progress of a media recommendation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaStatus {
    #[default]
    Queued,
    InProgress,
    Finished,
    Abandoned,
}

/// Rough effort estimate for a project idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectEffort {
    Low,
    Medium,
    High,
}

/// Lifecycle of a project idea
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Idea,
    Planning,
    Active,
    Paused,
    Done,
    Abandoned,
}

/// A media recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaIdea {
    pub title: String,
    pub media_type: MediaType,
    pub recommender: Option<String>,
    pub reason: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub status: MediaStatus,
    /// 1-5 when rated
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

impl MediaIdea {
    #[must_use]
    pub fn new(title: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            title: title.into(),
            media_type,
            recommender: None,
            reason: None,
            url: None,
            status: MediaStatus::default(),
            rating: None,
            notes: None,
        }
    }
}

/// A project idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdea {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub collaborators: Vec<String>,
    /// 1-5
    pub interest: u8,
    pub effort: Option<ProjectEffort>,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl ProjectIdea {
    #[must_use]
    pub fn new(title: impl Into<String>, interest: u8) -> Self {
        Self {
            title: title.into(),
            description: None,
            resources: Vec::new(),
            deadline: None,
            collaborators: Vec::new(),
            interest,
            effort: None,
            status: ProjectStatus::default(),
        }
    }
}

/// A freeform note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteIdea {
    pub content: String,
}

/// Variant payload, discriminated by the `type` field on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IdeaKind {
    Media(MediaIdea),
    Project(ProjectIdea),
    Note(NoteIdea),
}

impl IdeaKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Media(_) => "media",
            Self::Project(_) => "project",
            Self::Note(_) => "note",
        }
    }
}

/// A captured idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Unique identifier
    pub id: IdeaId,
    /// Variant-specific fields
    #[serde(flatten)]
    pub kind: IdeaKind,
    /// Normalized tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Attachment metadata; blobs are stored separately
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    /// Sole conflict-resolution signal during sync
    pub updated_at: DateTime<Utc>,
    /// Local changes not yet confirmed on any remote copy
    #[serde(default)]
    pub pending_sync: bool,
}

impl Idea {
    /// Create a new idea stamped with the current time and flagged for sync
    #[must_use]
    pub fn new(kind: IdeaKind) -> Self {
        let now = Utc::now();
        Self {
            id: IdeaId::new(),
            kind,
            tags: Vec::new(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
            pending_sync: true,
        }
    }

    #[must_use]
    pub fn note(content: impl Into<String>) -> Self {
        Self::new(IdeaKind::Note(NoteIdea {
            content: content.into(),
        }))
    }

    #[must_use]
    pub fn media(media: MediaIdea) -> Self {
        Self::new(IdeaKind::Media(media))
    }

    #[must_use]
    pub fn project(project: ProjectIdea) -> Self {
        Self::new(IdeaKind::Project(project))
    }

    /// Replace tags with their normalized form
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Record a local modification
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.pending_sync = true;
    }

    /// Display title: the media/project title, or a note's first line
    #[must_use]
    pub fn title(&self) -> &str {
        match &self.kind {
            IdeaKind::Media(media) => &media.title,
            IdeaKind::Project(project) => &project.title,
            IdeaKind::Note(note) => note.content.lines().next().unwrap_or(""),
        }
    }

    /// Lowercased text used for local substring search
    #[must_use]
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        match &self.kind {
            IdeaKind::Media(media) => {
                parts.push(&media.title);
                parts.extend(media.recommender.as_deref());
                parts.extend(media.reason.as_deref());
                parts.extend(media.notes.as_deref());
            }
            IdeaKind::Project(project) => {
                parts.push(&project.title);
                parts.extend(project.description.as_deref());
                parts.extend(project.resources.iter().map(String::as_str));
                parts.extend(project.collaborators.iter().map(String::as_str));
            }
            IdeaKind::Note(note) => parts.push(&note.content),
        }
        parts.extend(self.tags.iter().map(String::as_str));
        parts.join("\n").to_lowercase()
    }

    /// Check the per-variant required fields
    pub fn validate(&self) -> Result<()> {
        match &self.kind {
            IdeaKind::Media(media) => {
                require_text(&media.title, "Media title")?;
                if let Some(rating) = media.rating {
                    require_range(rating, "Media rating")?;
                }
            }
            IdeaKind::Project(project) => {
                require_text(&project.title, "Project title")?;
                require_range(project.interest, "Project interest")?;
            }
            IdeaKind::Note(note) => require_text(&note.content, "Note content")?,
        }
        Ok(())
    }

    #[must_use]
    pub fn attachment(&self, id: &AttachmentId) -> Option<&Attachment> {
        self.attachments.iter().find(|attachment| &attachment.id == id)
    }

    /// Insert or replace attachment metadata by id
    pub fn upsert_attachment(&mut self, attachment: Attachment) {
        if let Some(existing) = self
            .attachments
            .iter_mut()
            .find(|existing| existing.id == attachment.id)
        {
            *existing = attachment;
        } else {
            self.attachments.push(attachment);
        }
    }
}

fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_range(value: u8, field: &str) -> Result<()> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{field} must be between 1 and 5, got {value}"
        )))
    }
}
