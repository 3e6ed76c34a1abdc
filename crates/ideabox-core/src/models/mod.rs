//! Data models for Ideabox

mod attachment;
mod idea;
mod tag;

pub use attachment::{
    infer_mime_type, Attachment, AttachmentId, AttachmentSyncStatus, RemoteAttachment,
};
pub use idea::{
    Idea, IdeaId, IdeaKind, MediaIdea, MediaStatus, MediaType, NoteIdea, ProjectEffort,
    ProjectIdea, ProjectStatus,
};
pub use tag::{extract_tags, normalize_tag, normalize_tags};
