//! ideabox-core - offline-first sync core for Ideabox
//!
//! Ideas (media recommendations, project ideas and notes) live in a local
//! store and are reconciled with any number of remote providers using
//! last-write-wins on `updated_at`. Attachment blobs sync separately against
//! a single provider.

pub mod attachments;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod providers;
pub mod store;
pub mod sync;
pub mod util;

pub use attachments::{AttachmentError, AttachmentSyncEngine, AttachmentSyncResult};
pub use error::{Error, Result};
pub use models::{Attachment, AttachmentId, Idea, IdeaId, IdeaKind};
pub use providers::{AttachmentProvider, RemoteDataset, RemoteProvider};
pub use store::LocalStore;
pub use sync::{SyncEngine, SyncReport, SyncStatus};
