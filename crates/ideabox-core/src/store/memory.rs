//! In-memory local store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::error::Result;
use crate::models::{Attachment, AttachmentId, Idea, IdeaId};

use super::LocalStore;

#[derive(Default)]
struct Tables {
    /// Insertion order, so listings are stable.
    order: Vec<IdeaId>,
    ideas: HashMap<IdeaId, Idea>,
    attachments: HashMap<AttachmentId, Attachment>,
    blobs: HashMap<AttachmentId, Vec<u8>>,
    meta: HashMap<String, String>,
}

impl Tables {
    fn upsert(&mut self, idea: &Idea) {
        match self.ideas.insert(idea.id.clone(), idea.clone()) {
            Some(previous) => {
                for attachment in &previous.attachments {
                    if idea.attachment(&attachment.id).is_none() {
                        self.attachments.remove(&attachment.id);
                        self.blobs.remove(&attachment.id);
                    }
                }
            }
            None => self.order.push(idea.id.clone()),
        }
        for attachment in &idea.attachments {
            self.attachments
                .insert(attachment.id.clone(), attachment.clone());
        }
    }
}

/// Non-persistent [`LocalStore`] backed by hash maps.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store already holding `ideas`.
    #[must_use]
    pub fn with_ideas(ideas: impl IntoIterator<Item = Idea>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.lock();
            for idea in ideas {
                tables.upsert(&idea);
            }
        }
        store
    }

    /// Number of stored blobs.
    pub fn blob_count(&self) -> usize {
        self.tables.lock().blobs.len()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn all_ideas(&self) -> Result<Vec<Idea>> {
        let tables = self.tables.lock();
        Ok(tables
            .order
            .iter()
            .filter_map(|id| tables.ideas.get(id).cloned())
            .collect())
    }

    async fn get_idea(&self, id: &IdeaId) -> Result<Option<Idea>> {
        Ok(self.tables.lock().ideas.get(id).cloned())
    }

    async fn pending_ideas(&self) -> Result<Vec<Idea>> {
        let tables = self.tables.lock();
        Ok(tables
            .order
            .iter()
            .filter_map(|id| tables.ideas.get(id))
            .filter(|idea| idea.pending_sync)
            .cloned()
            .collect())
    }

    async fn upsert_idea(&self, idea: &Idea) -> Result<()> {
        self.tables.lock().upsert(idea);
        Ok(())
    }

    async fn upsert_ideas(&self, ideas: &[Idea]) -> Result<()> {
        let mut tables = self.tables.lock();
        for idea in ideas {
            tables.upsert(idea);
        }
        Ok(())
    }

    async fn delete_idea(&self, id: &IdeaId) -> Result<bool> {
        let mut tables = self.tables.lock();
        let Some(idea) = tables.ideas.remove(id) else {
            return Ok(false);
        };
        tables.order.retain(|existing| existing != id);
        for attachment in &idea.attachments {
            tables.attachments.remove(&attachment.id);
            tables.blobs.remove(&attachment.id);
        }
        Ok(true)
    }

    async fn mark_synced(&self, id: &IdeaId) -> Result<()> {
        if let Some(idea) = self.tables.lock().ideas.get_mut(id) {
            idea.pending_sync = false;
        }
        Ok(())
    }

    async fn get_blob(&self, id: &AttachmentId) -> Result<Option<Vec<u8>>> {
        Ok(self.tables.lock().blobs.get(id).cloned())
    }

    async fn put_blob(&self, id: &AttachmentId, blob: &[u8]) -> Result<()> {
        self.tables.lock().blobs.insert(id.clone(), blob.to_vec());
        Ok(())
    }

    async fn delete_blob(&self, id: &AttachmentId) -> Result<()> {
        self.tables.lock().blobs.remove(id);
        Ok(())
    }

    async fn save_attachment(&self, attachment: &Attachment) -> Result<()> {
        let mut tables = self.tables.lock();
        tables
            .attachments
            .insert(attachment.id.clone(), attachment.clone());

        let now = Utc::now();
        if let Some(idea) = tables
            .ideas
            .values_mut()
            .find(|idea| idea.attachment(&attachment.id).is_some())
        {
            idea.upsert_attachment(attachment.clone());
            idea.touch(now);
        }
        Ok(())
    }

    async fn get_attachment(&self, id: &AttachmentId) -> Result<Option<Attachment>> {
        Ok(self.tables.lock().attachments.get(id).cloned())
    }

    async fn get_meta(&self, key: &str) -> Result<Option<String>> {
        Ok(self.tables.lock().meta.get(key).cloned())
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.tables
            .lock()
            .meta
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
