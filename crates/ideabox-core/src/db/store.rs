//! libSQL implementation of `LocalStore`

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT/OFFSET

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::params::IntoParams;
use libsql::{params, Connection};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{Attachment, AttachmentId, Idea, IdeaId};
use crate::store::LocalStore;

use super::Database;

const IDEA_COLUMNS: &str = "body, pending_sync";

/// Persistent [`LocalStore`] on a local libSQL database
pub struct LibSqlStore {
    db: Mutex<Database>,
}

impl LibSqlStore {
    /// Open (and migrate) the database file at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?))
    }

    /// Open an in-memory store (useful for testing)
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// List ideas, most recently updated first
    pub async fn list_ideas(&self, limit: usize, offset: usize) -> Result<Vec<Idea>> {
        let db = self.db.lock().await;
        query_ideas(
            db.connection(),
            "SELECT body, pending_sync FROM ideas
             ORDER BY updated_at DESC
             LIMIT ? OFFSET ?",
            params![limit as i64, offset as i64],
        )
        .await
    }

    /// List ideas carrying a tag, most recently updated first
    pub async fn list_by_tag(&self, tag: &str, limit: usize) -> Result<Vec<Idea>> {
        let Some(tag) = crate::models::normalize_tag(tag) else {
            return Ok(Vec::new());
        };

        let db = self.db.lock().await;
        query_ideas(
            db.connection(),
            "SELECT i.body, i.pending_sync
             FROM ideas i
             JOIN idea_tags t ON i.id = t.idea_id
             WHERE t.tag = ? COLLATE NOCASE
             ORDER BY i.updated_at DESC
             LIMIT ?",
            params![tag, limit as i64],
        )
        .await
    }

    /// Case-insensitive substring search over titles, bodies and tags
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Idea>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_ideas(limit, 0).await;
        }

        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let db = self.db.lock().await;
        query_ideas(
            db.connection(),
            "SELECT body, pending_sync FROM ideas
             WHERE search_text LIKE ? ESCAPE '\\'
             ORDER BY updated_at DESC
             LIMIT ?",
            params![pattern, limit as i64],
        )
        .await
    }

    /// Get all tags with idea counts
    pub async fn list_tags(&self) -> Result<Vec<(String, usize)>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT tag, COUNT(idea_id) AS count
                 FROM idea_tags
                 GROUP BY tag
                 ORDER BY count DESC, tag ASC",
                (),
            )
            .await?;

        let mut tags = Vec::new();
        while let Some(row) = rows.next().await? {
            let count = usize::try_from(row.get::<i64>(1)?).unwrap_or_default();
            tags.push((row.get::<String>(0)?, count));
        }
        Ok(tags)
    }

    /// Ids starting with `prefix`, for short-id lookups
    pub async fn find_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<IdeaId>> {
        let pattern = format!("{}%", escape_like(prefix.trim()));
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT id FROM ideas WHERE id LIKE ? ESCAPE '\\' ORDER BY id LIMIT ?",
                params![pattern, limit as i64],
            )
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(IdeaId::from(row.get::<String>(0)?));
        }
        Ok(ids)
    }
}

#[async_trait]
impl LocalStore for LibSqlStore {
    async fn all_ideas(&self) -> Result<Vec<Idea>> {
        let db = self.db.lock().await;
        query_ideas(
            db.connection(),
            &format!("SELECT {IDEA_COLUMNS} FROM ideas ORDER BY rowid"),
            (),
        )
        .await
    }

    async fn get_idea(&self, id: &IdeaId) -> Result<Option<Idea>> {
        let db = self.db.lock().await;
        fetch_idea(db.connection(), id).await
    }

    async fn pending_ideas(&self) -> Result<Vec<Idea>> {
        let db = self.db.lock().await;
        query_ideas(
            db.connection(),
            &format!("SELECT {IDEA_COLUMNS} FROM ideas WHERE pending_sync = 1 ORDER BY rowid"),
            (),
        )
        .await
    }

    async fn upsert_idea(&self, idea: &Idea) -> Result<()> {
        let db = self.db.lock().await;
        write_ideas(db.connection(), std::slice::from_ref(idea)).await
    }

    async fn upsert_ideas(&self, ideas: &[Idea]) -> Result<()> {
        if ideas.is_empty() {
            return Ok(());
        }
        let db = self.db.lock().await;
        write_ideas(db.connection(), ideas).await
    }

    async fn delete_idea(&self, id: &IdeaId) -> Result<bool> {
        let db = self.db.lock().await;
        let conn = db.connection();

        if fetch_idea(conn, id).await?.is_none() {
            return Ok(false);
        }

        let statements = [
            "DELETE FROM blobs WHERE id IN (SELECT id FROM attachments WHERE idea_id = ?)",
            "DELETE FROM attachments WHERE idea_id = ?",
            "DELETE FROM idea_tags WHERE idea_id = ?",
            "DELETE FROM ideas WHERE id = ?",
        ];

        conn.execute("BEGIN TRANSACTION", ()).await?;
        for stmt in statements {
            if let Err(e) = conn.execute(stmt, [id.as_str()]).await {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        }
        commit(conn).await?;

        tracing::debug!("Deleted idea {id} with its attachments");
        Ok(true)
    }

    async fn mark_synced(&self, id: &IdeaId) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute(
                "UPDATE ideas SET pending_sync = 0 WHERE id = ?",
                [id.as_str()],
            )
            .await?;
        Ok(())
    }

    async fn get_blob(&self, id: &AttachmentId) -> Result<Option<Vec<u8>>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query("SELECT data FROM blobs WHERE id = ?", [id.as_str()])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<Vec<u8>>(0)?)),
            None => Ok(None),
        }
    }

    async fn put_blob(&self, id: &AttachmentId, blob: &[u8]) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute(
                "INSERT INTO blobs (id, data, size) VALUES (?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data, size = excluded.size",
                params![id.as_str(), blob.to_vec(), blob.len() as i64],
            )
            .await?;
        Ok(())
    }

    async fn delete_blob(&self, id: &AttachmentId) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM blobs WHERE id = ?", [id.as_str()])
            .await?;
        Ok(())
    }

    async fn save_attachment(&self, attachment: &Attachment) -> Result<()> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let owner = {
            let mut rows = conn
                .query(
                    "SELECT idea_id FROM attachments WHERE id = ?",
                    [attachment.id.as_str()],
                )
                .await?;
            match rows.next().await? {
                Some(row) => row.get::<String>(0)?,
                None => String::new(),
            }
        };

        if !owner.is_empty() {
            if let Some(mut idea) = fetch_idea(conn, &IdeaId::from(owner)).await? {
                if idea.attachment(&attachment.id).is_some() {
                    idea.upsert_attachment(attachment.clone());
                    idea.touch(Utc::now());
                    return write_ideas(conn, std::slice::from_ref(&idea)).await;
                }
            }
        }

        conn.execute(
            "INSERT INTO attachments (id, idea_id, body) VALUES (?, '', ?)
             ON CONFLICT(id) DO UPDATE SET body = excluded.body",
            params![attachment.id.as_str(), serde_json::to_string(attachment)?],
        )
        .await?;
        Ok(())
    }

    async fn get_attachment(&self, id: &AttachmentId) -> Result<Option<Attachment>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query("SELECT body FROM attachments WHERE id = ?", [id.as_str()])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(serde_json::from_str(&row.get::<String>(0)?)?)),
            None => Ok(None),
        }
    }

    async fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query("SELECT value FROM sync_meta WHERE key = ?", [key])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute(
                "INSERT INTO sync_meta (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .await?;
        Ok(())
    }
}

async fn fetch_idea(conn: &Connection, id: &IdeaId) -> Result<Option<Idea>> {
    let mut ideas = query_ideas(
        conn,
        &format!("SELECT {IDEA_COLUMNS} FROM ideas WHERE id = ?"),
        [id.as_str()],
    )
    .await?;
    Ok(ideas.pop())
}

/// Run a query selecting `body, pending_sync` and decode each row
async fn query_ideas(conn: &Connection, sql: &str, params: impl IntoParams) -> Result<Vec<Idea>> {
    let mut rows = conn.query(sql, params).await?;
    let mut ideas = Vec::new();
    while let Some(row) = rows.next().await? {
        let body = row.get::<String>(0)?;
        let pending = row.get::<i64>(1)?;
        ideas.push(parse_idea(&body, pending)?);
    }
    Ok(ideas)
}

/// The `pending_sync` column is authoritative over the flag stored in the body
fn parse_idea(body: &str, pending_sync: i64) -> Result<Idea> {
    let mut idea: Idea = serde_json::from_str(body)
        .map_err(|error| Error::Database(format!("corrupt idea row: {error}")))?;
    idea.pending_sync = pending_sync != 0;
    Ok(idea)
}

async fn write_ideas(conn: &Connection, ideas: &[Idea]) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;
    for idea in ideas {
        if let Err(error) = write_idea(conn, idea).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(error);
        }
    }
    commit(conn).await
}

async fn write_idea(conn: &Connection, idea: &Idea) -> Result<()> {
    let body = serde_json::to_string(idea)?;
    conn.execute(
        "INSERT INTO ideas (id, kind, title, search_text, body, created_at, updated_at, pending_sync)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             kind = excluded.kind,
             title = excluded.title,
             search_text = excluded.search_text,
             body = excluded.body,
             created_at = excluded.created_at,
             updated_at = excluded.updated_at,
             pending_sync = excluded.pending_sync",
        params![
            idea.id.as_str(),
            idea.kind.as_str(),
            idea.title().to_string(),
            idea.search_text(),
            body,
            timestamp_text(idea.created_at),
            timestamp_text(idea.updated_at),
            i32::from(idea.pending_sync)
        ],
    )
    .await?;

    // Replace tag links
    conn.execute("DELETE FROM idea_tags WHERE idea_id = ?", [idea.id.as_str()])
        .await?;
    for tag in &idea.tags {
        conn.execute(
            "INSERT OR IGNORE INTO idea_tags (idea_id, tag) VALUES (?, ?)",
            [idea.id.as_str(), tag.as_str()],
        )
        .await?;
    }

    // Attachments the idea no longer lists go away with their blobs
    let mut dropped = Vec::new();
    {
        let mut rows = conn
            .query(
                "SELECT id FROM attachments WHERE idea_id = ?",
                [idea.id.as_str()],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let id = AttachmentId::from(row.get::<String>(0)?);
            if idea.attachment(&id).is_none() {
                dropped.push(id);
            }
        }
    }
    for id in &dropped {
        conn.execute("DELETE FROM blobs WHERE id = ?", [id.as_str()])
            .await?;
        conn.execute("DELETE FROM attachments WHERE id = ?", [id.as_str()])
            .await?;
    }
    if !dropped.is_empty() {
        tracing::debug!("Dropped {} unlinked attachments of {}", dropped.len(), idea.id);
    }

    for attachment in &idea.attachments {
        conn.execute(
            "INSERT INTO attachments (id, idea_id, body) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET idea_id = excluded.idea_id, body = excluded.body",
            params![
                attachment.id.as_str(),
                idea.id.as_str(),
                serde_json::to_string(attachment)?
            ],
        )
        .await?;
    }

    Ok(())
}

async fn commit(conn: &Connection) -> Result<()> {
    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }
    Ok(())
}

/// Fixed-width UTC text so lexical order matches time order
fn timestamp_text(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
