//! Database migrations

use crate::error::Result;
use libsql::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    if version < 1 {
        migrate_v1(conn).await?;
    }
    if version < 2 {
        migrate_v2(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
async fn get_version(conn: &Connection) -> Result<i32> {
    // Check if schema_version table exists
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

/// Run a migration's statements inside one transaction
async fn apply(conn: &Connection, version: i32, statements: &[&str]) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn
        .execute("INSERT INTO schema_version (version) VALUES (?)", [version])
        .await
    {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated database to version {version}");
    Ok(())
}

/// Migration to version 1: ideas, tag index and sync metadata
async fn migrate_v1(conn: &Connection) -> Result<()> {
    apply(
        conn,
        1,
        &[
            // Schema version tracking
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            // Full records are kept as JSON; the other columns exist for querying
            "CREATE TABLE IF NOT EXISTS ideas (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                search_text TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                pending_sync INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE INDEX IF NOT EXISTS idx_ideas_updated ON ideas(updated_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_ideas_pending ON ideas(pending_sync)",
            "CREATE TABLE IF NOT EXISTS idea_tags (
                idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
                tag TEXT NOT NULL COLLATE NOCASE,
                PRIMARY KEY (idea_id, tag)
            )",
            "CREATE INDEX IF NOT EXISTS idx_idea_tags_tag ON idea_tags(tag)",
            "CREATE TABLE IF NOT EXISTS sync_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        ],
    )
    .await
}

/// Migration to version 2: attachment metadata and blobs
async fn migrate_v2(conn: &Connection) -> Result<()> {
    apply(
        conn,
        CURRENT_VERSION,
        &[
            // idea_id is '' for attachments not embedded in any idea
            "CREATE TABLE IF NOT EXISTS attachments (
                id TEXT PRIMARY KEY,
                idea_id TEXT NOT NULL DEFAULT '',
                body TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_attachments_idea_id ON attachments(idea_id)",
            "CREATE TABLE IF NOT EXISTS blobs (
                id TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                size INTEGER NOT NULL
            )",
        ],
    )
    .await
}
