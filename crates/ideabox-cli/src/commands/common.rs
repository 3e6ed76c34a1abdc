use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ideabox_core::config::AppConfig;
use ideabox_core::db::LibSqlStore;
use ideabox_core::providers::{FolderProvider, RemoteProvider};
use ideabox_core::{Idea, IdeaId, LocalStore};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct IdeaListItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub relative_time: String,
    pub tags: Vec<String>,
    pub attachments: usize,
    pub pending_sync: bool,
}

pub async fn open_store(path: &Path) -> Result<LibSqlStore, CliError> {
    Ok(LibSqlStore::open(path).await?)
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    cli_db_path
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ideabox")
        .join("ideabox.db")
}

/// Registered folder providers, in configuration order.
pub fn sync_providers(config: &AppConfig) -> Vec<Arc<dyn RemoteProvider>> {
    config
        .folder_providers()
        .into_iter()
        .map(|provider| provider as Arc<dyn RemoteProvider>)
        .collect()
}

/// The sync folder that also stores attachment blobs, if configured.
pub fn attachment_provider(config: &AppConfig) -> Option<Arc<dyn RemoteProvider>> {
    let name = config.attachment_provider.as_deref()?;
    config
        .sync_folders
        .iter()
        .find(|folder| folder.name == name)
        .map(|folder| {
            Arc::new(FolderProvider::new(&folder.name, &folder.path)) as Arc<dyn RemoteProvider>
        })
}

pub async fn resolve_idea(query: &str, store: &LibSqlStore) -> Result<Idea, CliError> {
    if let Some(idea) = store.get_idea(&IdeaId::from(query)).await? {
        return Ok(idea);
    }

    let matching_ids = store.find_by_prefix(query, 3).await?;
    match matching_ids.as_slice() {
        [] => Err(CliError::IdeaNotFound(query.to_string())),
        [id] => store
            .get_idea(id)
            .await?
            .ok_or_else(|| CliError::IdeaNotFound(query.to_string())),
        _ => {
            let options = matching_ids
                .iter()
                .map(|id| short_id(id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousIdeaId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &IdeaId) -> String {
    id.as_str().chars().take(13).collect()
}

pub fn format_idea_lines(ideas: &[Idea]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    ideas
        .iter()
        .map(|idea| {
            let short_id = short_id(&idea.id);
            let kind = idea.kind.as_str();
            let preview = idea_preview(idea, 40);
            let relative_time = format_relative_time(idea.updated_at.timestamp_millis(), now_ms);
            let tags = render_tags(idea);

            if tags.is_empty() {
                format!("{short_id:<13}  {kind:<7}  {preview:<40}  {relative_time}")
            } else {
                format!("{short_id:<13}  {kind:<7}  {preview:<40}  {relative_time:<10}  {tags}")
            }
        })
        .collect()
}

pub fn idea_to_list_item(idea: &Idea) -> IdeaListItem {
    let now_ms = Utc::now().timestamp_millis();
    IdeaListItem {
        id: idea.id.to_string(),
        kind: idea.kind.as_str().to_string(),
        title: idea.title().to_string(),
        created_at: idea.created_at.to_rfc3339(),
        updated_at: idea.updated_at.to_rfc3339(),
        relative_time: format_relative_time(idea.updated_at.timestamp_millis(), now_ms),
        tags: idea.tags.clone(),
        attachments: idea.attachments.len(),
        pending_sync: idea.pending_sync,
    }
}

pub fn idea_preview(idea: &Idea, max_chars: usize) -> String {
    let collapsed = idea.title().split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn render_tags(idea: &Idea) -> String {
    idea.tags
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn format_sync_timestamp(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(
        || "never".to_string(),
        |time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_idea_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyIdeaId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}
