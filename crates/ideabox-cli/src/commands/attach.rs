use std::path::Path;
use std::sync::Arc;

use ideabox_core::AttachmentSyncEngine;

use crate::commands::common::{normalize_idea_identifier, open_store, resolve_idea};
use crate::error::CliError;

pub async fn run_attach(
    id: &str,
    file: &Path,
    mime_type: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let normalized_id = normalize_idea_identifier(id)?;
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::InvalidFile(file.display().to_string()))?;
    let blob = tokio::fs::read(file).await?;

    let store = Arc::new(open_store(db_path).await?);
    let idea = resolve_idea(&normalized_id, &store).await?;
    let attachments = AttachmentSyncEngine::new(store);
    let attachment = attachments
        .attach_file(&idea.id, filename, mime_type, &blob)
        .await?;

    println!("{}", attachment.id);
    Ok(())
}
