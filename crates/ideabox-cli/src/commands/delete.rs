use std::path::Path;
use std::sync::Arc;

use ideabox_core::config::AppConfig;
use ideabox_core::{AttachmentSyncEngine, LocalStore};

use crate::commands::common::{
    attachment_provider, normalize_idea_identifier, open_store, resolve_idea,
};
use crate::error::CliError;

pub async fn run_delete(id: &str, db_path: &Path, config: &AppConfig) -> Result<(), CliError> {
    let normalized_id = normalize_idea_identifier(id)?;
    let store = Arc::new(open_store(db_path).await?);
    let idea = resolve_idea(&normalized_id, &store).await?;

    // Remote blob cleanup is best effort; the idea is deleted regardless.
    if !idea.attachments.is_empty() {
        let attachments = AttachmentSyncEngine::new(store.clone());
        attachments.set_provider(attachment_provider(config));
        for attachment in &idea.attachments {
            if let Err(error) = attachments.delete_remote_attachment(attachment).await {
                tracing::warn!(
                    "Could not delete remote copy of {}: {error}",
                    attachment.filename
                );
            }
        }
    }

    store.delete_idea(&idea.id).await?;
    println!("{}", idea.id);
    Ok(())
}
