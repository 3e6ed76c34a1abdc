use std::path::Path;
use std::sync::Arc;

use ideabox_core::config::AppConfig;
use ideabox_core::{AttachmentSyncEngine, AttachmentSyncResult, LocalStore, SyncEngine, SyncReport};
use serde::Serialize;

use crate::commands::common::{attachment_provider, open_store, sync_providers};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct SyncOutput {
    pub records: SyncReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<AttachmentSyncResult>,
}

pub async fn run_sync(as_json: bool, db_path: &Path, config: &AppConfig) -> Result<(), CliError> {
    let store: Arc<dyn LocalStore> = Arc::new(open_store(db_path).await?);
    let output = sync_all(store, config).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for line in format_sync_lines(&output) {
            println!("{line}");
        }
    }

    let failed = output
        .records
        .results
        .iter()
        .filter(|result| !result.success)
        .map(|result| result.provider.as_str())
        .collect::<Vec<_>>();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::SyncFailed(failed.join(", ")))
    }
}

/// Records with every folder, then blobs with the attachment folder.
///
/// Uploaded blobs change their ideas (new remote ids), so records are synced
/// once more after any upload.
pub async fn sync_all(store: Arc<dyn LocalStore>, config: &AppConfig) -> Result<SyncOutput, CliError> {
    let providers = sync_providers(config);
    if providers.is_empty() {
        return Err(CliError::SyncNotConfigured);
    }

    let engine = SyncEngine::online(store.clone());
    for provider in providers {
        engine.register_provider(provider);
    }
    let mut records = engine.sync().await;

    let Some(provider) = attachment_provider(config) else {
        return Ok(SyncOutput {
            records,
            attachments: None,
        });
    };

    let attachments = AttachmentSyncEngine::new(store.clone());
    attachments.set_provider(Some(provider));
    let local = store
        .all_ideas()
        .await?
        .into_iter()
        .flat_map(|idea| idea.attachments)
        .collect::<Vec<_>>();
    let transferred = attachments.sync_attachments(&local).await;

    if transferred.uploaded > 0 && records.success {
        records = engine.sync().await;
    }

    Ok(SyncOutput {
        records,
        attachments: Some(transferred),
    })
}

pub fn format_sync_lines(output: &SyncOutput) -> Vec<String> {
    let mut lines = output
        .records
        .results
        .iter()
        .map(|result| match &result.error {
            None => format!("{}: synced {} ideas", result.provider, result.merged),
            Some(error) => format!("{}: failed: {error}", result.provider),
        })
        .collect::<Vec<_>>();

    if let Some(attachments) = &output.attachments {
        lines.push(format!(
            "attachments: {} uploaded, {} downloaded",
            attachments.uploaded, attachments.downloaded
        ));
        lines.extend(
            attachments
                .errors
                .iter()
                .map(|failure| format!("  {}: {}", failure.target, failure.message)),
        );
    }
    lines
}
