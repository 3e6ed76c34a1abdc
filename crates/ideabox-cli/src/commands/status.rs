use std::path::Path;
use std::sync::Arc;

use ideabox_core::config::AppConfig;
use ideabox_core::models::AttachmentSyncStatus;
use ideabox_core::{LocalStore, SyncEngine};
use serde::Serialize;

use crate::commands::common::{format_sync_timestamp, open_store, sync_providers};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub last_sync: Option<String>,
    pub attachments: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub providers: Vec<ProviderStatus>,
    pub ideas: usize,
    pub pending_ideas: usize,
    pub unsynced_attachments: usize,
}

pub async fn run_status(as_json: bool, db_path: &Path, config: &AppConfig) -> Result<(), CliError> {
    let store: Arc<dyn LocalStore> = Arc::new(open_store(db_path).await?);
    let report = collect_status(store, config).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.providers.is_empty() {
        println!("No sync folders configured.");
    }
    for provider in &report.providers {
        let marker = if provider.attachments { " (attachments)" } else { "" };
        println!(
            "{}{marker}: last sync {}",
            provider.name,
            provider.last_sync.as_deref().unwrap_or("never")
        );
    }
    println!(
        "{} ideas, {} pending sync, {} attachments not uploaded",
        report.ideas, report.pending_ideas, report.unsynced_attachments
    );
    Ok(())
}

pub async fn collect_status(
    store: Arc<dyn LocalStore>,
    config: &AppConfig,
) -> Result<StatusReport, CliError> {
    let engine = SyncEngine::online(store.clone());
    for provider in sync_providers(config) {
        engine.register_provider(provider);
    }

    let mut providers = Vec::new();
    for name in engine.provider_names() {
        let last_sync = engine
            .last_sync(&name)
            .await?
            .map(|time| format_sync_timestamp(Some(time)));
        providers.push(ProviderStatus {
            attachments: config.attachment_provider.as_deref() == Some(name.as_str()),
            name,
            last_sync,
        });
    }

    let ideas = store.all_ideas().await?;
    let unsynced_attachments = ideas
        .iter()
        .flat_map(|idea| &idea.attachments)
        .filter(|attachment| attachment.sync_status != AttachmentSyncStatus::Synced)
        .count();

    Ok(StatusReport {
        providers,
        ideas: ideas.len(),
        pending_ideas: store.pending_ideas().await?.len(),
        unsynced_attachments,
    })
}
