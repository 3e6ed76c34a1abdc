//! Runtime configuration from environment variables.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::FolderProvider;
use crate::util::normalize_text_option;

pub const ENV_DB_PATH: &str = "IDEABOX_DB_PATH";
pub const ENV_SYNC_FOLDERS: &str = "IDEABOX_SYNC_FOLDERS";
pub const ENV_ATTACHMENT_PROVIDER: &str = "IDEABOX_ATTACHMENT_PROVIDER";

/// A folder-backed sync target, `name=path` in `IDEABOX_SYNC_FOLDERS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFolder {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Local database path. Callers pick a default when unset.
    pub db_path: Option<PathBuf>,
    pub sync_folders: Vec<SyncFolder>,
    /// Name of the sync folder that also stores attachment blobs.
    pub attachment_provider: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = normalize_text_option(lookup(ENV_DB_PATH)).map(PathBuf::from);
        let sync_folders = match normalize_text_option(lookup(ENV_SYNC_FOLDERS)) {
            Some(raw) => parse_sync_folders(&raw)?,
            None => Vec::new(),
        };

        let attachment_provider = normalize_text_option(lookup(ENV_ATTACHMENT_PROVIDER));
        if let Some(name) = &attachment_provider {
            if !sync_folders.iter().any(|folder| &folder.name == name) {
                return Err(Error::InvalidInput(format!(
                    "{ENV_ATTACHMENT_PROVIDER} names unknown sync folder '{name}'"
                )));
            }
        }

        Ok(Self {
            db_path,
            sync_folders,
            attachment_provider,
        })
    }

    /// One provider per configured sync folder, in configuration order.
    pub fn folder_providers(&self) -> Vec<Arc<FolderProvider>> {
        self.sync_folders
            .iter()
            .map(|folder| Arc::new(FolderProvider::new(&folder.name, &folder.path)))
            .collect()
    }
}

fn parse_sync_folders(raw: &str) -> Result<Vec<SyncFolder>> {
    let mut folders: Vec<SyncFolder> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let Some((name, path)) = entry.split_once('=') else {
            return Err(Error::InvalidInput(format!(
                "{ENV_SYNC_FOLDERS} entry '{entry}' must look like name=path"
            )));
        };
        let (name, path) = (name.trim(), path.trim());
        if name.is_empty() || path.is_empty() {
            return Err(Error::InvalidInput(format!(
                "{ENV_SYNC_FOLDERS} entry '{entry}' needs both a name and a path"
            )));
        }
        if folders.iter().any(|folder| folder.name == name) {
            return Err(Error::InvalidInput(format!(
                "{ENV_SYNC_FOLDERS} lists '{name}' more than once"
            )));
        }
        folders.push(SyncFolder {
            name: name.to_string(),
            path: PathBuf::from(path),
        });
    }
    Ok(folders)
}
