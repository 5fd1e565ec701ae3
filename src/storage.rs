use crate::errors::StoreError;
use serde_json::Value;
use std::{collections::BTreeMap, path::Path};
use tokio::fs;
use tracing::error;

pub const PROGRESS_KEY: &str = "wird_progress";
pub const MARKER_KEY: &str = "wird_logical_date_marker";
pub const REPETITION_KEY: &str = "wird_repetition_count";

/// Raw key-value document as it sits on disk.
pub type StoredDocument = BTreeMap<String, Value>;

pub async fn load_document(path: &Path) -> StoredDocument {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(err) => {
                error!("failed to parse state file {}: {err}", path.display());
                StoredDocument::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoredDocument::default(),
        Err(err) => {
            error!("failed to read state file {}: {err}", path.display());
            StoredDocument::default()
        }
    }
}

/// Writes the whole document to a sibling file and renames it into place,
/// so every key in it changes together or not at all.
pub async fn persist_document(path: &Path, document: &StoredDocument) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(document)?;
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}
