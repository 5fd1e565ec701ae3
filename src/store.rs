use crate::errors::StoreError;
use crate::logical_date::{date_key, parse_date_key};
use crate::plan::{PlanConfiguration, DEFAULT_PLAN_LENGTH_DAYS, MAX_REPETITIONS};
use crate::progress::ProgressRecord;
use crate::storage::{
    load_document, persist_document, StoredDocument, MARKER_KEY, PROGRESS_KEY, REPETITION_KEY,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, warn};

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirdState {
    pub progress: ProgressRecord,
    pub marker: Option<NaiveDate>,
    pub repetition_count: u32,
}

impl Default for WirdState {
    fn default() -> Self {
        Self {
            progress: ProgressRecord::default(),
            marker: None,
            repetition_count: 1,
        }
    }
}

impl WirdState {
    pub fn plan(&self) -> PlanConfiguration {
        PlanConfiguration::new(self.repetition_count)
    }

    /// Builds state from a raw document, repairing whatever is broken.
    pub fn from_document(document: &StoredDocument) -> Self {
        let repetition_count = match document.get(REPETITION_KEY) {
            None => 1,
            Some(value) => match value.as_u64() {
                Some(count) if (1..=u64::from(MAX_REPETITIONS)).contains(&count) => count as u32,
                _ => {
                    warn!("ignoring invalid repetition count {value}");
                    1
                }
            },
        };

        let progress = match document.get(PROGRESS_KEY) {
            None => ProgressRecord::default(),
            Some(value) => {
                match ProgressRecord::from_stored(value.clone(), DEFAULT_PLAN_LENGTH_DAYS) {
                    Ok(progress) => progress,
                    Err(err) => {
                        warn!("{err}; starting from a fresh record");
                        ProgressRecord::default()
                    }
                }
            }
        };

        let marker = match document.get(MARKER_KEY) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let parsed = value.as_str().and_then(parse_date_key);
                if parsed.is_none() {
                    warn!("ignoring invalid logical date marker {value}");
                }
                parsed
            }
        };

        Self {
            progress,
            marker,
            repetition_count,
        }
    }

    pub fn to_document(&self) -> Result<StoredDocument, StoreError> {
        let mut document = StoredDocument::new();
        document.insert(PROGRESS_KEY.to_string(), serde_json::to_value(&self.progress)?);
        if let Some(marker) = self.marker {
            document.insert(MARKER_KEY.to_string(), Value::String(date_key(marker)));
        }
        document.insert(REPETITION_KEY.to_string(), Value::from(self.repetition_count));
        Ok(document)
    }
}

struct Inner {
    path: PathBuf,
    state: WirdState,
}

/// The single owner of plan state. All reads and writes pass through one
/// lock, and every write replaces progress, marker and configuration
/// together.
#[derive(Clone)]
pub struct ProgressStore {
    inner: Arc<Mutex<Inner>>,
}

impl ProgressStore {
    pub async fn open(path: PathBuf) -> Self {
        let document = load_document(&path).await;
        let state = WirdState::from_document(&document);
        Self {
            inner: Arc::new(Mutex::new(Inner { path, state })),
        }
    }

    pub async fn snapshot(&self) -> WirdState {
        self.inner.lock().await.state.clone()
    }

    /// Runs `apply` against a copy of the state and persists the copy if it
    /// changed. Memory is only updated once the write succeeded.
    pub async fn update<T, E>(
        &self,
        apply: impl FnOnce(&mut WirdState) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut inner = self.inner.lock().await;
        let mut next = inner.state.clone();
        let output = apply(&mut next)?;

        if next != inner.state {
            let document = next.to_document()?;
            if let Err(err) = persist_document(&inner.path, &document).await {
                error!("failed to persist wird state: {err}");
                return Err(err.into());
            }
            inner.state = next;
        }

        Ok(output)
    }
}
