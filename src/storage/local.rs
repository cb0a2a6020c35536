// src/storage/local.rs

//! Local filesystem store backend.
//!
//! Keeps the working state in memory and mirrors every mutation to a JSON
//! file under the state directory. Files are rewritten atomically (temp file,
//! then rename); the rename is the durable commit point.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::ArticleRevision;
use crate::queue::{JobQueue, Lane};
use crate::storage::{
    FetchOutcome, FetchUpdate, FingerprintStore, PersistedState, RevisionStore, StoreState,
};

const STATE_FILE: &str = "state.json";

/// File-backed store rooted at a state directory.
pub struct LocalStore {
    root_dir: PathBuf,
    state: Mutex<StoreState>,
}

impl LocalStore {
    /// Open (or initialize) the store under the given directory.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let persisted: PersistedState = read_json(&root_dir.join(STATE_FILE))
            .await?
            .unwrap_or_default();
        Ok(Self {
            root_dir,
            state: Mutex::new(persisted.into()),
        })
    }

    /// Persist the current state. Called with the state lock held, so the
    /// on-disk file always reflects a consistent snapshot.
    async fn flush(&self, state: &StoreState) -> Result<()> {
        write_json(&self.root_dir.join(STATE_FILE), &PersistedState::from(state)).await
    }
}

/// Read JSON data, returning None if the file doesn't exist.
async fn read_json<T: DeserializeOwned>(path: &PathBuf) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Write JSON atomically (write to temp, then rename).
async fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl RevisionStore for LocalStore {
    async fn apply_fetch(
        &self,
        update: FetchUpdate<'_>,
        queue: &dyn JobQueue,
    ) -> Result<FetchOutcome> {
        let mut state = self.state.lock().await;
        let decision = state.plan_fetch(&update);
        if let Some(job) = decision.notify_job(&update) {
            queue.enqueue(Lane::Notify, job).await?;
        }
        let outcome = state.apply_fetch(&update, decision);
        self.flush(&state).await?;
        Ok(outcome)
    }

    async fn delete(&self, url: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let existed = state.revisions.remove(url).is_some();
        if existed {
            self.flush(&state).await?;
        }
        Ok(existed)
    }

    async fn stale_revisions(&self, cutoff: DateTime<Utc>) -> Result<Vec<ArticleRevision>> {
        Ok(self.state.lock().await.stale_revisions(cutoff))
    }

    async fn get(&self, url: &str) -> Result<Option<ArticleRevision>> {
        Ok(self.state.lock().await.revisions.get(url).cloned())
    }

    async fn revision_count(&self) -> Result<usize> {
        Ok(self.state.lock().await.revisions.len())
    }
}

#[async_trait]
impl FingerprintStore for LocalStore {
    async fn try_record(&self, fingerprint: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut state = self.state.lock().await;
        let recorded = state.try_record(fingerprint, now);
        if recorded {
            // The marker must be durable before dispatch is attempted.
            self.flush(&state).await?;
        }
        Ok(recorded)
    }

    async fn expire_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut state = self.state.lock().await;
        let removed = state.expire_fingerprints(cutoff);
        if removed > 0 {
            self.flush(&state).await?;
        }
        Ok(removed)
    }
}
