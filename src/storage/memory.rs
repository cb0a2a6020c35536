// src/storage/memory.rs

//! In-memory store backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::ArticleRevision;
use crate::queue::{JobQueue, Lane};
use crate::storage::{FetchOutcome, FetchUpdate, FingerprintStore, RevisionStore, StoreState};

/// Ephemeral backend holding all state behind one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevisionStore for MemoryStore {
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
        Ok(state.apply_fetch(&update, decision))
    }

    async fn delete(&self, url: &str) -> Result<bool> {
        Ok(self.state.lock().await.revisions.remove(url).is_some())
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
impl FingerprintStore for MemoryStore {
    async fn try_record(&self, fingerprint: &str, now: DateTime<Utc>) -> Result<bool> {
        Ok(self.state.lock().await.try_record(fingerprint, now))
    }

    async fn expire_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        Ok(self.state.lock().await.expire_fingerprints(cutoff))
    }
}
