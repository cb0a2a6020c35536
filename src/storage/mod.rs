//! Storage abstractions for revision and notification-marker persistence.
//!
//! The storage engine itself is a collaborator behind these traits; the core
//! only relies on the state machine below being applied atomically per call.
//! Two backends ship: [`MemoryStore`] for tests and ephemeral runs, and
//! [`LocalStore`] which keeps the same state in JSON files on disk.

pub mod local;
pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ArticleRevision;
use crate::queue::{Job, JobQueue};

pub use local::LocalStore;
pub use memory::MemoryStore;

/// One successful article fetch, ready to be folded into the store.
pub struct FetchUpdate<'a> {
    /// Owning site
    pub site_id: i64,
    /// URL the job asked for (pre-redirect)
    pub requested_url: &'a str,
    /// URL the fetch resolved to (post-redirect)
    pub final_url: &'a str,
    /// Extracted title
    pub title: &'a str,
    /// Fetch timestamp
    pub now: DateTime<Utc>,
    /// Delete the record instead of refreshing it when the title is unchanged
    pub prune_if_unchanged: bool,
    /// Title-significance classifier the transition is wired to
    pub significant: fn(&str, &str) -> bool,
}

/// What a fetch did to the stored revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// First fetch of this URL, record created
    Created,
    /// Title unchanged, only `fetched_at` refreshed
    Refreshed,
    /// Significant title change recorded, notification scheduled
    Changed { old_title: String },
    /// Title unchanged and pruning was requested, record deleted
    Pruned,
}

/// Per-article revision state.
#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// Apply one fetch as a single atomic read-compare-write.
    ///
    /// Concurrent fetches for the same URL are not serialized by the queue,
    /// so the whole transition (prior-title read, significance check,
    /// notification enqueue, write) runs under one lock acquisition. The
    /// notification job is enqueued *before* the write is committed: a failed
    /// commit may duplicate a notification but never lose one.
    async fn apply_fetch(&self, update: FetchUpdate<'_>, queue: &dyn JobQueue)
    -> Result<FetchOutcome>;

    /// Delete the revision stored under `url`. Returns whether one existed.
    async fn delete(&self, url: &str) -> Result<bool>;

    /// All revisions whose `fetched_at` is older than `cutoff`.
    async fn stale_revisions(&self, cutoff: DateTime<Utc>) -> Result<Vec<ArticleRevision>>;

    /// Look up one revision by its stored key.
    async fn get(&self, url: &str) -> Result<Option<ArticleRevision>>;

    /// Number of tracked articles.
    async fn revision_count(&self) -> Result<usize>;
}

/// Write-once markers of already-dispatched notifications.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Record a fingerprint. Returns `true` when it was newly recorded,
    /// `false` when a marker already existed (duplicate to be dropped).
    async fn try_record(&self, fingerprint: &str, now: DateTime<Utc>) -> Result<bool>;

    /// Drop markers recorded before `cutoff`. Returns how many were removed.
    async fn expire_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

/// In-memory working state shared by both backends.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub revisions: HashMap<String, ArticleRevision>,
    pub fingerprints: HashMap<String, DateTime<Utc>>,
}

/// Resolved plan for one fetch, computed before anything is written.
pub(crate) struct FetchDecision {
    /// Prior record, wherever it was keyed
    prior: Option<ArticleRevision>,
    /// Key to remove before writing (redirect re-key source or duplicate)
    stale_key: Option<String>,
    /// Classifier verdict on prior title vs new title
    significant: bool,
}

impl FetchDecision {
    /// The notification to schedule, when the change is significant.
    pub(crate) fn notify_job(&self, update: &FetchUpdate<'_>) -> Option<Job> {
        if !self.significant {
            return None;
        }
        let prior = self.prior.as_ref()?;
        Some(Job::NotifyChange {
            site_id: update.site_id,
            url: update.requested_url.to_string(),
            old_title: prior.title.clone(),
            new_title: update.title.to_string(),
        })
    }
}

impl StoreState {
    /// Resolve the prior record and classify the new title.
    ///
    /// A revision may be keyed under the final URL or, after a past redirect,
    /// under the URL the job asked for. The final URL wins: a record found
    /// under the requested URL is re-keyed to the final URL, and when both
    /// keys hold records the requested-URL one is collapsed away.
    pub(crate) fn plan_fetch(&self, update: &FetchUpdate<'_>) -> FetchDecision {
        let redirected = update.requested_url != update.final_url;

        let (prior, stale_key) = match self.revisions.get(update.final_url) {
            Some(rev) => {
                let duplicate = redirected && self.revisions.contains_key(update.requested_url);
                (
                    Some(rev.clone()),
                    duplicate.then(|| update.requested_url.to_string()),
                )
            }
            None => match self.revisions.get(update.requested_url) {
                Some(rev) => (
                    Some(rev.clone()),
                    redirected.then(|| update.requested_url.to_string()),
                ),
                None => (None, None),
            },
        };

        let significant = prior
            .as_ref()
            .is_some_and(|rev| (update.significant)(&rev.title, update.title));

        FetchDecision {
            prior,
            stale_key,
            significant,
        }
    }

    /// Commit a planned fetch.
    pub(crate) fn apply_fetch(
        &mut self,
        update: &FetchUpdate<'_>,
        decision: FetchDecision,
    ) -> FetchOutcome {
        if let Some(key) = &decision.stale_key {
            self.revisions.remove(key);
        }

        let key = update.final_url.to_string();
        match decision.prior {
            None => {
                self.revisions.insert(
                    key.clone(),
                    ArticleRevision::new(update.site_id, key, update.title, update.now),
                );
                FetchOutcome::Created
            }
            Some(prior) if decision.significant => {
                self.revisions.insert(
                    key.clone(),
                    ArticleRevision {
                        url: key,
                        site_id: prior.site_id,
                        title: update.title.to_string(),
                        fetched_at: update.now,
                        changed_at: update.now,
                    },
                );
                FetchOutcome::Changed {
                    old_title: prior.title,
                }
            }
            Some(_) if update.prune_if_unchanged => {
                self.revisions.remove(&key);
                FetchOutcome::Pruned
            }
            Some(prior) => {
                self.revisions.insert(
                    key.clone(),
                    ArticleRevision {
                        url: key,
                        site_id: prior.site_id,
                        title: prior.title,
                        fetched_at: update.now,
                        changed_at: prior.changed_at,
                    },
                );
                FetchOutcome::Refreshed
            }
        }
    }

    pub(crate) fn stale_revisions(&self, cutoff: DateTime<Utc>) -> Vec<ArticleRevision> {
        self.revisions
            .values()
            .filter(|rev| rev.fetched_at < cutoff)
            .cloned()
            .collect()
    }

    pub(crate) fn try_record(&mut self, fingerprint: &str, now: DateTime<Utc>) -> bool {
        if self.fingerprints.contains_key(fingerprint) {
            return false;
        }
        self.fingerprints.insert(fingerprint.to_string(), now);
        true
    }

    pub(crate) fn expire_fingerprints(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.fingerprints.len();
        self.fingerprints.retain(|_, recorded_at| *recorded_at >= cutoff);
        before - self.fingerprints.len()
    }
}

/// Persisted form of the store state.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct PersistedState {
    #[serde(default)]
    pub revisions: Vec<ArticleRevision>,
    #[serde(default)]
    pub fingerprints: HashMap<String, DateTime<Utc>>,
}

impl From<&StoreState> for PersistedState {
    fn from(state: &StoreState) -> Self {
        let mut revisions: Vec<ArticleRevision> = state.revisions.values().cloned().collect();
        revisions.sort_by(|a, b| a.url.cmp(&b.url));
        Self {
            revisions,
            fingerprints: state.fingerprints.clone(),
        }
    }
}

impl From<PersistedState> for StoreState {
    fn from(persisted: PersistedState) -> Self {
        Self {
            revisions: persisted
                .revisions
                .into_iter()
                .map(|rev| (rev.url.clone(), rev))
                .collect(),
            fingerprints: persisted.fingerprints,
        }
    }
}
