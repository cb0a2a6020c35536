//! Job queue boundary.
//!
//! Jobs are independent units of work pulled from named lanes by a worker
//! pool. The transport contract is at-least-once delivery with no ordering
//! guarantees, so every handler must tolerate redelivery; nothing in the
//! pipeline assumes more than `enqueue` going through.

pub mod worker;

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use worker::{BurstStats, run_burst};

/// Named queue partitions with different latency characteristics.
///
/// Frontpage and article work runs on the fast lane, sweeper re-checks on the
/// slow lane, and notification dispatch on its own lane so that a slow
/// render-and-post never delays new crawls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Main,
    Slow,
    Notify,
}

impl Lane {
    /// All lanes, in drain-priority order.
    pub const ALL: [Lane; 3] = [Lane::Main, Lane::Slow, Lane::Notify];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::Main => "main",
            Lane::Slow => "slow",
            Lane::Notify => "notify",
        }
    }
}

/// Job payloads carried over the queue boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    /// Fetch a site's listing page and schedule article fetches
    FrontpageCrawl { site_id: i64 },

    /// Fetch one article and run the revision state machine
    ArticleFetch {
        site_id: i64,
        url: String,
        #[serde(default)]
        prune_if_unchanged: bool,
        #[serde(default)]
        prune_if_url_mismatch: bool,
    },

    /// Dispatch a notification for one detected headline change
    NotifyChange {
        site_id: i64,
        url: String,
        old_title: String,
        new_title: String,
    },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::FrontpageCrawl { .. } => "frontpage_crawl",
            Job::ArticleFetch { .. } => "article_fetch",
            Job::NotifyChange { .. } => "notify_change",
        }
    }
}

/// Producer side of the queue transport.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job on the given lane.
    async fn enqueue(&self, lane: Lane, job: Job) -> Result<()>;
}

/// In-process queue transport with one FIFO per lane.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    main: Mutex<VecDeque<Job>>,
    slow: Mutex<VecDeque<Job>>,
    notify: Mutex<VecDeque<Job>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane(&self, lane: Lane) -> &Mutex<VecDeque<Job>> {
        match lane {
            Lane::Main => &self.main,
            Lane::Slow => &self.slow,
            Lane::Notify => &self.notify,
        }
    }

    /// Pop the oldest job from one lane.
    pub fn pop(&self, lane: Lane) -> Option<Job> {
        self.lane(lane).lock().expect("queue lock poisoned").pop_front()
    }

    /// Number of jobs waiting on one lane.
    pub fn lane_len(&self, lane: Lane) -> usize {
        self.lane(lane).lock().expect("queue lock poisoned").len()
    }

    /// Whether all lanes are drained.
    pub fn is_empty(&self) -> bool {
        Lane::ALL.iter().all(|&lane| self.lane_len(lane) == 0)
    }

    /// Take up to `limit` jobs, round-robin across lanes so that no single
    /// busy lane starves the others.
    pub fn drain_batch(&self, limit: usize) -> Vec<Job> {
        let mut batch = Vec::new();
        while batch.len() < limit {
            let before = batch.len();
            for &lane in &Lane::ALL {
                if batch.len() == limit {
                    break;
                }
                if let Some(job) = self.pop(lane) {
                    batch.push(job);
                }
            }
            if batch.len() == before {
                break;
            }
        }
        batch
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn enqueue(&self, lane: Lane, job: Job) -> Result<()> {
        log::debug!("enqueue {} on {}", job.kind(), lane.as_str());
        self.lane(lane).lock().expect("queue lock poisoned").push_back(job);
        Ok(())
    }
}
