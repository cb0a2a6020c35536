// src/models/revision.rs

//! Stored per-article revision state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The last-known title and fetch timestamps for one article URL.
///
/// Invariant: `changed_at <= fetched_at`. `fetched_at` is refreshed on every
/// successful fetch; `title` and `changed_at` move only when the new title is
/// a significant change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleRevision {
    /// Article URL, unique key of the record
    pub url: String,

    /// Owning site
    pub site_id: i64,

    /// Last significant title observed
    pub title: String,

    /// Timestamp of the last successful fetch
    pub fetched_at: DateTime<Utc>,

    /// Timestamp of the last significant title change
    pub changed_at: DateTime<Utc>,
}

impl ArticleRevision {
    /// Create a fresh record for a first successful fetch.
    pub fn new(site_id: i64, url: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            site_id,
            title: title.into(),
            fetched_at: now,
            changed_at: now,
        }
    }
}
