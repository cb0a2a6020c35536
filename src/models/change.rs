// src/models/change.rs

//! A detected headline change, as carried by notification jobs.

use sha2::{Digest, Sha256};

/// One significant title change for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineChange {
    pub site_id: i64,
    pub url: String,
    pub old_title: String,
    pub new_title: String,
}

impl HeadlineChange {
    /// Deterministic fingerprint of this specific change, used to suppress
    /// duplicate notifications when the queue redelivers a job.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.site_id.to_string().as_bytes());
        hasher.update(b":");
        hasher.update(self.url.as_bytes());
        hasher.update(b":");
        hasher.update(self.old_title.as_bytes());
        hasher.update(b":");
        hasher.update(self.new_title.as_bytes());
        hex::encode(hasher.finalize())
    }
}
