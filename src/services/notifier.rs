// src/services/notifier.rs

//! Notification dispatch.
//!
//! Renders a word-level diff of the headline change and posts it to the
//! site's configured endpoint. The channel behind the endpoint is opaque to
//! the watcher; all it sees is success or failure.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{HeadlineChange, NotifyCredentials};

/// Dispatch boundary for detected headline changes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn dispatch(
        &self,
        change: &HeadlineChange,
        credentials: &NotifyCredentials,
    ) -> Result<()>;
}

/// Posts rendered changes as JSON to a webhook endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn dispatch(
        &self,
        change: &HeadlineChange,
        credentials: &NotifyCredentials,
    ) -> Result<()> {
        let payload = serde_json::json!({
            "site_id": change.site_id,
            "url": change.url,
            "old_title": change.old_title,
            "new_title": change.new_title,
            "diff_html": render_diff(&change.old_title, &change.new_title),
        });

        self.client
            .post(&credentials.endpoint)
            .bearer_auth(&credentials.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// One run of equal, removed, or added words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffChunk {
    Same(Vec<String>),
    Removed(Vec<String>),
    Added(Vec<String>),
}

/// Word-level diff between two titles.
///
/// Recursively anchors on the longest common run of words, which keeps the
/// output readable for the short strings headlines are.
pub fn diff_words(old: &str, new: &str) -> Vec<DiffChunk> {
    let old: Vec<&str> = old.split_whitespace().collect();
    let new: Vec<&str> = new.split_whitespace().collect();
    diff_slices(&old, &new)
}

fn diff_slices(old: &[&str], new: &[&str]) -> Vec<DiffChunk> {
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, word) in old.iter().enumerate() {
        positions.entry(word).or_default().push(i);
    }

    // Longest common run: overlap[i] is the length of the common run ending
    // at old[i] and the current new word.
    let mut overlap: HashMap<usize, usize> = HashMap::new();
    let mut start_old = 0;
    let mut start_new = 0;
    let mut length = 0;

    for (inew, word) in new.iter().enumerate() {
        let mut current = HashMap::new();
        if let Some(old_positions) = positions.get(word) {
            for &iold in old_positions {
                let run = if iold > 0 {
                    overlap.get(&(iold - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                current.insert(iold, run);
                if run > length {
                    length = run;
                    start_old = iold + 1 - run;
                    start_new = inew + 1 - run;
                }
            }
        }
        overlap = current;
    }

    if length == 0 {
        let mut chunks = Vec::new();
        if !old.is_empty() {
            chunks.push(DiffChunk::Removed(owned(old)));
        }
        if !new.is_empty() {
            chunks.push(DiffChunk::Added(owned(new)));
        }
        return chunks;
    }

    let mut chunks = diff_slices(&old[..start_old], &new[..start_new]);
    chunks.push(DiffChunk::Same(owned(&new[start_new..start_new + length])));
    chunks.extend(diff_slices(
        &old[start_old + length..],
        &new[start_new + length..],
    ));
    chunks
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Render the diff as a small HTML fragment with `<del>`/`<ins>` markup.
pub fn render_diff(old: &str, new: &str) -> String {
    diff_words(old, new)
        .iter()
        .map(|chunk| match chunk {
            DiffChunk::Same(words) => escape(&words.join(" ")),
            DiffChunk::Removed(words) => format!("<del>{}</del>", escape(&words.join(" "))),
            DiffChunk::Added(words) => format!("<ins>{}</ins>", escape(&words.join(" "))),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
