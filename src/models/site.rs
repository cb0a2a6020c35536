// src/models/site.rs

//! Watched site definition.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A newspaper site under watch.
///
/// Sites are read-only configuration: the watcher never mutates them, it only
/// crawls the listing page and the articles it links to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Site {
    /// Unique site identifier, referenced by jobs and stored revisions
    pub id: i64,

    /// Human-readable name (e.g. "Der Standard")
    pub name: String,

    /// URL of the frontpage or any page where articles are linked
    pub listing_url: String,

    /// Regex matched against candidate article URLs, anchored at the start
    pub article_url_pattern: String,

    /// CSS selector that matches the title text on an article page
    pub title_selector: String,

    /// Credentials for the downstream notification channel.
    /// Absent or incomplete credentials turn dispatch into a no-op.
    #[serde(default)]
    pub notification: Option<NotifyCredentials>,
}

impl Site {
    /// Compile the article URL pattern.
    pub fn article_url_regex(&self) -> Result<Regex> {
        Regex::new(&self.article_url_pattern)
            .map_err(|e| AppError::pattern(&self.article_url_pattern, e))
    }

    /// Whether a URL counts as an article of this site.
    pub fn matches_article_url(&self, url: &str) -> Result<bool> {
        Ok(prefix_matches(&self.article_url_regex()?, url))
    }

    /// Credentials, if complete enough to attempt a dispatch.
    pub fn notify_credentials(&self) -> Option<&NotifyCredentials> {
        self.notification.as_ref().filter(|c| c.is_complete())
    }
}

/// Prefix-anchored regex match: the match must begin at the start of the
/// string but need not consume all of it.
pub fn prefix_matches(pattern: &Regex, text: &str) -> bool {
    pattern.find(text).is_some_and(|m| m.start() == 0)
}

/// Opaque credentials for the notification channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifyCredentials {
    /// Endpoint the rendered change is posted to
    pub endpoint: String,

    /// Bearer token for the endpoint
    pub token: String,
}

impl NotifyCredentials {
    /// All fields must be present for dispatch to be attempted.
    pub fn is_complete(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.token.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(pattern: &str) -> Site {
        Site {
            id: 1,
            name: "Test Paper".to_string(),
            listing_url: "https://news.example/frontpage".to_string(),
            article_url_pattern: pattern.to_string(),
            title_selector: ".article-title".to_string(),
            notification: None,
        }
    }

    #[test]
    fn test_prefix_anchored_match() {
        let site = site("^https://news.example/story/");
        assert!(
            site.matches_article_url("https://news.example/story/123")
                .unwrap()
        );
        assert!(
            !site
                .matches_article_url("https://news.example/other/123")
                .unwrap()
        );
    }

    #[test]
    fn test_match_must_start_at_beginning() {
        // Without an explicit anchor the pattern must still match from the start.
        let site = site("https://news.example/story/");
        assert!(
            site.matches_article_url("https://news.example/story/123")
                .unwrap()
        );
        assert!(
            !site
                .matches_article_url("https://mirror.example/https://news.example/story/")
                .unwrap()
        );
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let site = site("[unclosed");
        assert!(site.article_url_regex().is_err());
    }

    #[test]
    fn test_notify_credentials_gate() {
        let mut site = site("^https://news.example/story/");
        assert!(site.notify_credentials().is_none());

        site.notification = Some(NotifyCredentials {
            endpoint: "https://hooks.example/post".to_string(),
            token: "".to_string(),
        });
        assert!(site.notify_credentials().is_none());

        site.notification = Some(NotifyCredentials {
            endpoint: "https://hooks.example/post".to_string(),
            token: "secret".to_string(),
        });
        assert!(site.notify_credentials().is_some());
    }
}
