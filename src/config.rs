// src/config.rs

//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Site;
use crate::utils::html;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Revision staleness settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Notification debounce settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Watched newspaper sites
    #[serde(default)]
    pub sites: Vec<Site>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.watch.staleness_days <= 0 {
            return Err(AppError::validation("watch.staleness_days must be > 0"));
        }
        if self.notify.fingerprint_ttl_days < 0 {
            return Err(AppError::validation(
                "notify.fingerprint_ttl_days must be >= 0",
            ));
        }

        let mut seen_ids = HashSet::new();
        for site in &self.sites {
            if site.name.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "site {} has an empty name",
                    site.id
                )));
            }
            if !seen_ids.insert(site.id) {
                return Err(AppError::validation(format!(
                    "duplicate site id {}",
                    site.id
                )));
            }
            url::Url::parse(&site.listing_url).map_err(|e| {
                AppError::validation(format!("site '{}': bad listing_url: {e}", site.name))
            })?;
            site.article_url_regex()?;
            html::parse_selector(&site.title_selector)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            watch: WatchConfig::default(),
            notify: NotifyConfig::default(),
            sites: Vec::new(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between worker batches in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent jobs
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Cookies sent with every request. Some papers gate their articles
    /// behind a consent cookie.
    #[serde(default = "defaults::default_cookies")]
    pub default_cookies: Vec<CookieDef>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            default_cookies: defaults::default_cookies(),
        }
    }
}

/// A cookie pre-set on the shared HTTP session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieDef {
    pub name: String,
    pub value: String,
}

/// Revision staleness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Revisions not fetched for this many days are re-checked and, when
    /// unchanged, pruned.
    #[serde(default = "defaults::staleness_days")]
    pub staleness_days: i64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            staleness_days: defaults::staleness_days(),
        }
    }
}

/// Notification debounce settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Days to retain notification fingerprints; 0 keeps them forever.
    #[serde(default)]
    pub fingerprint_ttl_days: i64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            fingerprint_ttl_days: 0,
        }
    }
}

mod defaults {
    use super::CookieDef;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; presswatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn default_cookies() -> Vec<CookieDef> {
        // derstandard refuses to serve articles without this consent cookie.
        vec![CookieDef {
            name: "DSGVO_ZUSAGE_V1".into(),
            value: "true".into(),
        }]
    }

    // Watch defaults
    pub fn staleness_days() -> i64 {
        7
    }
}
