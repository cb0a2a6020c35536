// src/context.rs

//! Explicit dependencies handed to every job handler.
//!
//! Handlers never reach into ambient global state: the HTTP session, the
//! queue client, and the stores are all constructed once and passed in.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Site;
use crate::queue::JobQueue;
use crate::services::Notifier;
use crate::storage::{FingerprintStore, RevisionStore};
use crate::utils::http;

/// Shared handle for job execution.
pub struct JobContext {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
    pub queue: Arc<dyn JobQueue>,
    pub revisions: Arc<dyn RevisionStore>,
    pub fingerprints: Arc<dyn FingerprintStore>,
    pub notifier: Arc<dyn Notifier>,
    sites: HashMap<i64, Site>,
}

impl JobContext {
    /// Build a context, constructing the shared HTTP session from the
    /// crawler configuration.
    pub fn new(
        config: Arc<Config>,
        queue: Arc<dyn JobQueue>,
        revisions: Arc<dyn RevisionStore>,
        fingerprints: Arc<dyn FingerprintStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = http::create_client(&config.crawler)?;
        let sites = config
            .sites
            .iter()
            .map(|site| (site.id, site.clone()))
            .collect();
        Ok(Self {
            config,
            client,
            queue,
            revisions,
            fingerprints,
            notifier,
            sites,
        })
    }

    /// Look up a configured site by id.
    pub fn site(&self, site_id: i64) -> Result<&Site> {
        self.sites
            .get(&site_id)
            .ok_or(AppError::UnknownSite { site_id })
    }
}
