//! Job handlers and the cycle entry point.
//!
//! - `orchestrate::run_cycle`: fan out frontpage crawls and the staleness sweep
//! - `frontpage`: listing page → article fetch jobs
//! - `article`: one article → revision state machine
//! - `notify`: debounce gate → external dispatch
//! - `significance`: the pure title-change classifier

pub mod article;
pub mod frontpage;
pub mod notify;
pub mod orchestrate;
pub mod significance;
pub mod sweep;

pub use orchestrate::run_cycle;
pub use significance::is_significant_title_change;

use crate::context::JobContext;
use crate::error::Result;
use crate::models::HeadlineChange;
use crate::queue::Job;

/// Execute one claimed job.
pub async fn execute(ctx: &JobContext, job: Job) -> Result<()> {
    match job {
        Job::FrontpageCrawl { site_id } => frontpage::run(ctx, site_id).await,
        Job::ArticleFetch {
            site_id,
            url,
            prune_if_unchanged,
            prune_if_url_mismatch,
        } => {
            article::run(
                ctx,
                site_id,
                &url,
                article::FetchFlags {
                    prune_if_unchanged,
                    prune_if_url_mismatch,
                },
            )
            .await
        }
        Job::NotifyChange {
            site_id,
            url,
            old_title,
            new_title,
        } => {
            notify::run(
                ctx,
                HeadlineChange {
                    site_id,
                    url,
                    old_title,
                    new_title,
                },
            )
            .await
        }
    }
}
