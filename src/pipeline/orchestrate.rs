// src/pipeline/orchestrate.rs

//! Cycle entry point.

use crate::context::JobContext;
use crate::error::Result;
use crate::pipeline::sweep;
use crate::queue::{Job, Lane};

/// Run one watch cycle: schedule a frontpage crawl for every configured site,
/// then sweep stale revisions. The cadence is whatever external trigger calls
/// this; nothing here schedules itself.
pub async fn run_cycle(ctx: &JobContext) -> Result<()> {
    for site in &ctx.config.sites {
        ctx.queue
            .enqueue(Lane::Main, Job::FrontpageCrawl { site_id: site.id })
            .await?;
    }

    let rechecks = sweep::run(ctx).await?;
    log::info!(
        "cycle scheduled {} frontpage crawls and {} stale re-checks",
        ctx.config.sites.len(),
        rechecks
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{harness, notifying_site};

    #[tokio::test]
    async fn test_cycle_schedules_one_crawl_per_site() {
        let harness = harness(vec![notifying_site(1), notifying_site(2)]);

        run_cycle(&harness.ctx).await.unwrap();

        assert_eq!(harness.queue.lane_len(Lane::Main), 2);
        let mut site_ids = Vec::new();
        while let Some(job) = harness.queue.pop(Lane::Main) {
            match job {
                Job::FrontpageCrawl { site_id } => site_ids.push(site_id),
                other => panic!("unexpected job {other:?}"),
            }
        }
        site_ids.sort_unstable();
        assert_eq!(site_ids, vec![1, 2]);
    }
}
