// src/pipeline/sweep.rs

//! Staleness sweep: re-check old revisions and bound stored state.

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;

use crate::context::JobContext;
use crate::error::Result;
use crate::queue::{Job, Lane};

/// Re-queue every revision not fetched within the staleness threshold.
///
/// Re-checks run on the slow lane with both prune flags set: articles whose
/// title did not move are deleted, ones that no longer match the site pattern
/// are dropped without a fetch. The candidates are shuffled so that under
/// load the same subset is not always re-checked first.
///
/// Returns the number of re-checks scheduled.
pub async fn run(ctx: &JobContext) -> Result<usize> {
    let now = Utc::now();
    let cutoff = now - Duration::days(ctx.config.watch.staleness_days);

    let mut stale = ctx.revisions.stale_revisions(cutoff).await?;
    stale.shuffle(&mut rand::rng());

    for revision in &stale {
        ctx.queue
            .enqueue(
                Lane::Slow,
                Job::ArticleFetch {
                    site_id: revision.site_id,
                    url: revision.url.clone(),
                    prune_if_unchanged: true,
                    prune_if_url_mismatch: true,
                },
            )
            .await?;
    }

    let ttl_days = ctx.config.notify.fingerprint_ttl_days;
    if ttl_days > 0 {
        let expired = ctx
            .fingerprints
            .expire_older_than(now - Duration::days(ttl_days))
            .await?;
        if expired > 0 {
            log::info!("expired {expired} notification fingerprints");
        }
    }

    Ok(stale.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{harness, notifying_site};
    use crate::pipeline::article::{self, FetchFlags};
    use crate::pipeline::significance::is_significant_title_change;
    use crate::storage::{FetchUpdate, FingerprintStore, RevisionStore};

    async fn seed(
        harness: &crate::context::testing::TestHarness,
        url: &str,
        title: &str,
        age_days: i64,
    ) {
        let update = FetchUpdate {
            site_id: 1,
            requested_url: url,
            final_url: url,
            title,
            now: Utc::now() - Duration::days(age_days),
            prune_if_unchanged: false,
            significant: is_significant_title_change,
        };
        harness
            .store
            .apply_fetch(update, harness.queue.as_ref())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_only_stale_revisions_are_rechecked() {
        let harness = harness(vec![notifying_site(1)]);
        seed(&harness, "https://news.example/story/old", "Old", 9).await;
        seed(&harness, "https://news.example/story/fresh", "Fresh", 1).await;

        let scheduled = run(&harness.ctx).await.unwrap();
        assert_eq!(scheduled, 1);
        assert_eq!(harness.queue.lane_len(Lane::Main), 0);

        assert_eq!(
            harness.queue.pop(Lane::Slow),
            Some(Job::ArticleFetch {
                site_id: 1,
                url: "https://news.example/story/old".to_string(),
                prune_if_unchanged: true,
                prune_if_url_mismatch: true,
            })
        );
    }

    #[tokio::test]
    async fn test_recheck_prunes_unchanged_and_keeps_changed() {
        let harness = harness(vec![notifying_site(1)]);
        let site = harness.ctx.site(1).unwrap().clone();
        let unchanged = "https://news.example/story/unchanged";
        let changed = "https://news.example/story/changed";
        seed(&harness, unchanged, "Same headline as before", 9).await;
        seed(&harness, changed, "A headline about one thing", 9).await;

        let flags = FetchFlags {
            prune_if_unchanged: true,
            prune_if_url_mismatch: true,
        };
        article::apply(
            &harness.ctx,
            &site,
            unchanged,
            unchanged,
            "Same headline as before",
            flags,
        )
        .await
        .unwrap();
        article::apply(
            &harness.ctx,
            &site,
            changed,
            changed,
            "Completely different words now here",
            flags,
        )
        .await
        .unwrap();

        assert!(harness.store.get(unchanged).await.unwrap().is_none());
        let kept = harness.store.get(changed).await.unwrap().unwrap();
        assert_eq!(kept.title, "Completely different words now here");
    }

    #[tokio::test]
    async fn test_fingerprint_ttl_is_enforced_when_configured() {
        let mut config = crate::config::Config::default();
        config.notify.fingerprint_ttl_days = 7;
        config.sites = vec![notifying_site(1)];
        let harness = crate::context::testing::harness_with_config(config);

        harness
            .store
            .try_record("stale-marker", Utc::now() - Duration::days(30))
            .await
            .unwrap();
        run(&harness.ctx).await.unwrap();

        // The expired marker no longer debounces.
        assert!(
            harness
                .store
                .try_record("stale-marker", Utc::now())
                .await
                .unwrap()
        );
    }
}
