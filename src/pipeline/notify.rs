// src/pipeline/notify.rs

//! Notification dispatch with duplicate suppression.

use chrono::Utc;

use crate::context::JobContext;
use crate::error::Result;
use crate::models::HeadlineChange;

/// Dispatch one headline-change notification, at most once per change.
///
/// The fingerprint marker is persisted before dispatch: a redelivered job
/// finds the marker and drops the duplicate. Marker write and dispatch are
/// not atomic with each other; a crash between them loses that one
/// notification, which costs less than posting it twice.
pub async fn run(ctx: &JobContext, change: HeadlineChange) -> Result<()> {
    let site = ctx.site(change.site_id)?;

    let Some(credentials) = site.notify_credentials() else {
        log::debug!("{}: no notification credentials, skipping", site.name);
        return Ok(());
    };

    let fingerprint = change.fingerprint();
    if !ctx.fingerprints.try_record(&fingerprint, Utc::now()).await? {
        log::warn!("duplicate notification suppressed for {}", change.url);
        return Ok(());
    }

    ctx.notifier.dispatch(&change, credentials).await?;
    log::info!(
        "{}: notified headline change for {}",
        site.name,
        change.url
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{harness, notifying_site, silent_site};

    fn change(site_id: i64) -> HeadlineChange {
        HeadlineChange {
            site_id,
            url: "https://news.example/story/1".to_string(),
            old_title: "Old headline".to_string(),
            new_title: "New headline".to_string(),
        }
    }

    #[tokio::test]
    async fn test_same_change_dispatches_once() {
        let harness = harness(vec![notifying_site(1)]);

        run(&harness.ctx, change(1)).await.unwrap();
        run(&harness.ctx, change(1)).await.unwrap();

        assert_eq!(harness.notifier.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_changes_both_dispatch() {
        let harness = harness(vec![notifying_site(1)]);

        run(&harness.ctx, change(1)).await.unwrap();
        let mut second = change(1);
        second.new_title = "Third headline".to_string();
        run(&harness.ctx, second).await.unwrap();

        assert_eq!(harness.notifier.dispatch_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_a_noop() {
        let harness = harness(vec![silent_site(1)]);

        run(&harness.ctx, change(1)).await.unwrap();
        assert_eq!(harness.notifier.dispatch_count(), 0);

        // No marker was written: the change would still dispatch if
        // credentials appeared later.
        use crate::storage::FingerprintStore;
        assert!(
            harness
                .store
                .try_record(&change(1).fingerprint(), Utc::now())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_unknown_site_is_an_error() {
        let harness = harness(vec![notifying_site(1)]);
        assert!(run(&harness.ctx, change(42)).await.is_err());
    }
}
