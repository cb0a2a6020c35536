// src/pipeline/article.rs

//! Article fetch: extract the title and drive the revision state machine.

use chrono::Utc;

use crate::context::JobContext;
use crate::error::{AppError, Result};
use crate::models::Site;
use crate::pipeline::significance;
use crate::storage::{FetchOutcome, FetchUpdate};
use crate::utils::{html, http};

/// Flags controlling the sweeper's re-check behavior. Frontpage-driven
/// fetches leave both off.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchFlags {
    /// Delete the revision instead of refreshing it when nothing changed
    pub prune_if_unchanged: bool,
    /// Delete the revision without fetching when the URL no longer matches
    /// the site's article pattern
    pub prune_if_url_mismatch: bool,
}

/// Fetch one article and fold the result into the revision store.
pub async fn run(ctx: &JobContext, site_id: i64, url: &str, flags: FetchFlags) -> Result<()> {
    let site = ctx.site(site_id)?;

    // Administrative drift: the site's pattern was corrected and this stored
    // URL is no longer an article. Reclaim the record without fetching.
    if flags.prune_if_url_mismatch && !site.matches_article_url(url)? {
        if ctx.revisions.delete(url).await? {
            log::info!(
                "{}: dropped revision for {url}, no longer matches article pattern",
                site.name
            );
        }
        return Ok(());
    }

    let (final_url, body) = http::fetch_page(&ctx.client, url).await?;
    let title = extract_title(site, url, &body)?;

    apply(ctx, site, url, final_url.as_str(), &title, flags).await?;
    Ok(())
}

/// Pull the title text out of the article page.
///
/// Zero matches is fatal (broken selector configuration). More than one match
/// is logged and the first is used.
pub(crate) fn extract_title(site: &Site, url: &str, body: &str) -> Result<String> {
    let selector = html::parse_selector(&site.title_selector)?;
    let mut titles = html::extract_text(body, &selector);

    if titles.is_empty() {
        return Err(AppError::NoTitleFound {
            url: url.to_string(),
        });
    }
    if titles.len() > 1 {
        log::warn!(
            "{url}: selector {:?} matched {} elements, using the first",
            site.title_selector,
            titles.len()
        );
    }
    Ok(titles.swap_remove(0))
}

/// Apply the fetched title to the store, wired to the classifier.
pub(crate) async fn apply(
    ctx: &JobContext,
    site: &Site,
    requested_url: &str,
    final_url: &str,
    title: &str,
    flags: FetchFlags,
) -> Result<FetchOutcome> {
    let update = FetchUpdate {
        site_id: site.id,
        requested_url,
        final_url,
        title,
        now: Utc::now(),
        prune_if_unchanged: flags.prune_if_unchanged,
        significant: significance::is_significant_title_change,
    };

    let outcome = ctx.revisions.apply_fetch(update, ctx.queue.as_ref()).await?;
    match &outcome {
        FetchOutcome::Created => log::debug!("{requested_url}: now tracked"),
        FetchOutcome::Refreshed => log::debug!("{requested_url}: unchanged"),
        FetchOutcome::Changed { old_title } => {
            log::info!("{requested_url}: headline changed from {old_title:?} to {title:?}")
        }
        FetchOutcome::Pruned => log::info!("{requested_url}: unchanged and stale, pruned"),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{harness, notifying_site};
    use crate::queue::{Job, Lane};
    use crate::storage::RevisionStore;

    const ARTICLE: &str = r#"
        <html><body>
            <h1 class="article-title"> Breaking   headline </h1>
        </body></html>
    "#;

    #[test]
    fn test_extract_title_normalizes_whitespace() {
        let site = notifying_site(1);
        let title = extract_title(&site, "https://news.example/story/1", ARTICLE).unwrap();
        assert_eq!(title, "Breaking headline");
    }

    #[test]
    fn test_extract_title_zero_matches_is_fatal() {
        let site = notifying_site(1);
        let result = extract_title(&site, "https://news.example/story/1", "<p>no title</p>");
        assert!(matches!(result, Err(AppError::NoTitleFound { .. })));
    }

    #[test]
    fn test_extract_title_many_matches_uses_first() {
        let site = notifying_site(1);
        let body = r#"
            <h1 class="article-title">First</h1>
            <h1 class="article-title">Second</h1>
        "#;
        let title = extract_title(&site, "https://news.example/story/1", body).unwrap();
        assert_eq!(title, "First");
    }

    #[tokio::test]
    async fn test_apply_creates_then_detects_change() {
        let harness = harness(vec![notifying_site(1)]);
        let site = harness.ctx.site(1).unwrap();
        let url = "https://news.example/story/1";

        let outcome = apply(&harness.ctx, site, url, url, "Quiet first headline", FetchFlags::default())
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Created);

        let outcome = apply(
            &harness.ctx,
            site,
            url,
            url,
            "Completely rewritten story title",
            FetchFlags::default(),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, FetchOutcome::Changed { .. }));

        assert_eq!(
            harness.queue.pop(Lane::Notify),
            Some(Job::NotifyChange {
                site_id: 1,
                url: url.to_string(),
                old_title: "Quiet first headline".to_string(),
                new_title: "Completely rewritten story title".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_url_mismatch_prunes_without_fetching() {
        let harness = harness(vec![notifying_site(1)]);
        let site = harness.ctx.site(1).unwrap();
        let url = "https://news.example/liveticker/9";

        // Seed a revision under a URL that no longer matches the pattern.
        apply(&harness.ctx, site, url, url, "Stray record", FetchFlags::default())
            .await
            .unwrap();
        assert_eq!(harness.store.revision_count().await.unwrap(), 1);

        run(
            &harness.ctx,
            1,
            url,
            FetchFlags {
                prune_if_unchanged: false,
                prune_if_url_mismatch: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(harness.store.revision_count().await.unwrap(), 0);
        assert!(harness.queue.is_empty());
    }
}
