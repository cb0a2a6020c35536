// src/pipeline/frontpage.rs

//! Frontpage crawl: extract article links and schedule fetches.

use regex::Regex;
use url::Url;

use crate::context::JobContext;
use crate::error::{AppError, Result};
use crate::models::{Site, prefix_matches};
use crate::queue::{Job, Lane};
use crate::utils::{html, http, url as url_utils};

/// Crawl one site's listing page.
pub async fn run(ctx: &JobContext, site_id: i64) -> Result<()> {
    let site = ctx.site(site_id)?;
    let (final_url, body) = http::fetch_page(&ctx.client, &site.listing_url).await?;
    let scheduled = schedule_from_listing(ctx, site, &body, &final_url).await?;
    log::info!("{}: scheduled {scheduled} article fetches", site.name);
    Ok(())
}

/// Schedule an article fetch for every matching link on the listing page.
///
/// Zero matches is a hard error: it means the site's URL pattern or listing
/// page configuration is broken and an operator should hear about it. The
/// same URL appearing several times on the page is scheduled several times;
/// the fetch side is idempotent enough to absorb that.
pub(crate) async fn schedule_from_listing(
    ctx: &JobContext,
    site: &Site,
    body: &str,
    base: &Url,
) -> Result<usize> {
    let pattern = site.article_url_regex()?;
    let urls = collect_article_urls(body, base, &pattern);
    if urls.is_empty() {
        return Err(AppError::NoArticlesFound {
            site: site.name.clone(),
        });
    }

    let count = urls.len();
    for url in urls {
        ctx.queue
            .enqueue(
                Lane::Main,
                Job::ArticleFetch {
                    site_id: site.id,
                    url,
                    prune_if_unchanged: false,
                    prune_if_url_mismatch: false,
                },
            )
            .await?;
    }
    Ok(count)
}

/// Canonicalized article URLs found on a listing page.
///
/// Links are resolved against the page's final URL, stripped of query and
/// fragment, and kept when the site pattern matches from the start.
pub fn collect_article_urls(body: &str, base: &Url, pattern: &Regex) -> Vec<String> {
    let mut urls = Vec::new();
    for href in html::extract_links(body) {
        let href = href.trim();
        if href.is_empty() {
            continue;
        }
        let Some(canonical) = url_utils::canonicalize_href(base, href) else {
            continue;
        };
        if prefix_matches(pattern, &canonical) {
            urls.push(canonical);
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{harness, notifying_site};

    const LISTING: &str = r#"
        <html><body>
            <a href="/story/1">A story</a>
            <a href="/other/2">Not a story</a>
            <a href="">Empty</a>
            <a href="/story/3?ref=frontpage#top">Another story</a>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://news.example/frontpage").unwrap()
    }

    #[test]
    fn test_collect_matches_only_article_pattern() {
        let pattern = Regex::new("^https://news.example/story/").unwrap();
        let urls = collect_article_urls(LISTING, &base(), &pattern);
        assert_eq!(
            urls,
            vec![
                "https://news.example/story/1",
                "https://news.example/story/3",
            ]
        );
    }

    #[test]
    fn test_collect_keeps_repeated_links() {
        let page = r#"<a href="/story/1">teaser</a> <a href="/story/1">headline</a>"#;
        let pattern = Regex::new("^https://news.example/story/").unwrap();
        let urls = collect_article_urls(page, &base(), &pattern);
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_schedule_enqueues_one_job_per_match() {
        let harness = harness(vec![notifying_site(1)]);
        let site = harness.ctx.site(1).unwrap();

        let scheduled = schedule_from_listing(&harness.ctx, site, LISTING, &base())
            .await
            .unwrap();
        assert_eq!(scheduled, 2);
        assert_eq!(harness.queue.lane_len(Lane::Main), 2);

        assert_eq!(
            harness.queue.pop(Lane::Main),
            Some(Job::ArticleFetch {
                site_id: 1,
                url: "https://news.example/story/1".to_string(),
                prune_if_unchanged: false,
                prune_if_url_mismatch: false,
            })
        );
    }

    #[tokio::test]
    async fn test_no_matching_links_is_an_error() {
        let harness = harness(vec![notifying_site(1)]);
        let site = harness.ctx.site(1).unwrap();
        let page = r#"<a href="/other/2">Nope</a>"#;

        let result = schedule_from_listing(&harness.ctx, site, page, &base()).await;
        assert!(matches!(result, Err(AppError::NoArticlesFound { .. })));
        assert!(harness.queue.is_empty());
    }
}
