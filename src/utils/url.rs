// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve an `href` against the page it was found on and canonicalize it.
///
/// The base must be the *final* URL of the fetched page (after redirects).
/// Query string and fragment are stripped so that tracking parameters and
/// in-page anchors do not multiply revisions of the same article.
///
/// Returns `None` for hrefs that cannot be resolved to a URL at all.
pub fn canonicalize_href(base: &Url, href: &str) -> Option<String> {
    let mut resolved = base.join(href).ok()?;
    resolved.set_query(None);
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://news.example/frontpage/latest").unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(
            canonicalize_href(&base(), "story.html"),
            Some("https://news.example/frontpage/story.html".to_string())
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(
            canonicalize_href(&base(), "/story/1"),
            Some("https://news.example/story/1".to_string())
        );
    }

    #[test]
    fn test_absolute_url_passes_through() {
        assert_eq!(
            canonicalize_href(&base(), "https://other.example/x"),
            Some("https://other.example/x".to_string())
        );
    }

    #[test]
    fn test_query_and_fragment_are_stripped() {
        assert_eq!(
            canonicalize_href(&base(), "/story/1?ref=frontpage&utm=x#comments"),
            Some("https://news.example/story/1".to_string())
        );
    }

    #[test]
    fn test_unresolvable_href() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        // A cannot-be-a-base URL cannot resolve relative references.
        assert_eq!(canonicalize_href(&base, "story.html"), None);
    }
}
