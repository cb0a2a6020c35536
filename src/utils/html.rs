// src/utils/html.rs

//! HTML extraction primitives.
//!
//! The rest of the pipeline treats these as black boxes: link extraction
//! returns raw `href` attribute values, selector matching returns zero, one,
//! or many text results.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};

/// Parse a CSS selector into a matcher.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))
}

/// Raw `href` attribute values of every hyperlink in the document.
///
/// Values are returned untrimmed and unresolved; anchors without an `href`
/// are skipped.
pub fn extract_links(html: &str) -> Vec<String> {
    let anchor = Selector::parse("a").expect("anchor selector is valid");
    let document = Html::parse_document(html);
    document
        .select(&anchor)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

/// Whitespace-normalized text of every element matching the selector.
pub fn extract_text(html: &str, selector: &Selector) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .collect()
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
