// src/pipeline/significance.rs

//! Fuzzy title-significance classifier.
//!
//! Decides whether two versions of an article title differ enough to notify
//! about. The comparison must stay cheap and tolerant of cosmetic churn:
//! whitespace and punctuation edits, counter updates in live articles
//! ("Foo: 42" vs "Foo: 43"), and word reordering. It is intolerant of real
//! rewording beyond a small budget.

/// Whether the change from `old` to `new` is worth a notification.
pub fn is_significant_title_change(old: &str, new: &str) -> bool {
    if is_bad_title(old) || is_bad_title(new) {
        return false;
    }

    let old_key = title_equality_key(old);
    let new_key = title_equality_key(new);

    if old_key.len().abs_diff(new_key.len()) > 1 {
        return true;
    }

    // Positional mismatch count over the zipped keys. Trailing elements of
    // the longer key are ignored here; only the length check above sees them.
    let mismatches = old_key
        .iter()
        .zip(new_key.iter())
        .filter(|(a, b)| a != b)
        .count();
    mismatches > 2
}

/// Live tickers relabel their titles constantly; never notify about them.
fn is_bad_title(title: &str) -> bool {
    title.trim().to_lowercase().starts_with("live:")
}

/// Reduce a title to a sorted character key.
///
/// Whitespace, ASCII punctuation, and ASCII digits are dropped, the rest is
/// upper-cased and sorted. Sorting makes the key insensitive to word order.
fn title_equality_key(title: &str) -> Vec<char> {
    let mut key: Vec<char> = title
        .split_whitespace()
        .collect::<String>()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && !c.is_ascii_digit())
        .collect();
    key.sort_unstable();
    key
}
