//! Text normalization and keyword extraction.
//!
//! Normalization lowercases the input and deletes every character outside
//! `[a-z0-9]` and whitespace. Deleted characters do not act as separators, so
//! `"ROI-driven"` normalizes to the single token `"roidriven"`.

use std::collections::HashMap;

/// Maximum number of keywords returned by [`extract_keywords`].
pub const MAX_KEYWORDS: usize = 10;

/// Tokens of this length or shorter are never keywords.
const MIN_KEYWORD_LEN: usize = 3;

/// Function words dropped by [`extract_keywords`].
pub const STOPWORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "and", "or", "but", "in", "with", "a", "an", "as", "are",
    "was", "were", "been", "be", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "this", "that",
];

/// Lowercase `text`, strip non-alphanumeric characters, and split on whitespace.
///
/// Empty input yields an empty vector.
pub fn normalize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Extract up to [`MAX_KEYWORDS`] keywords from `text`.
///
/// Tokens of length ≤ 3 and stopwords are discarded. The remainder is ranked
/// by descending frequency; ties keep first-seen order.
///
/// ```rust
/// use msme_core::text::extract_keywords;
///
/// let kw = extract_keywords("Solar panels and solar inverters for rural Kerala");
/// assert_eq!(kw[0], "solar");
/// assert!(!kw.contains(&"and".to_string()));
/// ```
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for token in normalize(text) {
        if token.len() <= MIN_KEYWORD_LEN || STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        let count = counts.entry(token.clone()).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order for equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(MAX_KEYWORDS);
    order
}
