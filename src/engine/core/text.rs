//! Text normalization helpers shared by the cache, classifier and scorer.

/// Normalize a message for cache keys: trim, lowercase, collapse whitespace.
#[must_use]
pub fn normalize_message(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut prev_space = false;

    for ch in text.trim().chars() {
        if ch.is_whitespace() {
            if !prev_space {
                normalized.push(' ');
                prev_space = true;
            }
        } else {
            for lower in ch.to_lowercase() {
                normalized.push(lower);
            }
            prev_space = false;
        }
    }

    normalized
}

/// Split text into words, stripping surrounding punctuation.
///
/// Empty fragments are dropped: an empty word would be contained in every
/// other word and match everything.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
}
