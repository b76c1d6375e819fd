//! Pattern scoring for knowledge entries.
//!
//! For every pattern of an entry:
//! - a literal substring hit adds `2 * base_confidence`;
//! - word overlap adds `matched / total * base_confidence`, where a pattern
//!   word matches when it contains, or is contained in, any message word.
//!
//! Word containment is bidirectional on purpose: `"ab"` matches `"cab"` and
//! `"a"` matches `"pain"`. Tightening it changes which messages are answered
//! locally.

use crate::engine::core::intent::Intent;
use crate::engine::core::text::words;
use crate::engine::knowledge::entry::KnowledgeEntry;

/// Score of one entry against one message.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EntryScore {
    /// Summed pattern contributions, multiplier applied.
    pub score: f64,
    /// Number of patterns found verbatim in the message.
    pub literal_hits: usize,
}

/// Score an entry against a lower-cased message and its words.
#[must_use]
pub fn score_entry(
    entry: &KnowledgeEntry,
    lowered: &str,
    message_words: &[&str],
    safety_multiplier: f64,
) -> EntryScore {
    let base = entry.base_confidence();
    let mut raw = 0.0;
    let mut literal_hits = 0;

    for pattern in entry.patterns() {
        if lowered.contains(pattern.as_str()) {
            raw += 2.0 * base;
            literal_hits += 1;
        }
        raw += word_overlap(pattern, message_words) * base;
    }

    let score = if entry.category() == Intent::Safety {
        raw * safety_multiplier
    } else {
        raw
    };

    EntryScore {
        score,
        literal_hits,
    }
}

/// Fraction of pattern words found in the message, in `[0, 1]`.
#[must_use]
pub fn word_overlap(pattern: &str, message_words: &[&str]) -> f64 {
    let mut total = 0_u32;
    let mut matched = 0_u32;
    for pattern_word in words(pattern) {
        total += 1;
        if message_words
            .iter()
            .any(|word| word.contains(pattern_word) || pattern_word.contains(word))
        {
            matched += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        f64::from(matched) / f64::from(total)
    }
}
