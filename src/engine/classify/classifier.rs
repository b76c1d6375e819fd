//! Rule-based message classifier.

use std::collections::BTreeSet;

use regex::Regex;
use serde::Serialize;

use crate::engine::classify::keywords::{self, COMPLEX_TRIGGERS, FAMILIES};
use crate::engine::core::config::ClassifierConfig;
use crate::engine::core::intent::{Intent, Urgency};

/// Generic coaching questions the knowledge store can usually answer even
/// when no keyword family fired with enough confidence.
const GENERIC_QUESTIONS: &[&str] = &[
    r"(?i)\bhow many sets\b",
    r"(?i)\bwhat exercises?\b",
    r"(?i)\bhow often\b",
    r"(?i)\bbest exercises?\b",
];

/// Result of classifying one message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageAnalysis {
    /// Raw input.
    pub original_message: String,
    /// Lower-cased input used for matching.
    pub lowered: String,
    /// First keyword family by priority, or general.
    pub intent: Intent,
    /// Every keyword family that matched.
    pub topics: BTreeSet<Intent>,
    /// High iff the intent is safety.
    pub urgency: Urgency,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Whether the message is better served by an external provider.
    pub needs_external: bool,
}

impl MessageAnalysis {
    /// Whether the message was classified as safety-related.
    #[must_use]
    pub fn is_safety(&self) -> bool {
        self.intent == Intent::Safety
    }
}

/// Deterministic keyword classifier.
pub struct MessageClassifier {
    config: ClassifierConfig,
    generic_questions: Vec<Regex>,
}

impl MessageClassifier {
    /// Create a classifier.
    ///
    /// # Errors
    /// Returns an error if a built-in question pattern fails to compile.
    pub fn new(config: ClassifierConfig) -> Result<Self, regex::Error> {
        let generic_questions = GENERIC_QUESTIONS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            generic_questions,
        })
    }

    /// Classify a message.
    #[must_use]
    pub fn classify(&self, text: &str) -> MessageAnalysis {
        let lowered = text.to_lowercase();

        if lowered.trim().is_empty() {
            return MessageAnalysis {
                original_message: text.to_string(),
                lowered,
                intent: Intent::General,
                topics: BTreeSet::new(),
                urgency: Urgency::Normal,
                confidence: 0.0,
                needs_external: true,
            };
        }

        if keywords::matches_safety(&lowered) {
            return MessageAnalysis {
                original_message: text.to_string(),
                lowered,
                intent: Intent::Safety,
                topics: BTreeSet::from([Intent::Safety]),
                urgency: Urgency::High,
                confidence: Intent::Safety.family_confidence(),
                needs_external: false,
            };
        }

        let topics: BTreeSet<Intent> = FAMILIES
            .iter()
            .filter(|(_, words)| keywords::matches_family(&lowered, words))
            .map(|(intent, _)| *intent)
            .collect();
        // BTreeSet iterates in priority order, so the first topic wins.
        let intent = topics.iter().next().copied().unwrap_or(Intent::General);
        let confidence = intent.family_confidence();

        let needs_external = text.chars().count() > self.config.long_message_chars
            || COMPLEX_TRIGGERS.iter().any(|trigger| lowered.contains(trigger))
            || confidence < self.config.external_confidence_floor;

        MessageAnalysis {
            original_message: text.to_string(),
            lowered,
            intent,
            topics,
            urgency: Urgency::Normal,
            confidence,
            needs_external,
        }
    }

    /// Whether the analysis may be answered from the knowledge store.
    #[must_use]
    pub fn is_locally_handleable(&self, analysis: &MessageAnalysis) -> bool {
        analysis.is_safety()
            || (analysis.confidence >= self.config.local_confidence_floor
                && analysis.intent.is_coaching_topic())
            || self.is_generic_question(&analysis.lowered)
    }

    /// Whether the text is one of the generic coaching questions.
    #[must_use]
    pub fn is_generic_question(&self, text: &str) -> bool {
        self.generic_questions.iter().any(|re| re.is_match(text))
    }
}
