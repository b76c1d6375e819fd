//! In-memory knowledge store with scored lookup.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::engine::classify::MessageAnalysis;
use crate::engine::core::config::KnowledgeConfig;
use crate::engine::core::errors::{EngineError, EngineResult};
use crate::engine::core::ids::EntryId;
use crate::engine::core::intent::Intent;
use crate::engine::core::text::words;
use crate::engine::knowledge::builtin::BUILTIN_ENTRIES;
use crate::engine::knowledge::entry::{KnowledgeEntry, KnowledgeRecord};
use crate::engine::knowledge::scoring::{EntryScore, score_entry};

/// Accepted knowledge match.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KnowledgeMatch {
    /// Winning entry.
    pub entry_id: EntryId,
    /// Category of the winning entry.
    pub category: Intent,
    /// Response text of the winning entry.
    pub response: String,
    /// Winning score.
    pub score: f64,
    /// Number of patterns found verbatim in the message.
    pub literal_hits: usize,
    /// Confidence to attach to the answer.
    pub confidence: f64,
}

/// Scored, mutable collection of knowledge entries.
pub struct KnowledgeStore {
    config: KnowledgeConfig,
    entries: RwLock<Vec<KnowledgeEntry>>,
}

impl KnowledgeStore {
    /// Create an empty store.
    #[must_use]
    pub const fn empty(config: KnowledgeConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Create a store holding the built-in table.
    ///
    /// # Errors
    /// Returns an error if a built-in entry fails validation.
    pub fn with_builtin(config: KnowledgeConfig) -> EngineResult<Self> {
        let entries = BUILTIN_ENTRIES
            .iter()
            .map(|builtin| {
                KnowledgeEntry::new(
                    builtin.patterns.iter().copied(),
                    builtin.response,
                    builtin.category,
                    builtin.confidence,
                )
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self {
            config,
            entries: RwLock::new(entries),
        })
    }

    /// Find the best entry for a classified message.
    ///
    /// Every entry is scored; safety entries carry the safety multiplier. The
    /// highest score wins, earlier entries win ties, and the winner must beat
    /// the acceptance threshold. Accepting a match records a use.
    ///
    /// # Errors
    /// Returns an error if the entry lock is poisoned.
    pub fn score(&self, analysis: &MessageAnalysis) -> EngineResult<Option<KnowledgeMatch>> {
        let entries = self.read()?;
        let message_words: Vec<&str> = words(&analysis.lowered).collect();

        let mut best: Option<(&KnowledgeEntry, EntryScore)> = None;
        for entry in &*entries {
            let scored = score_entry(
                entry,
                &analysis.lowered,
                &message_words,
                self.config.safety_multiplier,
            );
            if best.is_none_or(|(_, top)| scored.score > top.score) {
                best = Some((entry, scored));
            }
        }

        let Some((entry, scored)) = best else {
            return Ok(None);
        };
        if scored.score <= self.config.acceptance_threshold {
            debug!(
                "Best knowledge score {:.3} below threshold {:.3}",
                scored.score, self.config.acceptance_threshold
            );
            return Ok(None);
        }

        entry.record_use(Utc::now());
        debug!(
            "Matched knowledge entry {} ({}) with score {:.3}",
            entry.id(),
            entry.category(),
            scored.score
        );

        Ok(Some(KnowledgeMatch {
            entry_id: entry.id(),
            category: entry.category(),
            response: entry.response().to_string(),
            score: scored.score,
            literal_hits: scored.literal_hits,
            confidence: match_confidence(entry, scored),
        }))
    }

    /// Add an entry at the end of the iteration order.
    ///
    /// # Errors
    /// Returns an error if the entry is invalid or the lock is poisoned.
    pub fn add_entry(
        &self,
        patterns: Vec<String>,
        response: String,
        category: Intent,
        confidence: f64,
    ) -> EngineResult<EntryId> {
        let entry = KnowledgeEntry::new(patterns, response, category, confidence)?;
        let id = entry.id();
        self.write()?.push(entry);
        Ok(id)
    }

    /// Remove an entry.
    ///
    /// # Errors
    /// Returns an error if the id is unknown or the lock is poisoned.
    pub fn remove_entry(&self, id: EntryId) -> EngineResult<()> {
        let mut entries = self.write()?;
        let position = entries
            .iter()
            .position(|entry| entry.id() == id)
            .ok_or_else(|| EngineError::KnowledgeEntryNotFound(id.to_string()))?;
        entries.remove(position);
        Ok(())
    }

    /// Snapshot of every entry with its usage counters.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned.
    pub fn records(&self) -> EngineResult<Vec<KnowledgeRecord>> {
        Ok(self.read()?.iter().map(KnowledgeEntry::to_record).collect())
    }

    /// Number of entries.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.read()?.len())
    }

    /// Whether the store holds no entries.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Export every entry as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails or the lock is poisoned.
    pub fn export_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(&self.records()?)?)
    }

    /// Append entries from a JSON dump produced by [`Self::export_json`].
    ///
    /// Either every record is imported or none is.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed, a record is invalid, an id
    /// already exists, or the lock is poisoned.
    pub fn import_json(&self, json: &str) -> EngineResult<usize> {
        let records: Vec<KnowledgeRecord> = serde_json::from_str(json)?;
        let imported = records
            .into_iter()
            .map(KnowledgeEntry::from_record)
            .collect::<EngineResult<Vec<_>>>()?;

        let mut entries = self.write()?;
        for (index, entry) in imported.iter().enumerate() {
            let clash = entries.iter().any(|existing| existing.id() == entry.id())
                || imported[..index].iter().any(|prev| prev.id() == entry.id());
            if clash {
                return Err(EngineError::InvalidKnowledgeEntry(format!(
                    "duplicate entry id {}",
                    entry.id()
                )));
            }
        }

        let count = imported.len();
        entries.extend(imported);
        Ok(count)
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Vec<KnowledgeEntry>>> {
        self.entries
            .read()
            .map_err(|_| EngineError::LockPoisoned("knowledge store"))
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Vec<KnowledgeEntry>>> {
        self.entries
            .write()
            .map_err(|_| EngineError::LockPoisoned("knowledge store"))
    }
}

/// Confidence of an accepted match.
///
/// A verbatim pattern hit earns the entry's authored confidence (capped by
/// half the score). Word overlap alone is weak evidence and is capped below
/// any sensible local-answer floor.
fn match_confidence(entry: &KnowledgeEntry, scored: EntryScore) -> f64 {
    let base = entry.base_confidence();
    let confidence = if scored.literal_hits > 0 {
        (scored.score / 2.0).min(base)
    } else {
        (scored.score / 2.0).min(base) * 0.5
    };
    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::MessageClassifier;
    use crate::engine::core::config::ClassifierConfig;

    fn store() -> KnowledgeStore {
        match KnowledgeStore::with_builtin(KnowledgeConfig::default()) {
            Ok(store) => store,
            Err(err) => panic!("built-in table must be valid: {err}"),
        }
    }

    fn analyze(text: &str) -> MessageAnalysis {
        match MessageClassifier::new(ClassifierConfig::default()) {
            Ok(classifier) => classifier.classify(text),
            Err(err) => panic!("built-in patterns must compile: {err}"),
        }
    }

    #[test]
    fn squat_question_matches_exercise_entry() {
        let found = store().score(&analyze("How do I do a proper squat?")).ok().flatten();
        let Some(found) = found else {
            panic!("expected a match");
        };
        assert_eq!(found.category, Intent::Exercise);
        assert!(found.response.contains("Squat"));
        assert!(found.confidence > 0.7);
    }

    #[test]
    fn safety_message_reaches_safety_entry() {
        let found = store().score(&analyze("chest pain during workout")).ok().flatten();
        assert_eq!(found.map(|m| m.category), Some(Intent::Safety));
    }

    #[test]
    fn literal_match_beats_safety_overlap() {
        let found = store().score(&analyze("a beginner plan please")).ok().flatten();
        assert_eq!(found.map(|m| m.category), Some(Intent::Planning));
    }

    #[test]
    fn safety_entry_competes_for_general_message() {
        let store = KnowledgeStore::empty(KnowledgeConfig::default());
        let rest = store.add_entry(
            vec!["rest day".to_string()],
            "Take it.".to_string(),
            Intent::Safety,
            0.9,
        );
        let overtraining = store.add_entry(
            vec!["overtraining".to_string()],
            "Back off.".to_string(),
            Intent::Exercise,
            0.9,
        );
        assert!(overtraining.is_ok());

        let analysis = analyze("should I take a rest day");
        assert_eq!(analysis.intent, Intent::General);
        let Some(found) = store.score(&analysis).ok().flatten() else {
            panic!("expected a match");
        };
        // (2 * 0.9 + 0.9) * 1.5 against 0.9 from "a" inside "overtraining".
        assert_eq!(Some(found.entry_id), rest.ok());
        assert_eq!(found.category, Intent::Safety);
        assert_eq!(found.literal_hits, 1);
        assert!((found.score - 4.05).abs() < 1e-9);
    }

    #[test]
    fn unrelated_words_produce_no_match() {
        let found = store().score(&analyze("zzzz qqqq xxxx")).ok().flatten();
        assert!(found.is_none());
    }

    #[test]
    fn acceptance_requires_exceeding_threshold() {
        let store = KnowledgeStore::empty(KnowledgeConfig::default());
        // One of two pattern words overlaps: 0.5 * 0.6 = 0.3, not above 0.3.
        let added = store.add_entry(
            vec!["kettlebell swing".to_string()],
            "Hinge, snap the hips.".to_string(),
            Intent::Exercise,
            0.6,
        );
        assert!(added.is_ok());
        let found = store.score(&analyze("swing")).ok().flatten();
        assert!(found.is_none());
    }

    #[test]
    fn ties_keep_the_first_entry() {
        let store = KnowledgeStore::empty(KnowledgeConfig::default());
        let first = store.add_entry(vec!["rowing".to_string()], "first".to_string(), Intent::Exercise, 0.8);
        let second = store.add_entry(vec!["rowing".to_string()], "second".to_string(), Intent::Exercise, 0.8);
        assert!(second.is_ok());
        let found = store.score(&analyze("rowing")).ok().flatten();
        assert_eq!(found.map(|m| m.entry_id), first.ok());
    }

    #[test]
    fn accepted_match_records_usage() {
        let store = store();
        let _ = store.score(&analyze("how much protein do I need"));
        let records = store.records().unwrap_or_default();
        let protein = records
            .iter()
            .find(|r| r.patterns.iter().any(|p| p == "how much protein"));
        assert_eq!(protein.map(|r| r.use_count), Some(1));
        assert!(protein.is_some_and(|r| r.last_used_at.is_some()));
    }

    #[test]
    fn overlap_only_match_has_low_confidence() {
        let store = KnowledgeStore::empty(KnowledgeConfig::default());
        let _ = store.add_entry(
            vec!["heavy deadlift".to_string()],
            "Brace hard.".to_string(),
            Intent::Exercise,
            0.9,
        );
        let found = store.score(&analyze("deadlifts heavy days")).ok().flatten();
        assert!(found.is_some_and(|m| m.literal_hits == 0 && m.confidence <= 0.5));
    }

    #[test]
    fn remove_entry_and_unknown_id() {
        let store = store();
        let before = store.len().unwrap_or_default();
        let id = store.add_entry(vec!["foam roller".to_string()], "Roll slowly.".to_string(), Intent::Exercise, 0.8);
        let Ok(id) = id else {
            panic!("valid entry");
        };
        assert_eq!(store.len().unwrap_or_default(), before + 1);
        assert!(store.remove_entry(id).is_ok());
        assert_eq!(store.len().unwrap_or_default(), before);
        assert!(matches!(
            store.remove_entry(id),
            Err(EngineError::KnowledgeEntryNotFound(_))
        ));
    }

    #[test]
    fn export_then_import_into_empty_store() {
        let source = store();
        let json = source.export_json().unwrap_or_default();
        let target = KnowledgeStore::empty(KnowledgeConfig::default());
        assert_eq!(target.import_json(&json).ok(), source.len().ok());
        // Same ids again are rejected and nothing is appended.
        assert!(target.import_json(&json).is_err());
        assert_eq!(target.len().ok(), source.len().ok());
    }

    #[test]
    fn import_rejects_invalid_record() {
        let target = KnowledgeStore::empty(KnowledgeConfig::default());
        let json = r#"[{"patterns": [], "response": "x", "base_confidence": 0.5, "category": "general"}]"#;
        assert!(matches!(
            target.import_json(json),
            Err(EngineError::InvalidKnowledgeEntry(_))
        ));
        assert_eq!(target.is_empty().ok(), Some(true));
    }
}
