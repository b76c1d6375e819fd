//! Knowledge entry model with validation and usage counters.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::core::errors::{EngineError, EngineResult};
use crate::engine::core::ids::EntryId;
use crate::engine::core::intent::Intent;

/// A scored knowledge entry.
///
/// Usage counters are atomics updated outside any write lock. Concurrent
/// matches may race on `last_used_at`; both fields are reporting-only.
#[derive(Debug)]
pub struct KnowledgeEntry {
    id: EntryId,
    patterns: Vec<String>,
    response: String,
    base_confidence: f64,
    category: Intent,
    use_count: AtomicU64,
    last_used_ms: AtomicI64,
}

impl KnowledgeEntry {
    /// Create a validated entry. Patterns are trimmed and lower-cased.
    ///
    /// # Errors
    /// Returns an error if there is no non-empty pattern, the response is
    /// empty, or the confidence is outside `(0, 1]`.
    pub fn new(
        patterns: impl IntoIterator<Item = impl AsRef<str>>,
        response: impl Into<String>,
        category: Intent,
        base_confidence: f64,
    ) -> EngineResult<Self> {
        Self::with_id(EntryId::new(), patterns, response, category, base_confidence)
    }

    fn with_id(
        id: EntryId,
        patterns: impl IntoIterator<Item = impl AsRef<str>>,
        response: impl Into<String>,
        category: Intent,
        base_confidence: f64,
    ) -> EngineResult<Self> {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        if patterns.is_empty() {
            return Err(EngineError::InvalidKnowledgeEntry(
                "at least one non-empty pattern is required".to_string(),
            ));
        }

        let response = response.into();
        if response.trim().is_empty() {
            return Err(EngineError::InvalidKnowledgeEntry(
                "response is empty".to_string(),
            ));
        }

        if !(base_confidence > 0.0 && base_confidence <= 1.0) {
            return Err(EngineError::InvalidKnowledgeEntry(format!(
                "confidence must be within (0, 1], got {base_confidence}"
            )));
        }

        Ok(Self {
            id,
            patterns,
            response,
            base_confidence,
            category,
            use_count: AtomicU64::new(0),
            last_used_ms: AtomicI64::new(0),
        })
    }

    /// Rebuild an entry from an exported record, keeping its id and counters.
    ///
    /// # Errors
    /// Returns an error if the record fails validation.
    pub fn from_record(record: KnowledgeRecord) -> EngineResult<Self> {
        let entry = Self::with_id(
            record.id.unwrap_or_default(),
            record.patterns,
            record.response,
            record.category,
            record.base_confidence,
        )?;
        entry.use_count.store(record.use_count, Ordering::Relaxed);
        if let Some(last_used) = record.last_used_at {
            entry
                .last_used_ms
                .store(last_used.timestamp_millis(), Ordering::Relaxed);
        }
        Ok(entry)
    }

    /// Entry identifier.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    /// Lower-cased patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Response text.
    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Authored confidence.
    #[must_use]
    pub const fn base_confidence(&self) -> f64 {
        self.base_confidence
    }

    /// Category.
    #[must_use]
    pub const fn category(&self) -> Intent {
        self.category
    }

    /// Number of accepted matches.
    #[must_use]
    pub fn use_count(&self) -> u64 {
        self.use_count.load(Ordering::Relaxed)
    }

    /// Time of the last accepted match.
    #[must_use]
    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        match self.last_used_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    /// Record an accepted match.
    pub fn record_use(&self, now: DateTime<Utc>) {
        self.use_count.fetch_add(1, Ordering::Relaxed);
        self.last_used_ms
            .store(now.timestamp_millis(), Ordering::Relaxed);
    }

    /// Snapshot as a serializable record.
    #[must_use]
    pub fn to_record(&self) -> KnowledgeRecord {
        KnowledgeRecord {
            id: Some(self.id),
            patterns: self.patterns.clone(),
            response: self.response.clone(),
            base_confidence: self.base_confidence,
            category: self.category,
            use_count: self.use_count(),
            last_used_at: self.last_used_at(),
        }
    }
}

/// Plain structured form of an entry, used for listing, export and import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Identifier; a fresh one is assigned on import when absent.
    #[serde(default)]
    pub id: Option<EntryId>,
    /// Patterns.
    pub patterns: Vec<String>,
    /// Response text.
    pub response: String,
    /// Authored confidence in `(0, 1]`.
    pub base_confidence: f64,
    /// Category.
    pub category: Intent,
    /// Number of accepted matches.
    #[serde(default)]
    pub use_count: u64,
    /// Time of the last accepted match.
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}
