//! Response model returned by [`crate::engine::CoachEngine::process_message`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::core::ids::EntryId;
use crate::engine::core::intent::{Intent, Urgency};

/// Where a response came from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Answered from the knowledge store.
    LocalKnowledge,
    /// Replayed from the response cache.
    Cache,
    /// Generated by an external provider.
    AiApi,
    /// Static capabilities message.
    LocalFallback,
    /// Static error message.
    Error,
    /// Safety guidance.
    SafetyProtocol,
}

impl ResponseSource {
    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalKnowledge => "local_knowledge",
            Self::Cache => "cache",
            Self::AiApi => "ai_api",
            Self::LocalFallback => "local_fallback",
            Self::Error => "error",
            Self::SafetyProtocol => "safety_protocol",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic details attached to a response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Wall-clock time spent in the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    /// Machine-readable reason for a degraded answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Classified intent, when classification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Classified urgency, when classification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    /// Knowledge entry that produced the answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_entry_id: Option<EntryId>,
}

/// Answer produced for a single message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoachResponse {
    /// Text shown to the user.
    pub content: String,
    /// Origin of the answer.
    pub source: ResponseSource,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Provider name for `ai_api` answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Whether the answer was replayed from the cache.
    pub from_cache: bool,
    /// Diagnostics.
    #[serde(default)]
    pub metadata: ResponseMetadata,
}

impl CoachResponse {
    /// Build a fresh (non-cached) response.
    #[must_use]
    pub fn new(content: impl Into<String>, source: ResponseSource, confidence: f64) -> Self {
        Self {
            content: content.into(),
            source,
            confidence: confidence.clamp(0.0, 1.0),
            provider: None,
            from_cache: false,
            metadata: ResponseMetadata::default(),
        }
    }

    /// Attach the provider name.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attach an error code.
    #[must_use]
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.metadata.error_code = Some(code.into());
        self
    }

    /// Attach the classification outcome.
    #[must_use]
    pub const fn with_classification(mut self, intent: Intent, urgency: Urgency) -> Self {
        self.metadata.intent = Some(intent);
        self.metadata.urgency = Some(urgency);
        self
    }

    /// Attach the knowledge entry that answered.
    #[must_use]
    pub const fn with_entry(mut self, id: EntryId) -> Self {
        self.metadata.knowledge_entry_id = Some(id);
        self
    }

    /// Copy of this response as replayed from the cache.
    #[must_use]
    pub fn as_cache_hit(&self) -> Self {
        let mut hit = self.clone();
        hit.source = ResponseSource::Cache;
        hit.from_cache = true;
        hit
    }
}

/// Per-call options for `process_message`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Skip the cache lookup (the result is still cached).
    #[serde(default)]
    pub bypass_cache: bool,
    /// Skip the knowledge store for non-safety messages.
    #[serde(default)]
    pub force_external: bool,
}

impl ProcessOptions {
    /// Options that skip the cache lookup.
    #[must_use]
    pub const fn bypass_cache() -> Self {
        Self {
            bypass_cache: true,
            force_external: false,
        }
    }

    /// Options that prefer an external provider.
    #[must_use]
    pub const fn force_external() -> Self {
        Self {
            bypass_cache: false,
            force_external: true,
        }
    }
}
