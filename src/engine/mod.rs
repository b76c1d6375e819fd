//! Coaching engine: classification, local knowledge, caching, external
//! providers and the orchestrator that ties them together.

pub mod analytics;
pub mod cache;
pub mod classify;
pub mod core;
pub mod fallback;
pub mod knowledge;
pub mod orchestrator;
pub mod providers;

pub use analytics::{Analytics, AnalyticsSnapshot};
pub use cache::ResponseCache;
pub use classify::{MessageAnalysis, MessageClassifier};
pub use self::core::config::{CacheConfig, ClassifierConfig, EngineConfig, KnowledgeConfig, ProviderSettings};
pub use self::core::errors::{EngineError, EngineResult};
pub use self::core::ids::EntryId;
pub use self::core::intent::{Intent, Urgency};
pub use self::core::response::{CoachResponse, ProcessOptions, ResponseMetadata, ResponseSource};
pub use knowledge::{KnowledgeRecord, KnowledgeStore};
pub use orchestrator::CoachEngine;
pub use providers::{
    CompletionBackend, CompletionRequest, HttpCompletionBackend, ProviderConfig, ProviderError,
    ProviderKind, ProviderRegistry, ProviderStatus,
};
