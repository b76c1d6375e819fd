//! Message routing: cache, classification, knowledge, providers, fallbacks.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::engine::analytics::{Analytics, AnalyticsSnapshot, Outcome};
use crate::engine::cache::ResponseCache;
use crate::engine::classify::{MessageAnalysis, MessageClassifier};
use crate::engine::core::config::EngineConfig;
use crate::engine::core::errors::{EngineError, EngineResult};
use crate::engine::core::ids::EntryId;
use crate::engine::core::intent::{Intent, Urgency};
use crate::engine::core::response::{CoachResponse, ProcessOptions, ResponseSource};
use crate::engine::fallback;
use crate::engine::knowledge::{KnowledgeRecord, KnowledgeStore};
use crate::engine::providers::{
    CompletionBackend, HttpCompletionBackend, ProviderError, ProviderRegistry, ProviderStatus,
    prompt,
};

/// Confidence attached to provider answers.
pub const AI_API_CONFIDENCE: f64 = 0.8;

/// The coaching engine. Construct once and share behind an `Arc`.
pub struct CoachEngine {
    config: EngineConfig,
    classifier: MessageClassifier,
    knowledge: KnowledgeStore,
    cache: ResponseCache,
    providers: ProviderRegistry,
    backend: Arc<dyn CompletionBackend>,
    analytics: Analytics,
}

impl CoachEngine {
    /// Create an engine that reaches providers over HTTP.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, the knowledge import
    /// fails, or the HTTP client cannot be built.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let backend = Arc::new(HttpCompletionBackend::new(&config.providers)?);
        Self::with_backend(config, backend)
    }

    /// Create an engine with a custom completion backend.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the knowledge
    /// import fails.
    pub fn with_backend(
        config: EngineConfig,
        backend: Arc<dyn CompletionBackend>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let classifier = MessageClassifier::new(config.classifier.clone())
            .map_err(|err| EngineError::InvalidConfig(err.to_string()))?;
        let knowledge = KnowledgeStore::with_builtin(config.knowledge.clone())?;
        if let Some(path) = &config.knowledge.import_path {
            let json = std::fs::read_to_string(path)?;
            let imported = knowledge.import_json(&json)?;
            info!("Imported {imported} knowledge entries from {}", path.display());
        }
        let cache = ResponseCache::new(config.cache.clone());
        let providers = ProviderRegistry::new(config.providers.providers.clone());

        info!(
            "Coach engine ready: {} knowledge entries, {} providers",
            knowledge.len()?,
            providers.len()
        );

        Ok(Self {
            config,
            classifier,
            knowledge,
            cache,
            providers,
            backend,
            analytics: Analytics::new(),
        })
    }

    /// Answer a message. Never fails and never panics.
    pub async fn process_message(
        &self,
        message: &str,
        user_id: &str,
        options: ProcessOptions,
    ) -> CoachResponse {
        let started = Instant::now();
        self.analytics.record_request(user_id);

        let span = info_span!("process_message", user = %user_id);
        let outcome = AssertUnwindSafe(self.route(message, options))
            .catch_unwind()
            .instrument(span)
            .await;

        let mut response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!("Recovered from engine error: {err}");
                self.recover(message, "internal_error")
            }
            Err(_) => {
                warn!("Recovered from panic while processing a message");
                self.recover(message, "internal_panic")
            }
        };

        let elapsed = started.elapsed().as_millis();
        response.metadata.processing_time_ms = Some(u64::try_from(elapsed).unwrap_or(u64::MAX));
        response
    }

    async fn route(&self, message: &str, options: ProcessOptions) -> EngineResult<CoachResponse> {
        if message.trim().is_empty() {
            debug!("Empty message, answering with capabilities");
            self.analytics.record(Outcome::Fallback);
            let mut response = fallback::local_fallback()
                .with_classification(Intent::General, Urgency::Normal)
                .with_error_code("empty_input");
            response.confidence = 0.0;
            return Ok(response);
        }

        if !options.bypass_cache {
            if let Some(cached) = self.cache.get(message) {
                debug!("Cache hit for message");
                self.analytics.record(Outcome::CacheHit);
                return Ok(cached.as_cache_hit());
            }
        }

        let analysis = self.classifier.classify(message);
        debug!(
            "Classified message as {} (confidence {:.2}, needs external: {})",
            analysis.intent, analysis.confidence, analysis.needs_external
        );

        if analysis.is_safety() {
            let response = self.safety_response(&analysis)?;
            self.cache.put(message, &response);
            self.analytics.record(Outcome::Local);
            return Ok(response);
        }

        if !options.force_external && self.classifier.is_locally_handleable(&analysis) {
            if let Some(response) = self.local_response(&analysis)? {
                self.cache.put(message, &response);
                self.analytics.record(Outcome::Local);
                return Ok(response);
            }
        }

        let response = self.external_response(&analysis).await;
        self.cache.put(message, &response);
        Ok(response)
    }

    fn safety_response(&self, analysis: &MessageAnalysis) -> EngineResult<CoachResponse> {
        let response = match self
            .knowledge
            .score(analysis)?
            .filter(|found| found.category == Intent::Safety)
        {
            Some(found) => CoachResponse::new(
                found.response,
                ResponseSource::SafetyProtocol,
                found.confidence.max(analysis.confidence),
            )
            .with_entry(found.entry_id),
            None => fallback::safety_protocol(),
        };
        info!("Answered safety message locally");
        Ok(response.with_classification(analysis.intent, analysis.urgency))
    }

    fn local_response(&self, analysis: &MessageAnalysis) -> EngineResult<Option<CoachResponse>> {
        let Some(found) = self.knowledge.score(analysis)? else {
            return Ok(None);
        };
        if found.confidence <= self.config.knowledge.response_confidence_floor {
            debug!(
                "Knowledge match confidence {:.2} too low, escalating",
                found.confidence
            );
            return Ok(None);
        }

        Ok(Some(
            CoachResponse::new(found.response, ResponseSource::LocalKnowledge, found.confidence)
                .with_entry(found.entry_id)
                .with_classification(analysis.intent, analysis.urgency),
        ))
    }

    async fn external_response(&self, analysis: &MessageAnalysis) -> CoachResponse {
        let Some(provider) = self.providers.reserve() else {
            debug!("No provider available, answering with capabilities");
            self.analytics.record(Outcome::Fallback);
            return fallback::local_fallback()
                .with_classification(analysis.intent, analysis.urgency);
        };

        info!("Escalating {} message to provider {}", analysis.intent, provider.name);
        let request = prompt::build_request(analysis, &self.config.providers);
        let call = self.backend.complete(&provider, &request);
        let result = match tokio::time::timeout(self.config.providers.request_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        };

        match result {
            Ok(content) => {
                self.analytics.record(Outcome::Api);
                CoachResponse::new(content, ResponseSource::AiApi, AI_API_CONFIDENCE)
                    .with_provider(provider.name)
                    .with_classification(analysis.intent, analysis.urgency)
            }
            Err(err) => {
                warn!("Provider {} failed: {err}", provider.name);
                self.analytics.record_provider_failure();
                self.analytics.record(Outcome::Fallback);
                fallback::local_fallback()
                    .with_error_code(err.code())
                    .with_classification(analysis.intent, analysis.urgency)
            }
        }
    }

    /// Safety messages keep their guidance even when the pipeline fails.
    fn recover(&self, message: &str, code: &str) -> CoachResponse {
        self.analytics.record(Outcome::Error);
        let analysis = self.classifier.classify(message);
        if analysis.is_safety() {
            fallback::safety_protocol().with_error_code(code)
        } else {
            fallback::error_fallback()
                .with_error_code(code)
                .with_classification(analysis.intent, analysis.urgency)
        }
    }

    /// Snapshot of the request counters.
    #[must_use]
    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.analytics.snapshot()
    }

    /// Requests received from one user, blank ids counted as `anonymous`.
    #[must_use]
    pub fn requests_for_user(&self, user_id: &str) -> u64 {
        self.analytics.requests_for(user_id)
    }

    /// Add a knowledge entry.
    ///
    /// # Errors
    /// Returns an error if the entry is invalid.
    pub fn add_knowledge_entry(
        &self,
        patterns: Vec<String>,
        response: String,
        category: Intent,
        confidence: f64,
    ) -> EngineResult<EntryId> {
        let id = self
            .knowledge
            .add_entry(patterns, response, category, confidence)?;
        info!("Added {category} knowledge entry {id}");
        Ok(id)
    }

    /// Remove a knowledge entry.
    ///
    /// # Errors
    /// Returns an error if the id is unknown.
    pub fn remove_knowledge_entry(&self, id: EntryId) -> EngineResult<()> {
        self.knowledge.remove_entry(id)?;
        info!("Removed knowledge entry {id}");
        Ok(())
    }

    /// Every knowledge entry with usage counters.
    ///
    /// # Errors
    /// Returns an error if the store is unavailable.
    pub fn knowledge_entries(&self) -> EngineResult<Vec<KnowledgeRecord>> {
        self.knowledge.records()
    }

    /// Export the knowledge store as JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn export_knowledge(&self) -> EngineResult<String> {
        self.knowledge.export_json()
    }

    /// Import knowledge entries from JSON.
    ///
    /// # Errors
    /// Returns an error if the dump is malformed or invalid.
    pub fn import_knowledge(&self, json: &str) -> EngineResult<usize> {
        let imported = self.knowledge.import_json(json)?;
        info!("Imported {imported} knowledge entries");
        Ok(imported)
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Response cache cleared");
    }

    /// Number of resident cache entries.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Provider diagnostics.
    #[must_use]
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.providers.status()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::engine::core::config::ClassifierConfig;
    use crate::engine::providers::client::CompletionFuture;
    use crate::engine::providers::{CompletionRequest, ProviderConfig, ProviderKind};

    enum Script {
        Reply(&'static str),
        Fail(u16),
        Hang,
        Panic,
    }

    struct ScriptedBackend {
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CompletionBackend for ScriptedBackend {
        fn complete<'a>(
            &'a self,
            _provider: &'a ProviderConfig,
            _request: &'a CompletionRequest,
        ) -> CompletionFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                match &self.script {
                    Script::Reply(text) => Ok((*text).to_string()),
                    Script::Fail(status) => Err(ProviderError::Status(*status)),
                    Script::Hang => std::future::pending().await,
                    Script::Panic => panic!("scripted backend panic"),
                }
            })
        }
    }

    const GENERAL_QUESTION: &str = "Tell me about the history of the olympic games";
    const SQUAT_QUESTION: &str = "How do I do a proper squat?";

    fn scripted_provider() -> ProviderConfig {
        ProviderConfig::new(
            "scripted",
            ProviderKind::OpenAiCompatible,
            "http://localhost:9",
            "test-model",
        )
        .with_api_key("test-key")
    }

    fn engine_with(config: EngineConfig, backend: Arc<ScriptedBackend>) -> CoachEngine {
        match CoachEngine::with_backend(config, backend) {
            Ok(engine) => engine,
            Err(err) => panic!("engine must build: {err}"),
        }
    }

    fn scripted_engine(script: Script) -> (CoachEngine, Arc<ScriptedBackend>) {
        let backend = ScriptedBackend::new(script);
        let config = EngineConfig::new().with_provider(scripted_provider());
        (engine_with(config, backend.clone()), backend)
    }

    #[tokio::test]
    async fn technique_question_is_answered_locally() {
        let (engine, backend) = scripted_engine(Script::Reply("unused"));

        let response = engine
            .process_message(SQUAT_QUESTION, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::LocalKnowledge);
        assert!(response.confidence > 0.7);
        assert!(!response.from_cache);
        assert!(response.metadata.knowledge_entry_id.is_some());
        assert_eq!(response.metadata.intent, Some(Intent::Exercise));
        assert!(response.metadata.processing_time_ms.is_some());
        assert_eq!(backend.calls(), 0);
        assert_eq!(engine.analytics().local_hits, 1);
    }

    #[tokio::test]
    async fn safety_message_never_reaches_a_provider() {
        let (engine, backend) = scripted_engine(Script::Reply("unused"));
        let options = ProcessOptions {
            bypass_cache: true,
            force_external: true,
        };

        for message in [
            "I have sharp chest pain during my workout",
            "my knee hurts when I squat",
            "I feel dizzy after running",
            "I think I pulled a muscle in my back",
        ] {
            let response = engine.process_message(message, "u1", options).await;
            assert_eq!(response.source, ResponseSource::SafetyProtocol, "{message}");
            assert_eq!(response.metadata.urgency, Some(Urgency::High));
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn repeated_message_is_served_from_cache() {
        let (engine, _backend) = scripted_engine(Script::Reply("unused"));

        let first = engine
            .process_message(SQUAT_QUESTION, "u1", ProcessOptions::default())
            .await;
        let second = engine
            .process_message("  how do i do a PROPER squat?  ", "u2", ProcessOptions::default())
            .await;

        assert_eq!(second.source, ResponseSource::Cache);
        assert!(second.from_cache);
        assert_eq!(second.content, first.content);

        let snapshot = engine.analytics();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.unique_users, 2);
        assert_eq!(engine.requests_for_user("u1"), 1);
        assert_eq!(engine.requests_for_user("nobody"), 0);
    }

    #[tokio::test]
    async fn bypass_cache_recomputes() {
        let (engine, _backend) = scripted_engine(Script::Reply("unused"));

        engine
            .process_message(SQUAT_QUESTION, "u1", ProcessOptions::default())
            .await;
        let again = engine
            .process_message(SQUAT_QUESTION, "u1", ProcessOptions::bypass_cache())
            .await;

        assert_eq!(again.source, ResponseSource::LocalKnowledge);
        assert_eq!(engine.analytics().cache_hits, 0);
    }

    #[tokio::test]
    async fn open_question_goes_to_provider() {
        let (engine, backend) = scripted_engine(Script::Reply("The modern games began in 1896."));

        let response = engine
            .process_message(GENERAL_QUESTION, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::AiApi);
        assert_eq!(response.content, "The modern games began in 1896.");
        assert_eq!(response.provider.as_deref(), Some("scripted"));
        assert!((response.confidence - AI_API_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(backend.calls(), 1);
        assert_eq!(engine.analytics().api_hits, 1);
        assert_eq!(engine.cache_len(), 1);
    }

    #[tokio::test]
    async fn force_external_skips_knowledge() {
        let (engine, backend) = scripted_engine(Script::Reply("Sit back and drive through your heels."));

        let response = engine
            .process_message(SQUAT_QUESTION, "u1", ProcessOptions::force_external())
            .await;

        assert_eq!(response.source, ResponseSource::AiApi);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn no_provider_yields_local_fallback() {
        let backend = ScriptedBackend::new(Script::Reply("unused"));
        let engine = engine_with(EngineConfig::new(), backend.clone());

        let response = engine
            .process_message(GENERAL_QUESTION, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::LocalFallback);
        assert_eq!(response.content, fallback::LOCAL_FALLBACK);
        assert_eq!(backend.calls(), 0);
        assert_eq!(engine.analytics().fallbacks, 1);
    }

    fn needs_external(message: &str) -> bool {
        match MessageClassifier::new(ClassifierConfig::default()) {
            Ok(classifier) => classifier.classify(message).needs_external,
            Err(err) => panic!("built-in patterns must compile: {err}"),
        }
    }

    #[tokio::test]
    async fn long_unmatched_message_without_provider_falls_back() {
        let backend = ScriptedBackend::new(Script::Reply("unused"));
        let engine = engine_with(EngineConfig::new(), backend.clone());
        let message = "x".repeat(300);
        assert!(needs_external(&message));

        let response = engine
            .process_message(&message, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::LocalFallback);
        assert_eq!(response.metadata.intent, Some(Intent::General));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn explanatory_question_without_provider_falls_back() {
        let backend = ScriptedBackend::new(Script::Reply("unused"));
        let engine = engine_with(EngineConfig::new(), backend.clone());
        let message = "Explain how the olympic games started";
        assert!(needs_external(message));

        let response = engine
            .process_message(message, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::LocalFallback);
        assert_eq!(response.content, fallback::LOCAL_FALLBACK);
        assert_eq!(backend.calls(), 0);
        assert_eq!(engine.analytics().fallbacks, 1);
    }

    #[tokio::test]
    async fn everyday_words_do_not_trigger_safety_protocol() {
        let (engine, _backend) = scripted_engine(Script::Reply("Sure, go for it."));

        for message in [
            "What number of reps should I do for squats?",
            "Is Spain a good place for a training camp?",
        ] {
            let response = engine
                .process_message(message, "u1", ProcessOptions::default())
                .await;
            assert_ne!(response.source, ResponseSource::SafetyProtocol, "{message}");
            assert_eq!(response.metadata.intent, Some(Intent::Exercise), "{message}");
            assert_eq!(response.metadata.urgency, Some(Urgency::Normal));
        }
    }

    #[tokio::test]
    async fn safety_message_ignores_non_safety_winner() {
        let backend = ScriptedBackend::new(Script::Reply("unused"));
        let engine = engine_with(EngineConfig::new(), backend.clone());
        let added = engine.add_knowledge_entry(
            vec![
                "shin".to_string(),
                "shin hurts".to_string(),
                "sprint session".to_string(),
                "after every sprint".to_string(),
            ],
            "Shin splints usually settle with less running volume.".to_string(),
            Intent::Exercise,
            1.0,
        );
        assert!(added.is_ok());

        let response = engine
            .process_message(
                "my shin hurts after every sprint session",
                "u1",
                ProcessOptions::default(),
            )
            .await;

        assert_eq!(response.source, ResponseSource::SafetyProtocol);
        assert_eq!(response.content, fallback::SAFETY_PROTOCOL);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn provider_without_key_is_skipped() {
        let backend = ScriptedBackend::new(Script::Reply("unused"));
        let keyless = ProviderConfig::new(
            "keyless",
            ProviderKind::Ollama,
            "http://localhost:11434",
            "test-model",
        );
        let engine = engine_with(EngineConfig::new().with_provider(keyless), backend.clone());

        let response = engine
            .process_message(GENERAL_QUESTION, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::LocalFallback);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_charged_and_falls_back() {
        let (engine, backend) = scripted_engine(Script::Fail(503));

        let response = engine
            .process_message(GENERAL_QUESTION, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::LocalFallback);
        assert_eq!(response.metadata.error_code.as_deref(), Some("provider_status"));
        assert_eq!(backend.calls(), 1);
        assert_eq!(engine.provider_status()[0].current_usage, 1);

        let snapshot = engine.analytics();
        assert_eq!(snapshot.provider_failures, 1);
        assert_eq!(snapshot.fallbacks, 1);
    }

    #[tokio::test]
    async fn hanging_provider_times_out() {
        let backend = ScriptedBackend::new(Script::Hang);
        let config = EngineConfig::new()
            .with_provider(scripted_provider())
            .with_request_timeout(Duration::from_millis(200));
        let engine = engine_with(config, backend);

        let response = engine
            .process_message(GENERAL_QUESTION, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::LocalFallback);
        assert_eq!(response.metadata.error_code.as_deref(), Some("provider_timeout"));
        assert_eq!(engine.provider_status()[0].current_usage, 1);
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let (engine, _backend) = scripted_engine(Script::Panic);

        let response = engine
            .process_message(GENERAL_QUESTION, "u1", ProcessOptions::default())
            .await;

        assert_eq!(response.source, ResponseSource::Error);
        assert_eq!(response.metadata.error_code.as_deref(), Some("internal_panic"));
        assert!(
            fallback::MOTIVATIONAL_QUOTES
                .iter()
                .any(|quote| response.content.contains(quote))
        );
        assert_eq!(engine.analytics().errors, 1);
    }

    #[tokio::test]
    async fn empty_message_gets_capabilities() {
        let (engine, backend) = scripted_engine(Script::Reply("unused"));

        for message in ["", "   ", "\n\t"] {
            let response = engine
                .process_message(message, "u1", ProcessOptions::default())
                .await;
            assert_eq!(response.source, ResponseSource::LocalFallback);
            assert!(response.confidence.abs() < f64::EPSILON);
            assert_eq!(response.metadata.error_code.as_deref(), Some("empty_input"));
        }
        assert_eq!(backend.calls(), 0);
        assert_eq!(engine.cache_len(), 0);
    }

    #[tokio::test]
    async fn analytics_before_any_request() {
        let (engine, _backend) = scripted_engine(Script::Reply("unused"));

        let snapshot = engine.analytics();
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.unique_users, 0);
        assert!(snapshot.local_knowledge_rate.abs() < f64::EPSILON);
        assert!(snapshot.cache_hit_rate.abs() < f64::EPSILON);
        assert!(snapshot.error_rate.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn random_input_always_gets_a_response() {
        const POOL: &[&str] = &[
            "a", "z", " ", "\n", "\t", "\0", "\u{7}", "\u{1b}[31m", "é", "💪", "?", "!",
            "squat ", "pain ", "protein ", "plan ", "explain how ", "how many sets ",
            "motivation ", "HELLO ",
        ];

        let (engine, _backend) = scripted_engine(Script::Reply("scripted answer"));
        let mut rng = StdRng::seed_from_u64(0x00c0_ac4b);

        for round in 0..1000 {
            let pieces = if round % 100 == 0 {
                2000
            } else {
                rng.gen_range(0..40)
            };
            let message: String = (0..pieces)
                .map(|_| POOL[rng.gen_range(0..POOL.len())])
                .collect();

            let response = engine
                .process_message(&message, "fuzz", ProcessOptions::default())
                .await;

            assert!(!response.content.is_empty());
            assert!((0.0..=1.0).contains(&response.confidence));
            assert_ne!(response.source, ResponseSource::Error, "{message:?}");
        }

        assert_eq!(engine.analytics().total_requests, 1000);
    }

    #[tokio::test]
    async fn knowledge_admin_round_trip() {
        let (engine, backend) = scripted_engine(Script::Reply("unused"));
        let before = engine.knowledge_entries().map(|entries| entries.len());

        let id = match engine.add_knowledge_entry(
            vec!["kettlebell swing".to_string()],
            "Hinge at the hips and let the bell float.".to_string(),
            Intent::Exercise,
            0.9,
        ) {
            Ok(id) => id,
            Err(err) => panic!("entry must be accepted: {err}"),
        };

        let response = engine
            .process_message("kettlebell swing workout tips", "u1", ProcessOptions::default())
            .await;
        assert_eq!(response.source, ResponseSource::LocalKnowledge);
        assert_eq!(response.metadata.knowledge_entry_id, Some(id));
        assert_eq!(backend.calls(), 0);

        let exported = match engine.export_knowledge() {
            Ok(json) => json,
            Err(err) => panic!("export must succeed: {err}"),
        };
        let (other, _) = scripted_engine(Script::Reply("unused"));
        let imported = other.import_knowledge(&exported);
        assert_eq!(
            imported.ok(),
            engine.knowledge_entries().ok().map(|entries| entries.len())
        );

        assert!(engine.remove_knowledge_entry(id).is_ok());
        assert!(engine.remove_knowledge_entry(id).is_err());
        assert_eq!(engine.knowledge_entries().map(|entries| entries.len()).ok(), before.ok());
    }

    #[tokio::test]
    async fn clear_cache_forgets_answers() {
        let (engine, _backend) = scripted_engine(Script::Reply("unused"));

        engine
            .process_message(SQUAT_QUESTION, "u1", ProcessOptions::default())
            .await;
        assert_eq!(engine.cache_len(), 1);

        engine.clear_cache();
        let response = engine
            .process_message(SQUAT_QUESTION, "u1", ProcessOptions::default())
            .await;
        assert_eq!(response.source, ResponseSource::LocalKnowledge);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let backend = ScriptedBackend::new(Script::Reply("unused"));
        let config = EngineConfig::new().with_cache_capacity(0);
        assert!(matches!(
            CoachEngine::with_backend(config, backend),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}
