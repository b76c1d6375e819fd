//! Configuration for the coaching engine.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::engine::core::errors::{EngineError, EngineResult};
use crate::engine::providers::{ProviderConfig, ProviderKind};

/// Prefix shared by every environment variable the engine reads.
pub const ENV_PREFIX: &str = "COACHBOT_";

/// Top-level configuration for the engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Response cache settings.
    pub cache: CacheConfig,
    /// Classifier thresholds.
    pub classifier: ClassifierConfig,
    /// Knowledge scoring thresholds.
    pub knowledge: KnowledgeConfig,
    /// External provider settings.
    pub providers: ProviderSettings,
}

impl EngineConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an external provider. Registration order is selection order.
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.providers.push(provider);
        self
    }

    /// Set the cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl_seconds = ttl.as_secs();
        self
    }

    /// Set the cache capacity.
    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache.capacity = capacity;
        self
    }

    /// Set the provider request timeout, at millisecond precision.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.providers.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Build a config from `COACHBOT_*` environment variables on top of defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set but cannot be parsed, or if the
    /// resulting configuration is invalid.
    pub fn from_env() -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(ttl) = env_parse::<u64>("CACHE_TTL_SECS")? {
            config.cache.ttl_seconds = ttl;
        }
        if let Some(capacity) = env_parse::<usize>("CACHE_CAPACITY")? {
            config.cache.capacity = capacity;
        }
        if let Some(timeout) = env_parse::<u64>("PROVIDER_TIMEOUT_SECS")? {
            config.providers.request_timeout_ms = timeout.saturating_mul(1000);
        }
        config.knowledge.import_path = env_var("KNOWLEDGE_FILE").map(PathBuf::from);

        if let Some(key) = env_var("OPENAI_API_KEY") {
            let base_url =
                env_var("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".to_string());
            let model = env_var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
            let mut provider =
                ProviderConfig::new("openai", ProviderKind::OpenAiCompatible, base_url, model)
                    .with_api_key(key);
            if let Some(quota) = env_parse::<u32>("OPENAI_DAILY_QUOTA")? {
                provider = provider.with_daily_quota(quota);
            }
            config.providers.providers.push(provider);
        }

        if let Some(base_url) = env_var("OLLAMA_URL") {
            let model = env_var("OLLAMA_MODEL").unwrap_or_else(|| "mistral:7b-instruct-q8_0".to_string());
            let mut provider = ProviderConfig::new("ollama", ProviderKind::Ollama, base_url, model);
            if let Some(key) = env_var("OLLAMA_API_KEY") {
                provider = provider.with_api_key(key);
            }
            if let Some(quota) = env_parse::<u32>("OLLAMA_DAILY_QUOTA")? {
                provider = provider.with_daily_quota(quota);
            }
            config.providers.providers.push(provider);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> EngineResult<()> {
        if self.cache.capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "cache.capacity must be > 0".to_string(),
            ));
        }

        if self.cache.ttl_seconds == 0 {
            return Err(EngineError::InvalidConfig(
                "cache.ttl_seconds must be > 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.classifier.local_confidence_floor) {
            return Err(EngineError::InvalidConfig(
                "classifier.local_confidence_floor must be within [0, 1]".to_string(),
            ));
        }

        if self.knowledge.acceptance_threshold < 0.0 {
            return Err(EngineError::InvalidConfig(
                "knowledge.acceptance_threshold must be >= 0".to_string(),
            ));
        }

        if self.knowledge.safety_multiplier <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "knowledge.safety_multiplier must be > 0".to_string(),
            ));
        }

        if self.providers.request_timeout_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "providers.request_timeout_ms must be > 0".to_string(),
            ));
        }

        for provider in &self.providers.providers {
            if provider.name.trim().is_empty() {
                return Err(EngineError::InvalidConfig(
                    "provider name must not be empty".to_string(),
                ));
            }
            Url::parse(&provider.base_url)?;
        }

        Ok(())
    }
}

/// Response cache settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Lifetime of a cached response (seconds).
    pub ttl_seconds: u64,
    /// Maximum number of resident entries.
    pub capacity: usize,
}

impl CacheConfig {
    /// TTL as a [`Duration`].
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
            capacity: 100,
        }
    }
}

/// Classifier thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Messages longer than this (in characters) need an external provider.
    pub long_message_chars: usize,
    /// Below this confidence a message needs an external provider.
    pub external_confidence_floor: f64,
    /// Minimum classifier confidence to try the knowledge store for a
    /// coaching topic.
    pub local_confidence_floor: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            long_message_chars: 200,
            external_confidence_floor: 0.6,
            local_confidence_floor: 0.7,
        }
    }
}

/// Knowledge scoring thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// A best score must exceed this to count as a match.
    pub acceptance_threshold: f64,
    /// Score multiplier applied to safety entries.
    pub safety_multiplier: f64,
    /// A match must carry more than this confidence to be answered locally.
    pub response_confidence_floor: f64,
    /// Optional JSON dump imported after the built-in table at startup.
    pub import_path: Option<PathBuf>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.3,
            safety_multiplier: 1.5,
            response_confidence_floor: 0.7,
            import_path: None,
        }
    }
}

/// External provider settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Upper bound for a single provider call (milliseconds).
    pub request_timeout_ms: u64,
    /// Connection timeout (seconds).
    pub connect_timeout_secs: u64,
    /// Token budget for generated answers.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Providers in selection order.
    pub providers: Vec<ProviderConfig>,
}

impl ProviderSettings {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 15_000,
            connect_timeout_secs: 5,
            max_tokens: 400,
            temperature: 0.7,
            providers: Vec::new(),
        }
    }
}

fn env_var(suffix: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{suffix}"))
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: FromStr>(suffix: &str) -> EngineResult<Option<T>> {
    env_var(suffix)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                EngineError::InvalidConfig(format!("{ENV_PREFIX}{suffix} is not valid: {raw}"))
            })
        })
        .transpose()
}
