//! Registered external providers with daily quotas.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Length of a quota window.
pub const QUOTA_WINDOW_HOURS: i64 = 24;

/// Default daily request quota for a provider.
pub const DEFAULT_DAILY_QUOTA: u32 = 100;

/// Wire protocol spoken by a provider.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `POST {base_url}/chat/completions` with bearer auth.
    OpenAiCompatible,
    /// `POST {base_url}/api/generate`.
    Ollama,
}

impl ProviderKind {
    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "openai_compatible",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration and usage of one external provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name used in responses and diagnostics.
    pub name: String,
    /// Wire protocol.
    pub kind: ProviderKind,
    /// Base URL of the API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// API key. Never serialized.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Requests allowed per quota window.
    #[serde(default = "default_quota")]
    pub quota_per_day: u32,
    /// Requests charged in the current window.
    #[serde(default)]
    pub current_usage: u32,
    /// Start of the current window.
    #[serde(default = "Utc::now")]
    pub last_reset_at: DateTime<Utc>,
}

const fn default_quota() -> u32 {
    DEFAULT_DAILY_QUOTA
}

impl ProviderConfig {
    /// Create a provider with no API key and the default quota.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ProviderKind,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            quota_per_day: DEFAULT_DAILY_QUOTA,
            current_usage: 0,
            last_reset_at: Utc::now(),
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|k: &String| !k.trim().is_empty());
        self
    }

    /// Set the daily quota.
    #[must_use]
    pub const fn with_daily_quota(mut self, quota: u32) -> Self {
        self.quota_per_day = quota;
        self
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn api_key_present(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether the provider may be called right now (after any due reset).
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.api_key_present() && self.current_usage < self.quota_per_day
    }

    /// Start a new quota window if the current one is over.
    pub fn reset_if_due(&mut self, now: DateTime<Utc>) {
        if now.signed_duration_since(self.last_reset_at) >= Duration::hours(QUOTA_WINDOW_HOURS) {
            debug!("Resetting quota window for provider {}", self.name);
            self.current_usage = 0;
            self.last_reset_at = now;
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("quota_per_day", &self.quota_per_day)
            .field("current_usage", &self.current_usage)
            .field("last_reset_at", &self.last_reset_at)
            .finish()
    }
}

/// Diagnostic view of a provider.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderStatus {
    /// Provider name.
    pub name: String,
    /// Wire protocol.
    pub kind: ProviderKind,
    /// Model identifier.
    pub model: String,
    /// Whether an API key is configured.
    pub api_key_present: bool,
    /// Requests allowed per quota window.
    pub quota_per_day: u32,
    /// Requests charged in the current window.
    pub current_usage: u32,
    /// Start of the current window.
    pub last_reset_at: DateTime<Utc>,
    /// Whether the provider is selectable.
    pub available: bool,
}

/// Ordered provider list with quota bookkeeping.
///
/// Usage only grows within a window. Selection and charging share one
/// critical section, so concurrent callers cannot overrun a quota.
pub struct ProviderRegistry {
    providers: Mutex<Vec<ProviderConfig>>,
}

impl ProviderRegistry {
    /// Create a registry. Order is selection order.
    #[must_use]
    pub fn new(providers: Vec<ProviderConfig>) -> Self {
        for provider in &providers {
            info!(
                "Registered provider {} ({}, model {}, key present: {})",
                provider.name,
                provider.kind,
                provider.model,
                provider.api_key_present()
            );
        }
        Self {
            providers: Mutex::new(providers),
        }
    }

    /// First available provider, without charging it.
    #[must_use]
    pub fn select_provider(&self) -> Option<ProviderConfig> {
        self.select_provider_at(Utc::now())
    }

    /// First available provider as of `now`, without charging it.
    #[must_use]
    pub fn select_provider_at(&self, now: DateTime<Utc>) -> Option<ProviderConfig> {
        let mut providers = self.lock();
        refresh_windows(&mut providers, now);
        providers
            .iter()
            .find(|provider| provider.is_available())
            .cloned()
    }

    /// Select the first available provider and charge one request to it.
    ///
    /// The charge is made before the call happens and stands whatever the
    /// outcome of the call.
    #[must_use]
    pub fn reserve(&self) -> Option<ProviderConfig> {
        self.reserve_at(Utc::now())
    }

    /// [`Self::reserve`] as of `now`.
    #[must_use]
    pub fn reserve_at(&self, now: DateTime<Utc>) -> Option<ProviderConfig> {
        let mut providers = self.lock();
        refresh_windows(&mut providers, now);
        let provider = providers
            .iter_mut()
            .find(|provider| provider.is_available())?;
        provider.current_usage = provider.current_usage.saturating_add(1);
        debug!(
            "Charged provider {} ({}/{})",
            provider.name, provider.current_usage, provider.quota_per_day
        );
        Some(provider.clone())
    }

    /// Diagnostic listing in registration order.
    #[must_use]
    pub fn status(&self) -> Vec<ProviderStatus> {
        let mut providers = self.lock();
        refresh_windows(&mut providers, Utc::now());
        providers
            .iter()
            .map(|provider| ProviderStatus {
                name: provider.name.clone(),
                kind: provider.kind,
                model: provider.model.clone(),
                api_key_present: provider.api_key_present(),
                quota_per_day: provider.quota_per_day,
                current_usage: provider.current_usage,
                last_reset_at: provider.last_reset_at,
                available: provider.is_available(),
            })
            .collect()
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no provider is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usage counters only grow under the lock, so a poisoned guard is still
    /// consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<ProviderConfig>> {
        self.providers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn refresh_windows(providers: &mut [ProviderConfig], now: DateTime<Utc>) {
    for provider in providers {
        provider.reset_if_due(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, quota: u32) -> ProviderConfig {
        ProviderConfig::new(name, ProviderKind::OpenAiCompatible, "https://api.example.com/v1", "m")
            .with_api_key("secret")
            .with_daily_quota(quota)
    }

    #[test]
    fn empty_registry_selects_nothing() {
        let registry = ProviderRegistry::new(Vec::new());
        assert!(registry.is_empty());
        assert!(registry.select_provider().is_none());
        assert!(registry.reserve().is_none());
    }

    #[test]
    fn provider_without_key_is_skipped() {
        let keyless = ProviderConfig::new("keyless", ProviderKind::Ollama, "http://127.0.0.1:11434", "m");
        let registry = ProviderRegistry::new(vec![keyless, provider("keyed", 5)]);
        assert_eq!(registry.select_provider().map(|p| p.name), Some("keyed".to_string()));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let blank = ProviderConfig::new("blank", ProviderKind::Ollama, "http://127.0.0.1:11434", "m")
            .with_api_key("   ");
        assert!(!blank.api_key_present());
    }

    #[test]
    fn registration_order_wins() {
        let registry = ProviderRegistry::new(vec![provider("first", 5), provider("second", 5)]);
        assert_eq!(registry.reserve().map(|p| p.name), Some("first".to_string()));
    }

    #[test]
    fn reserve_charges_and_falls_through_on_exhaustion() {
        let registry = ProviderRegistry::new(vec![provider("first", 2), provider("second", 1)]);
        let picks: Vec<Option<String>> = (0..4).map(|_| registry.reserve().map(|p| p.name)).collect();
        assert_eq!(
            picks,
            vec![
                Some("first".to_string()),
                Some("first".to_string()),
                Some("second".to_string()),
                None
            ]
        );
        let status = registry.status();
        assert_eq!(status[0].current_usage, 2);
        assert!(!status[0].available);
    }

    #[test]
    fn select_does_not_charge() {
        let registry = ProviderRegistry::new(vec![provider("only", 1)]);
        assert!(registry.select_provider().is_some());
        assert!(registry.select_provider().is_some());
        assert_eq!(registry.status()[0].current_usage, 0);
    }

    #[test]
    fn usage_resets_after_window() {
        let start = Utc::now();
        let mut config = provider("only", 1);
        config.last_reset_at = start;
        let registry = ProviderRegistry::new(vec![config]);

        assert!(registry.reserve_at(start).is_some());
        assert!(registry.reserve_at(start + Duration::hours(23)).is_none());
        let renewed = registry.reserve_at(start + Duration::hours(24));
        assert_eq!(renewed.map(|p| p.current_usage), Some(1));
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", provider("p", 1));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn serialization_skips_api_key() {
        let json = serde_json::to_string(&provider("p", 1)).unwrap_or_default();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"quota_per_day\":1"));
    }
}
