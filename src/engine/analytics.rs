//! Running request counters.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

/// How a request was resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Replayed from the cache.
    CacheHit,
    /// Answered from the knowledge store or the safety protocol.
    Local,
    /// Answered by an external provider.
    Api,
    /// Static capabilities message.
    Fallback,
    /// Internal failure turned into the error message.
    Error,
}

/// Lock-free request counters.
///
/// Each counter is updated independently; a snapshot taken under load may
/// mix values from slightly different moments.
#[derive(Default)]
pub struct Analytics {
    total_requests: AtomicU64,
    cache_hits: AtomicU64,
    local_hits: AtomicU64,
    api_hits: AtomicU64,
    fallbacks: AtomicU64,
    errors: AtomicU64,
    provider_failures: AtomicU64,
    requests_by_user: DashMap<String, u64>,
}

impl Analytics {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an incoming request.
    pub fn record_request(&self, user_id: &str) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        *self
            .requests_by_user
            .entry(user_key(user_id).to_string())
            .or_insert(0) += 1;
    }

    /// Count how a request was resolved.
    pub fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::CacheHit => &self.cache_hits,
            Outcome::Local => &self.local_hits,
            Outcome::Api => &self.api_hits,
            Outcome::Fallback => &self.fallbacks,
            Outcome::Error => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed or timed-out provider call.
    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests seen from one user.
    #[must_use]
    pub fn requests_for(&self, user_id: &str) -> u64 {
        self.requests_by_user
            .get(user_key(user_id))
            .map_or(0, |count| *count)
    }

    /// Read-only projection of the counters.
    #[must_use]
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let local_hits = self.local_hits.load(Ordering::Relaxed);
        let api_hits = self.api_hits.load(Ordering::Relaxed);
        let fallbacks = self.fallbacks.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);

        AnalyticsSnapshot {
            total_requests,
            cache_hits,
            local_hits,
            api_hits,
            fallbacks,
            errors,
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            unique_users: self.requests_by_user.len(),
            local_knowledge_rate: rate(local_hits, total_requests),
            cache_hit_rate: rate(cache_hits, total_requests),
            api_response_rate: rate(api_hits, total_requests),
            fallback_rate: rate(fallbacks, total_requests),
            error_rate: rate(errors, total_requests),
        }
    }
}

/// Snapshot of the counters with derived rates in `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    /// Requests received.
    pub total_requests: u64,
    /// Requests answered from the cache.
    pub cache_hits: u64,
    /// Requests answered locally.
    pub local_hits: u64,
    /// Requests answered by a provider.
    pub api_hits: u64,
    /// Requests answered with the capabilities message.
    pub fallbacks: u64,
    /// Requests that hit an internal failure.
    pub errors: u64,
    /// Provider calls that failed or timed out.
    pub provider_failures: u64,
    /// Distinct user ids seen.
    pub unique_users: usize,
    /// `local_hits / max(total, 1)`.
    pub local_knowledge_rate: f64,
    /// `cache_hits / max(total, 1)`.
    pub cache_hit_rate: f64,
    /// `api_hits / max(total, 1)`.
    pub api_response_rate: f64,
    /// `fallbacks / max(total, 1)`.
    pub fallback_rate: f64,
    /// `errors / max(total, 1)`.
    pub error_rate: f64,
}

impl AnalyticsSnapshot {
    /// Format a rate as a percentage with one decimal.
    #[must_use]
    pub fn percent(rate: f64) -> String {
        format!("{:.1}%", rate * 100.0)
    }
}

fn user_key(user_id: &str) -> &str {
    let user = user_id.trim();
    if user.is_empty() { "anonymous" } else { user }
}

#[allow(clippy::cast_precision_loss)]
fn rate(count: u64, total: u64) -> f64 {
    count as f64 / total.max(1) as f64
}
