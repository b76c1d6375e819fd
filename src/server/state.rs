//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::engine::{CoachEngine, EngineConfig};

/// Shared application state.
pub struct AppState {
    /// The coaching engine.
    pub engine: CoachEngine,
}

impl AppState {
    /// Create the state from `COACHBOT_*` environment variables.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the engine cannot
    /// be built.
    pub fn new() -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let config = EngineConfig::from_env()
            .map_err(|e| format!("Invalid configuration: {e}"))?;
        let engine = CoachEngine::new(config)
            .map_err(|e| format!("Failed to create coach engine: {e}"))?;

        Ok(Self::from_engine(engine))
    }

    /// Wrap an existing engine.
    #[must_use]
    pub fn from_engine(engine: CoachEngine) -> Arc<Self> {
        Arc::new(Self { engine })
    }
}
