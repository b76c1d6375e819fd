//! External completion providers: registry, HTTP clients and prompts.

pub mod client;
pub mod prompt;
pub mod registry;

pub use client::{CompletionBackend, CompletionRequest, HttpCompletionBackend, ProviderError};
pub use registry::{ProviderConfig, ProviderKind, ProviderRegistry, ProviderStatus};
