//! Core types for the coaching engine (config, errors, ids, intents, responses).

pub mod config;
pub mod errors;
pub mod ids;
pub mod intent;
pub mod response;
pub mod text;
