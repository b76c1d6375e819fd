//! Message classification: intent, topics, urgency and confidence.

pub mod classifier;
pub mod keywords;

pub use classifier::{MessageAnalysis, MessageClassifier};
