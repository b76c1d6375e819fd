//! Rule-based knowledge: entries, built-in table, scoring and the store.

pub mod builtin;
pub mod entry;
pub mod scoring;
pub mod store;

pub use entry::{KnowledgeEntry, KnowledgeRecord};
pub use store::{KnowledgeMatch, KnowledgeStore};
