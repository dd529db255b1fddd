//! Prompt memory: remembers which crew was built for which prompt.
//!
//! The store is a small vector database. A new prompt is embedded and
//! compared against every remembered prompt; a close enough match means the
//! existing crew is reused instead of synthesizing a new one.

pub mod storage;

pub use storage::{open_store, InMemoryPromptStore, PromptRecord, PromptStore, SimilarityMatch};
