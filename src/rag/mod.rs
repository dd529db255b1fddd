//! Retrieval support: prompt embeddings for semantic crew lookup.

pub mod embeddings;

pub use embeddings::{cosine_similarity, normalize, Embedder, Embedding};
