//! Embedding providers used for semantic prompt matching.
//!
//! An [`Embedder`] turns a prompt into a fixed-length, L2-normalized vector.
//! Because vectors are normalized, cosine similarity reduces to a dot
//! product, which is what the crew stores compute.

pub mod providers;

use std::sync::Arc;

use async_trait::async_trait;

use crate::utilities::config::{EmbeddingProviderKind, ServiceConfig};
use crate::utilities::errors::{CrewError, Result};

/// A single embedding vector.
pub type Embedding = Vec<f32>;

/// Converts text into a normalized embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text`. Empty text is rejected.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}

/// Scale `vector` to unit length.
///
/// Fails on an empty or all-zero vector, which has no direction.
pub fn normalize(mut vector: Vec<f32>) -> Result<Embedding> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if vector.is_empty() || norm == 0.0 || !norm.is_finite() {
        return Err(CrewError::Embedding(
            "Cannot normalize an empty or zero-length embedding".to_string(),
        ));
    }
    for x in vector.iter_mut() {
        *x /= norm;
    }
    Ok(vector)
}

/// Cosine similarity of two normalized vectors, clamped to `[0, 1]`.
///
/// Vectors of different length never match.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    dot.clamp(0.0, 1.0)
}

/// Reject empty input before it reaches a model.
pub(crate) fn ensure_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CrewError::Embedding("Text cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Build the embedder selected by the configuration.
pub async fn build_embedder(config: &ServiceConfig) -> Result<Arc<dyn Embedder>> {
    match config.embedding_provider {
        EmbeddingProviderKind::Google => {
            let embedder = providers::google::GoogleEmbedder::new(
                config.embedding_model.clone(),
                config.require_api_key()?,
                std::time::Duration::from_secs(config.llm_timeout_secs),
            )?;
            Ok(Arc::new(embedder))
        }
        EmbeddingProviderKind::Local => build_local_embedder(config).await,
    }
}

#[cfg(feature = "local-embeddings")]
async fn build_local_embedder(config: &ServiceConfig) -> Result<Arc<dyn Embedder>> {
    let embedder =
        providers::sentence_transformer::SentenceTransformerEmbedder::new(&config.embedding_model)
            .await?;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "local-embeddings"))]
async fn build_local_embedder(_config: &ServiceConfig) -> Result<Arc<dyn Embedder>> {
    Err(CrewError::Config(
        "EMBEDDING_PROVIDER=local requires building with the `local-embeddings` feature"
            .to_string(),
    ))
}
