//! Local sentence-transformer embeddings via `fastembed` (ONNX Runtime).
//!
//! The model is downloaded to the fastembed cache on first use. Inference is
//! synchronous, so it runs on the blocking pool behind a mutex.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::rag::embeddings::{ensure_text, normalize, Embedder, Embedding};
use crate::utilities::errors::{CrewError, Result};

/// Embedder running a sentence-transformer model in-process.
pub struct SentenceTransformerEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
}

impl SentenceTransformerEmbedder {
    /// Load `model_name`, downloading it if it is not cached yet.
    pub async fn new(model_name: &str) -> Result<Self> {
        let embedding_model = model_name_to_enum(model_name)?;
        log::info!("Loading local embedding model {}", model_name);

        let mut init_options = InitOptions::default();
        init_options.model_name = embedding_model;
        init_options.show_download_progress = false;

        let model = tokio::task::spawn_blocking(move || TextEmbedding::try_new(init_options))
            .await
            .map_err(|e| CrewError::Embedding(format!("Task join error: {}", e)))?
            .map_err(|e| CrewError::Embedding(format!("Failed to load model: {}", e)))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: model_name.to_string(),
        })
    }
}

fn model_name_to_enum(model_name: &str) -> Result<EmbeddingModel> {
    match model_name {
        "all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-MiniLM-L12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        _ => Err(CrewError::Config(format!(
            "Unsupported local embedding model: '{}'",
            model_name
        ))),
    }
}

#[async_trait]
impl Embedder for SentenceTransformerEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let text = ensure_text(text)?.to_string();
        let model = Arc::clone(&self.model);

        let mut embeddings = tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|e| format!("Mutex lock failed: {}", e))?;
            guard
                .embed(vec![text], None)
                .map_err(|e| format!("Embedding generation failed: {}", e))
        })
        .await
        .map_err(|e| CrewError::Embedding(format!("Task join error: {}", e)))?
        .map_err(CrewError::Embedding)?;

        let vector = embeddings
            .pop()
            .ok_or_else(|| CrewError::Embedding("No embedding returned".to_string()))?;
        normalize(vector)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
