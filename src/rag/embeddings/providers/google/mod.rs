//! Google Generative AI embedding provider.
//!
//! Calls the Gemini `embedContent` endpoint with the `SEMANTIC_SIMILARITY`
//! task type and normalizes the returned vector.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llms::providers::gemini::GEMINI_API_BASE;
use crate::rag::embeddings::{ensure_text, normalize, Embedder, Embedding};
use crate::utilities::errors::{CrewError, Result};

/// Task type sent with every request; prompts are compared to each other.
pub const TASK_TYPE: &str = "SEMANTIC_SIMILARITY";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Embedder backed by the Gemini embedding API.
#[derive(Debug, Clone)]
pub struct GoogleEmbedder {
    model_name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleEmbedder {
    pub fn new(model_name: impl Into<String>, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrewError::Embedding(e.to_string()))?;
        Ok(Self {
            model_name: model_name.into(),
            api_key: api_key.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            client,
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:embedContent", self.base_url, self.model_name)
    }
}

#[async_trait]
impl Embedder for GoogleEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let text = ensure_text(text)?;
        log::debug!("Google embed: model={}, {} chars", self.model_name, text.len());

        let request = EmbedContentRequest {
            model: format!("models/{}", self.model_name),
            content: Content {
                parts: [Part { text }],
            },
            task_type: TASK_TYPE,
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| CrewError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrewError::Embedding(format!(
                "Google embedding API error ({}): {}",
                status, body
            )));
        }

        let parsed: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| CrewError::Embedding(format!("Invalid embedding response: {}", e)))?;

        let values = parsed
            .embedding
            .map(|e| e.values)
            .ok_or_else(|| CrewError::Embedding("Response has no embedding".to_string()))?;

        normalize(values)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
