//! Storage interface for remembered prompts.
//!
//! Each synthesis event leaves one [`PromptRecord`] behind: the prompt, its
//! embedding, the crew it produced and that crew's agents. Lookups return the
//! single most similar record, if it clears the caller's threshold.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crews::definitions::AgentDefinition;
use crate::rag::embeddings::cosine_similarity;
use crate::utilities::errors::Result;

/// A stored prompt and the crew synthesized for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub prompt: String,
    pub embedding: Vec<f32>,
    pub crew_id: String,
    pub agents: Vec<AgentDefinition>,
    pub created_at: DateTime<Utc>,
}

impl PromptRecord {
    pub fn new(
        prompt: impl Into<String>,
        embedding: Vec<f32>,
        crew_id: impl Into<String>,
        agents: Vec<AgentDefinition>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            embedding,
            crew_id: crew_id.into(),
            agents,
            created_at: Utc::now(),
        }
    }
}

/// The closest stored prompt for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub crew_id: String,
    pub prompt: String,
    pub agents: Vec<AgentDefinition>,
    /// Cosine similarity in `[0, 1]`.
    pub similarity: f64,
}

/// Vector store of prompt records.
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Top-1 record by cosine similarity, if its score is at least `threshold`.
    async fn find_similar(&self, query: &[f32], threshold: f64) -> Result<Option<SimilarityMatch>>;

    /// Append a record. No deduplication.
    async fn save(&self, record: PromptRecord) -> Result<()>;

    /// Remove one record for `crew_id`. Returns `false` if there was none.
    async fn delete(&self, crew_id: &str) -> Result<bool>;

    /// Backend name, for logs.
    fn backend(&self) -> &str;
}

/// Pick the best candidate by exhaustive scan and apply the threshold.
///
/// On equal scores the earliest candidate wins.
pub(crate) fn best_match<'a, I>(candidates: I, query: &[f32], threshold: f64) -> Option<SimilarityMatch>
where
    I: IntoIterator<Item = &'a PromptRecord>,
{
    let mut best: Option<(&PromptRecord, f64)> = None;
    for record in candidates {
        let score = cosine_similarity(query, &record.embedding);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((record, score));
        }
    }

    let (record, similarity) = best?;
    if similarity < threshold {
        log::debug!(
            "Closest prompt scored {:.4}, below threshold {:.2}",
            similarity,
            threshold
        );
        return None;
    }
    Some(SimilarityMatch {
        crew_id: record.crew_id.clone(),
        prompt: record.prompt.clone(),
        agents: record.agents.clone(),
        similarity,
    })
}
