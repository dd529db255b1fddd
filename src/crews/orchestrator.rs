//! Request orchestration: reuse a remembered crew or build a new one.
//!
//! Every prompt is embedded and looked up in the prompt store. A match at or
//! above the similarity threshold re-runs the stored crew. Otherwise a crew
//! is synthesized, written to disk, remembered, and then run.
//!
//! Cache misses serialize on a process-wide lock and look the prompt up again
//! once they hold it, so near-identical prompts arriving together in one
//! process produce a single crew. Crew execution happens outside the lock.
//! The lock is not keyed by prompt: while one synthesis is in flight, cache
//! misses for unrelated prompts wait for it too, for up to the model timeout.
//!
//! A matched record whose crew directory has disappeared is dropped from the
//! store and the lookup continues, so the prompt falls through to synthesis.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::crews::crew_output::CrewOutput;
use crate::crews::executor::CrewExecutor;
use crate::crews::materializer::CrewMaterializer;
use crate::crews::synthesizer::AgentSynthesizer;
use crate::memory::storage::{open_store, PromptRecord, PromptStore, SimilarityMatch};
use crate::rag::embeddings::{build_embedder, Embedder};
use crate::utilities::config::{ServiceConfig, DEFAULT_SIMILARITY_THRESHOLD};
use crate::utilities::errors::{CrewError, Result};

/// Whether a request reused a crew or created one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrewStatus {
    Existing,
    New,
}

impl fmt::Display for CrewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewStatus::Existing => write!(f, "existing"),
            CrewStatus::New => write!(f, "new"),
        }
    }
}

/// Result of handling one prompt.
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub crew_id: String,
    pub status: CrewStatus,
    /// Similarity of the matched prompt; only set for reused crews.
    pub similarity: Option<f64>,
    pub output: CrewOutput,
}

/// Ties embedding, storage, synthesis, materialization and execution together.
pub struct CrewOrchestrator {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn PromptStore>,
    synthesizer: AgentSynthesizer,
    materializer: CrewMaterializer,
    executor: CrewExecutor,
    similarity_threshold: f64,
    synthesis_lock: Mutex<()>,
}

impl fmt::Debug for CrewOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrewOrchestrator")
            .field("embedder", &self.embedder.model_name())
            .field("store", &self.store.backend())
            .field("crews_dir", &self.materializer.base_dir())
            .field("similarity_threshold", &self.similarity_threshold)
            .finish_non_exhaustive()
    }
}

impl CrewOrchestrator {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn PromptStore>,
        synthesizer: AgentSynthesizer,
        materializer: CrewMaterializer,
        executor: CrewExecutor,
    ) -> Self {
        Self {
            embedder,
            store,
            synthesizer,
            materializer,
            executor,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            synthesis_lock: Mutex::new(()),
        }
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Wire up the production components from configuration.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let embedder = build_embedder(config).await?;
        let store = open_store(&config.store_uri).await?;
        log::info!(
            "Prompt store: {}, embedding model: {}",
            store.backend(),
            embedder.model_name()
        );

        Ok(Self::new(
            embedder,
            store,
            AgentSynthesizer::from_config(config)?,
            CrewMaterializer::new(config.crews_dir.clone()),
            CrewExecutor::from_config(config)?,
        )
        .with_similarity_threshold(config.similarity_threshold))
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Answer a prompt with a reused or freshly synthesized crew.
    pub async fn generate(&self, prompt: &str) -> Result<GenerateOutcome> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(CrewError::EmptyPrompt);
        }
        log::info!("User prompt: {}", prompt);

        let embedding = self.embedder.embed(prompt).await?;
        if let Some(found) = self.lookup_live(&embedding).await? {
            return self.run_existing(found, prompt).await;
        }

        let guard = self.synthesis_lock.lock().await;
        if let Some(found) = self.lookup_live(&embedding).await? {
            drop(guard);
            return self.run_existing(found, prompt).await;
        }

        let agents = self.synthesizer.synthesize(prompt).await?;
        for (i, agent) in agents.values().enumerate() {
            log::info!("Generated agent {}: {}", i + 1, agent.role);
        }

        let crew = self.materializer.materialize(&agents, prompt).await?;
        self.store
            .save(PromptRecord::new(
                prompt,
                embedding,
                crew.crew_id.clone(),
                agents.to_vec(),
            ))
            .await?;
        drop(guard);

        let output = self.executor.execute(&crew.crew_dir, prompt).await?;
        Ok(GenerateOutcome {
            crew_id: crew.crew_id,
            status: CrewStatus::New,
            similarity: None,
            output,
        })
    }

    /// Raw `agents.yaml` of a crew.
    pub async fn agents(&self, crew_id: &str) -> Result<String> {
        self.materializer
            .read_agents_raw(crew_id)
            .await?
            .ok_or_else(|| CrewError::CrewNotFound {
                crew_id: crew_id.to_string(),
            })
    }

    /// Delete a crew's directory, then its prompt record.
    ///
    /// The directory is gone even when the record turns out to be missing.
    /// A record left without a directory is still removed, and the call
    /// reports the crew as not found.
    pub async fn delete(&self, crew_id: &str) -> Result<()> {
        let removed_dir = self.materializer.remove(crew_id).await?;
        let removed_record = self.store.delete(crew_id).await?;

        match (removed_dir, removed_record) {
            (true, true) => {
                log::info!("Crew {} deleted", crew_id);
                Ok(())
            }
            (true, false) => {
                log::warn!("Crew {} had no prompt record", crew_id);
                Err(CrewError::RecordNotFound {
                    crew_id: crew_id.to_string(),
                })
            }
            (false, removed_record) => {
                if removed_record {
                    log::warn!("Removed orphaned prompt record of crew {}", crew_id);
                }
                Err(CrewError::CrewNotFound {
                    crew_id: crew_id.to_string(),
                })
            }
        }
    }

    /// Best match whose crew is still on disk. Records of vanished crews are
    /// deleted along the way.
    async fn lookup_live(&self, embedding: &[f32]) -> Result<Option<SimilarityMatch>> {
        loop {
            let found = match self
                .store
                .find_similar(embedding, self.similarity_threshold)
                .await?
            {
                Some(found) => found,
                None => return Ok(None),
            };
            if self.materializer.exists(&found.crew_id).await? {
                return Ok(Some(found));
            }

            log::warn!(
                "Crew {} matched (score: {:.4}) but its directory is missing; dropping the record",
                found.crew_id,
                found.similarity
            );
            if !self.store.delete(&found.crew_id).await? {
                return Ok(None);
            }
        }
    }

    async fn run_existing(&self, found: SimilarityMatch, prompt: &str) -> Result<GenerateOutcome> {
        log::info!(
            "Similar prompt detected! Reusing crew {} (score: {:.4})",
            found.crew_id,
            found.similarity
        );
        let crew_dir = self.materializer.crew_dir(&found.crew_id)?;
        let output = self.executor.execute(&crew_dir, prompt).await?;
        Ok(GenerateOutcome {
            crew_id: found.crew_id,
            status: CrewStatus::Existing,
            similarity: Some(found.similarity),
            output,
        })
    }
}
