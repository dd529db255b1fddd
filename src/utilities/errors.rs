//! Error types for the crew service.
//!
//! Every failure path (embedding, store, synthesis, materialization and crew
//! execution) is expressed as a [`CrewError`] so the HTTP layer can map them
//! uniformly to status codes.

use thiserror::Error;

/// Errors raised while synthesizing, persisting or running a crew.
#[derive(Debug, Error)]
pub enum CrewError {
    /// The prompt was empty after trimming.
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,

    /// No crew directory exists for the identifier.
    #[error("Crew not found")]
    CrewNotFound { crew_id: String },

    /// The crew directory existed but the store had no matching record.
    #[error("Crew not found in database")]
    RecordNotFound { crew_id: String },

    /// The generative model call failed.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The embedding backend failed or returned an unusable vector.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The synthesis response could not be turned into agent definitions.
    #[error("Failed to parse model response as YAML: {reason}\n\nRaw response:\n{raw}")]
    Parse { reason: String, raw: String },

    /// The synthesis response parsed but contained no agents.
    #[error("The model did not return any agents.")]
    NoAgents,

    /// Crew store (vector database) error.
    #[error("Crew store error: {0}")]
    Store(String),

    /// Failure inside the agent execution pipeline.
    #[error("Crew execution failed: {0}")]
    Execution(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CrewError>;

impl CrewError {
    /// Whether this error means the caller asked for something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CrewError::CrewNotFound { .. } | CrewError::RecordNotFound { .. }
        )
    }
}

impl From<reqwest::Error> for CrewError {
    fn from(err: reqwest::Error) -> Self {
        CrewError::Llm(err.to_string())
    }
}

impl From<rusqlite::Error> for CrewError {
    fn from(err: rusqlite::Error) -> Self {
        CrewError::Store(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for CrewError {
    fn from(err: sqlx::Error) -> Self {
        CrewError::Store(err.to_string())
    }
}
