//! Base LLM trait shared by the synthesizer and the executing agents.
//!
//! Provider clients are constructed once at startup and handed around as
//! `Arc<dyn BaseLLM>`, so tests can swap in scripted doubles.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utilities::errors::Result;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// Interface every generative-model client implements.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Provider name used in logs.
    fn provider(&self) -> &str {
        "unknown"
    }

    /// Send the conversation and return the text of the first candidate.
    async fn call(&self, messages: Vec<LLMMessage>) -> Result<String>;
}
