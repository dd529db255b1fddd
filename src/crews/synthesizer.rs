//! Agent synthesis: ask a generative model to design a team of agents.
//!
//! The model gets one fixed instruction plus the user's prompt and must reply
//! with a YAML document whose top-level `agents` key holds either a list of
//! agents or a mapping of agent key to agent. Lists are keyed `agent1..N`.

use std::sync::Arc;
use std::time::Duration;

use serde_yaml::Value;

use crate::crews::definitions::{AgentDefinition, AgentRoster};
use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::llms::providers::gemini::{GeminiCompletion, GenerationConfig};
use crate::utilities::config::ServiceConfig;
use crate::utilities::errors::{CrewError, Result};

/// Instruction sent ahead of every user prompt.
pub const SYNTHESIS_INSTRUCTION: &str = "You're an expert in creating AI agent teams.
For the given user prompt, determine how many agents are needed and generate a list of agents.
Each agent must have:
- role
- goal
- backstory

Return the result as a valid YAML dictionary under a top-level key called \"agents\".";

/// Sampling used for synthesis calls.
pub fn synthesis_generation_config() -> GenerationConfig {
    GenerationConfig {
        temperature: Some(0.7),
        top_p: Some(1.0),
        top_k: Some(32),
        max_output_tokens: Some(2048),
    }
}

/// Turns a prompt into an ordered set of agent definitions.
#[derive(Debug, Clone)]
pub struct AgentSynthesizer {
    llm: Arc<dyn BaseLLM>,
}

impl AgentSynthesizer {
    pub fn new(llm: Arc<dyn BaseLLM>) -> Self {
        Self { llm }
    }

    /// Synthesizer backed by Gemini with the synthesis sampling settings.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let llm = GeminiCompletion::new(
            config.synthesis_model.clone(),
            config.require_api_key()?,
            Duration::from_secs(config.llm_timeout_secs),
        )?
        .with_generation_config(synthesis_generation_config());
        Ok(Self::new(Arc::new(llm)))
    }

    /// One model call, no retry.
    pub async fn synthesize(&self, prompt: &str) -> Result<AgentRoster> {
        let message = format!("{}\n\nUser Prompt:\n{}", SYNTHESIS_INSTRUCTION, prompt);
        let raw = self.llm.call(vec![LLMMessage::user(message)]).await?;
        log::debug!("Synthesis raw output:\n{}", raw);

        let roster = parse_agents(&raw)?;
        if roster.is_empty() {
            return Err(CrewError::NoAgents);
        }
        Ok(roster)
    }
}

/// Parse a synthesis reply into agent definitions.
pub fn parse_agents(raw: &str) -> Result<AgentRoster> {
    let parse_error = |reason: String| CrewError::Parse {
        reason,
        raw: raw.to_string(),
    };

    let content = strip_fence(raw.trim());
    let document: Value = serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

    let agents = document
        .get("agents")
        .ok_or_else(|| parse_error("missing top-level key 'agents'".to_string()))?;

    match agents {
        Value::Sequence(items) => {
            let definitions: Vec<AgentDefinition> = items
                .iter()
                .map(|item| serde_yaml::from_value(item.clone()))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| parse_error(e.to_string()))?;
            Ok(AgentRoster::from_sequence("agent", definitions))
        }
        Value::Mapping(_) => {
            serde_yaml::from_value(agents.clone()).map_err(|e| parse_error(e.to_string()))
        }
        Value::Null => Ok(AgentRoster::new()),
        _ => Err(parse_error(
            "'agents' must be a list or a mapping".to_string(),
        )),
    }
}

/// Remove surrounding ``` markers and a language tag line such as `yaml`.
fn strip_fence(content: &str) -> &str {
    if !content.starts_with("```") {
        return content;
    }
    let inner = content.trim_matches('`');
    match inner.split_once('\n') {
        Some((first, rest)) if is_language_tag(first) => rest.trim(),
        _ => inner.trim(),
    }
}

fn is_language_tag(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
