//! Core Agent struct.
//!
//! An agent is a persona (role, goal, backstory) bound to a generative model.
//! It has no tools. With memory enabled it keeps the conversation of the
//! current run and replays it on every later task it executes.

use std::sync::Arc;

use uuid::Uuid;

use crate::agent::utils;
use crate::crews::definitions::AgentDefinition;
use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::utilities::errors::{CrewError, Result};

/// An executable agent.
pub struct Agent {
    /// Unique identifier for the agent.
    pub id: Uuid,
    /// Role of the agent.
    pub role: String,
    /// Objective of the agent.
    pub goal: String,
    /// Backstory of the agent.
    pub backstory: String,
    /// Log each task prompt and answer at info level.
    pub verbose: bool,
    /// Keep the conversation across tasks.
    pub memory: bool,
    llm: Arc<dyn BaseLLM>,
    history: Vec<LLMMessage>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("llm", &self.llm.model())
            .field("memory", &self.memory)
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create a new agent with memory disabled.
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: Arc<dyn BaseLLM>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            verbose: false,
            memory: false,
            llm,
            history: Vec::new(),
        }
    }

    /// Build an agent from a stored definition.
    pub fn from_definition(definition: &AgentDefinition, llm: Arc<dyn BaseLLM>) -> Self {
        Self::new(
            definition.role.clone(),
            definition.goal.clone(),
            definition.backstory.clone(),
            llm,
        )
    }

    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Conversation remembered so far (empty when memory is off).
    pub fn history(&self) -> &[LLMMessage] {
        &self.history
    }

    /// Execute one task prompt, optionally with context from earlier tasks.
    pub async fn execute_task(&mut self, task_prompt: &str, context: Option<&str>) -> Result<String> {
        log::debug!("Agent '{}' executing task: {}", self.role, task_prompt);

        let system = format!(
            "{}\n\n{}",
            utils::role_playing_prompt(&self.role, &self.backstory, &self.goal),
            utils::NO_TOOLS_PROMPT
        );
        let user = utils::with_context(task_prompt, context);

        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(LLMMessage::system(system));
        if self.memory {
            messages.extend(self.history.iter().cloned());
        }
        messages.push(LLMMessage::user(user.clone()));

        let response = self.llm.call(messages).await?;
        let answer = utils::extract_final_answer(&response);
        if answer.is_empty() {
            return Err(CrewError::Execution(format!(
                "Agent '{}' returned an empty answer",
                self.role
            )));
        }

        if self.verbose {
            log::info!("Agent '{}' final answer:\n{}", self.role, answer);
        }

        if self.memory {
            self.history.push(LLMMessage::user(user));
            self.history.push(LLMMessage::assistant(response));
        }

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::base_llm::MessageRole;
    use crate::utilities::testing::ScriptedLLM;

    #[tokio::test]
    async fn test_execute_task_builds_persona_prompt() {
        let llm = Arc::new(ScriptedLLM::always(
            "Thought: I now can give a great answer\nFinal Answer: Salt wind, endless blue",
        ));
        let mut agent = Agent::new("Poet", "Write verse", "You love the sea.", llm.clone());

        let answer = agent.execute_task("Write a haiku", None).await.unwrap();
        assert_eq!(answer, "Salt wind, endless blue");

        let sent = llm.sent(0);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, MessageRole::System);
        assert!(sent[0].content.starts_with("You are Poet. You love the sea."));
        assert!(sent[0].content.contains("Your personal goal is: Write verse"));
        assert!(sent[0].content.ends_with(utils::NO_TOOLS_PROMPT));
        assert_eq!(sent[1].content, "Write a haiku");
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn test_memory_replays_previous_exchange() {
        let llm = Arc::new(ScriptedLLM::sequence(["Final Answer: first", "Final Answer: second"]));
        let mut agent = Agent::new("Poet", "Write", "Sea", llm.clone()).with_memory(true);

        agent.execute_task("task one", None).await.unwrap();
        agent.execute_task("task two", Some("first")).await.unwrap();

        let second_call = llm.sent(1);
        assert_eq!(second_call.len(), 4);
        assert_eq!(second_call[1].content, "task one");
        assert_eq!(second_call[2].role, MessageRole::Assistant);
        assert!(second_call[3].content.contains("This is the context you're working with:\nfirst"));
        assert_eq!(agent.history().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_execution_error() {
        let llm = Arc::new(ScriptedLLM::always("Final Answer:   "));
        let mut agent = Agent::new("Poet", "Write", "Sea", llm);
        let err = agent.execute_task("task", None).await.unwrap_err();
        assert!(matches!(err, CrewError::Execution(_)));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = Arc::new(ScriptedLLM::failing("boom"));
        let mut agent = Agent::new("Poet", "Write", "Sea", llm).with_memory(true);
        let err = agent.execute_task("task", None).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert!(agent.history().is_empty());
    }
}
