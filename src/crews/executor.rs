//! Crew execution: load a materialized crew and run it against a prompt.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::Agent;
use crate::crew::Crew;
use crate::crews::crew_output::CrewOutput;
use crate::crews::materializer::{load_agents, load_tasks};
use crate::llms::base_llm::BaseLLM;
use crate::llms::providers::gemini::GeminiCompletion;
use crate::process::Process;
use crate::task::Task;
use crate::utilities::config::ServiceConfig;
use crate::utilities::errors::Result;

/// Runs crews from their directories with one shared model.
#[derive(Debug, Clone)]
pub struct CrewExecutor {
    llm: Arc<dyn BaseLLM>,
    verbose: bool,
}

impl CrewExecutor {
    pub fn new(llm: Arc<dyn BaseLLM>) -> Self {
        Self { llm, verbose: true }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Executor backed by the configured Gemini execution model.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let llm = GeminiCompletion::new(
            config.execution_model.clone(),
            config.require_api_key()?,
            Duration::from_secs(config.llm_timeout_secs),
        )?;
        Ok(Self::new(Arc::new(llm)))
    }

    /// Load the crew in `crew_dir` and run it with `{prompt}` as input.
    ///
    /// Every task goes to the first agent; the other agents are built but
    /// receive no work.
    pub async fn execute(&self, crew_dir: &Path, prompt: &str) -> Result<CrewOutput> {
        let result = self.run(crew_dir, prompt).await;
        if let Err(e) = &result {
            log::error!("Error running crew in {}: {}", crew_dir.display(), e);
        }
        result
    }

    async fn run(&self, crew_dir: &Path, prompt: &str) -> Result<CrewOutput> {
        let agent_defs = load_agents(crew_dir).await?;
        let task_defs = load_tasks(crew_dir).await?;

        let agents: Vec<Agent> = agent_defs
            .values()
            .map(|def| {
                Agent::from_definition(def, self.llm.clone())
                    .with_memory(true)
                    .with_verbose(self.verbose)
            })
            .collect();

        let tasks: Vec<Task> = task_defs
            .iter()
            .map(|(key, def)| Task::from_definition(key, def).with_agent(0))
            .collect();

        let crew_name = crew_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut crew = Crew::new(agents, tasks)
            .with_name(crew_name)
            .with_process(Process::Sequential);

        let inputs = HashMap::from([("prompt".to_string(), prompt.to_string())]);
        crew.kickoff(inputs).await
    }
}
