//! Main Crew struct.
//!
//! A crew owns its agents and tasks and runs the tasks one after another.
//! Each task receives the outputs of all earlier tasks as context.

use std::collections::HashMap;

use uuid::Uuid;

use crate::agent::Agent;
use crate::crews::crew_output::CrewOutput;
use crate::process::Process;
use crate::task::Task;
use crate::tasks::task_output::TaskOutput;
use crate::utilities::errors::{CrewError, Result};

/// Separator between earlier task outputs in the shared context.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// A group of agents and the tasks they work through.
#[derive(Debug)]
pub struct Crew {
    /// Unique identifier for the crew instance.
    pub id: Uuid,
    /// Optional name for the crew.
    pub name: Option<String>,
    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,
    pub process: Process,
    pub verbose: bool,
}

impl Crew {
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            agents,
            tasks,
            process: Process::default(),
            verbose: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    /// Run the crew with the given inputs and return the final output.
    pub async fn kickoff(&mut self, inputs: HashMap<String, String>) -> Result<CrewOutput> {
        self.validate()?;

        for task in &mut self.tasks {
            task.interpolate_inputs(&inputs);
        }

        log::info!(
            "Crew {} kickoff: process={}, agents={}, tasks={}",
            self.name.as_deref().unwrap_or("crew"),
            self.process,
            self.agents.len(),
            self.tasks.len()
        );

        let outputs = match self.process {
            Process::Sequential => self.execute_tasks().await?,
        };

        Self::create_crew_output(outputs)
    }

    fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(CrewError::Execution("Crew has no agents".to_string()));
        }
        if self.tasks.is_empty() {
            return Err(CrewError::Execution("Crew has no tasks".to_string()));
        }
        for task in &self.tasks {
            match task.agent {
                Some(index) if index < self.agents.len() => {}
                Some(index) => {
                    return Err(CrewError::Execution(format!(
                        "Task '{}' is assigned to agent #{} but the crew has {} agents",
                        task.name.as_deref().unwrap_or("unnamed"),
                        index,
                        self.agents.len()
                    )))
                }
                None => {
                    return Err(CrewError::Execution(format!(
                        "Task '{}' has no agent assigned",
                        task.name.as_deref().unwrap_or("unnamed")
                    )))
                }
            }
        }
        Ok(())
    }

    async fn execute_tasks(&mut self) -> Result<Vec<TaskOutput>> {
        let mut task_outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        for task in &self.tasks {
            let context = if task_outputs.is_empty() {
                None
            } else {
                Some(
                    task_outputs
                        .iter()
                        .map(|o| o.raw.as_str())
                        .collect::<Vec<_>>()
                        .join(CONTEXT_SEPARATOR),
                )
            };

            // Checked in validate().
            let agent = &mut self.agents[task.agent.unwrap_or_default()];
            let raw = agent.execute_task(&task.prompt(), context.as_deref()).await?;

            let mut output = TaskOutput::new(
                task.description.clone(),
                task.expected_output.clone(),
                agent.role.clone(),
                raw,
            );
            output.name = task.name.clone();
            task_outputs.push(output);
        }

        Ok(task_outputs)
    }

    fn create_crew_output(task_outputs: Vec<TaskOutput>) -> Result<CrewOutput> {
        let raw = task_outputs
            .last()
            .map(|o| o.raw.clone())
            .ok_or_else(|| {
                CrewError::Execution("No task outputs available to create crew output.".to_string())
            })?;
        Ok(CrewOutput::new(raw, task_outputs))
    }
}

impl std::fmt::Display for Crew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Crew(id={}, process={}, number_of_agents={}, number_of_tasks={})",
            self.id,
            self.process,
            self.agents.len(),
            self.tasks.len()
        )
    }
}
