//! Main Task struct.
//!
//! A task is a description plus the expected shape of its answer, assigned
//! to one of the crew's agents by index.

use std::collections::HashMap;

use uuid::Uuid;

use crate::crews::definitions::TaskDefinition;
use crate::utilities::string_utils::interpolate_known;

/// Represents a task to be executed by a crew agent.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: Uuid,
    /// Optional name for the task (the key in `tasks.yaml`).
    pub name: Option<String>,
    /// Descriptive text detailing the task's purpose and execution.
    pub description: String,
    /// Clear definition of expected task outcome.
    pub expected_output: String,
    /// Index of the responsible agent in the crew's agent list.
    pub agent: Option<usize>,
    /// Description before input interpolation.
    original_description: Option<String>,
    /// Expected output before input interpolation.
    original_expected_output: Option<String>,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            description: description.into(),
            expected_output: expected_output.into(),
            agent: None,
            original_description: None,
            original_expected_output: None,
        }
    }

    /// Build a task from a stored definition.
    pub fn from_definition(name: &str, definition: &TaskDefinition) -> Self {
        let mut task = Self::new(
            definition.description.clone(),
            definition.expected_output.clone(),
        );
        task.name = Some(name.to_string());
        task
    }

    /// Assign the task to the agent at `index`.
    pub fn with_agent(mut self, index: usize) -> Self {
        self.agent = Some(index);
        self
    }

    /// Full prompt handed to the agent.
    pub fn prompt(&self) -> String {
        format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
             you MUST return the actual complete content as the final answer, not a summary.",
            self.description.trim(),
            self.expected_output
        )
    }

    /// Replace `{key}` placeholders with the matching inputs.
    ///
    /// Interpolation always starts from the original text, so calling this
    /// again with different inputs does not compound.
    pub fn interpolate_inputs(&mut self, inputs: &HashMap<String, String>) {
        if self.original_description.is_none() {
            self.original_description = Some(self.description.clone());
        }
        if self.original_expected_output.is_none() {
            self.original_expected_output = Some(self.expected_output.clone());
        }

        if inputs.is_empty() {
            return;
        }

        if let Some(ref orig_desc) = self.original_description {
            self.description = interpolate_known(orig_desc, inputs);
        }
        if let Some(ref orig_expected) = self.original_expected_output {
            self.expected_output = interpolate_known(orig_expected, inputs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_interpolation_replaces_known_keys_only() {
        let mut task = Task::new("Answer {prompt} using {style}", "A reply to {prompt}");
        task.interpolate_inputs(&inputs(&[("prompt", "the question")]));
        assert_eq!(task.description, "Answer the question using {style}");
        assert_eq!(task.expected_output, "A reply to the question");
    }

    #[test]
    fn test_reinterpolation_starts_from_original() {
        let mut task = Task::new("Say {word}", "ok");
        task.interpolate_inputs(&inputs(&[("word", "hi")]));
        task.interpolate_inputs(&inputs(&[("word", "bye")]));
        assert_eq!(task.description, "Say bye");
    }

    #[test]
    fn test_prompt_includes_expected_output() {
        let task = Task::new("  Write a haiku  ", "Three lines");
        let prompt = task.prompt();
        assert!(prompt.starts_with("Write a haiku\n\n"));
        assert!(prompt.contains("This is the expected criteria for your final answer: Three lines"));
    }

    #[test]
    fn test_from_definition() {
        let definition = TaskDefinition {
            description: "d".into(),
            expected_output: "e".into(),
        };
        let task = Task::from_definition("prompt_response_task", &definition).with_agent(0);
        assert_eq!(task.name.as_deref(), Some("prompt_response_task"));
        assert_eq!(task.agent, Some(0));
    }
}
