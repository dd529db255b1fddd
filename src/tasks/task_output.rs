//! Task output representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The result of one executed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Description of the task (after input interpolation).
    pub description: String,
    /// Name of the task.
    pub name: Option<String>,
    /// Expected output of the task.
    pub expected_output: String,
    /// First words of the description.
    pub summary: String,
    /// Raw output of the task.
    pub raw: String,
    /// Role of the agent that executed the task.
    pub agent: String,
}

impl TaskOutput {
    /// Create a new TaskOutput with the summary derived from the description.
    pub fn new(
        description: String,
        expected_output: String,
        agent: String,
        raw: String,
    ) -> Self {
        let summary = Self::generate_summary(&description);
        Self {
            description,
            name: None,
            expected_output,
            summary,
            raw,
            agent,
        }
    }

    /// First 10 words of the description followed by "...".
    fn generate_summary(description: &str) -> String {
        let excerpt: String = description
            .split_whitespace()
            .take(10)
            .collect::<Vec<&str>>()
            .join(" ");
        format!("{}...", excerpt)
    }
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
