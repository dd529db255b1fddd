//! Crew output representation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tasks::task_output::TaskOutput;

/// The result of a crew run.
///
/// `raw` is the output of the final task; `tasks_output` holds every task's
/// output in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
}

impl CrewOutput {
    pub fn new(raw: String, tasks_output: Vec<TaskOutput>) -> Self {
        Self { raw, tasks_output }
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
