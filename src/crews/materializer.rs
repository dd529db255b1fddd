//! Crew materialization: persist a synthesized crew as YAML on disk.
//!
//! Layout: `<base_dir>/<crew_id>/agents.yaml` and `tasks.yaml`. Crew ids are
//! v4 UUIDs; anything that does not parse as a UUID is treated as an unknown
//! crew, so ids can never address paths outside `base_dir`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::crews::definitions::{AgentRoster, TaskDefinition, TaskRoster};
use crate::utilities::errors::{CrewError, Result};

pub const AGENTS_FILE: &str = "agents.yaml";
pub const TASKS_FILE: &str = "tasks.yaml";

/// Key of the single task every crew gets.
pub const PROMPT_TASK_KEY: &str = "prompt_response_task";

const PROMPT_TASK_EXPECTED_OUTPUT: &str =
    "Your final answer MUST directly address the user's prompt with clarity and creativity.";

/// A crew written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedCrew {
    pub crew_id: String,
    pub crew_dir: PathBuf,
}

/// Writes and reads crew directories under one base directory.
#[derive(Debug, Clone)]
pub struct CrewMaterializer {
    base_dir: PathBuf,
}

impl CrewMaterializer {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory of `crew_id`, or `CrewNotFound` if the id is not a UUID.
    pub fn crew_dir(&self, crew_id: &str) -> Result<PathBuf> {
        let id = parse_crew_id(crew_id)?;
        Ok(self.base_dir.join(id.to_string()))
    }

    /// Create a new crew directory holding the agents and the prompt task.
    pub async fn materialize(&self, agents: &AgentRoster, prompt: &str) -> Result<MaterializedCrew> {
        let crew_id = Uuid::new_v4().to_string();
        let crew_dir = self.base_dir.join(&crew_id);
        tokio::fs::create_dir_all(&crew_dir).await?;

        let agents_yaml = serde_yaml::to_string(agents)?;
        tokio::fs::write(crew_dir.join(AGENTS_FILE), agents_yaml).await?;

        let tasks_yaml = serde_yaml::to_string(&prompt_task(prompt))?;
        tokio::fs::write(crew_dir.join(TASKS_FILE), tasks_yaml).await?;

        log::info!("Crew YAML files created at {}", crew_dir.display());
        Ok(MaterializedCrew { crew_id, crew_dir })
    }

    /// Raw `agents.yaml` text, or `None` if the crew does not exist.
    pub async fn read_agents_raw(&self, crew_id: &str) -> Result<Option<String>> {
        let crew_dir = match self.crew_dir(crew_id) {
            Ok(dir) => dir,
            Err(_) => return Ok(None),
        };
        match tokio::fs::read_to_string(crew_dir.join(AGENTS_FILE)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the crew's `agents.yaml` is on disk.
    pub async fn exists(&self, crew_id: &str) -> Result<bool> {
        let crew_dir = match self.crew_dir(crew_id) {
            Ok(dir) => dir,
            Err(_) => return Ok(false),
        };
        Ok(tokio::fs::try_exists(crew_dir.join(AGENTS_FILE)).await?)
    }

    /// Delete the crew directory. Returns `false` if there was none.
    pub async fn remove(&self, crew_id: &str) -> Result<bool> {
        let crew_dir = match self.crew_dir(crew_id) {
            Ok(dir) => dir,
            Err(_) => return Ok(false),
        };
        match tokio::fs::remove_dir_all(&crew_dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Load `agents.yaml` from a crew directory.
pub async fn load_agents(crew_dir: &Path) -> Result<AgentRoster> {
    let text = tokio::fs::read_to_string(crew_dir.join(AGENTS_FILE)).await?;
    Ok(serde_yaml::from_str(&text)?)
}

/// Load `tasks.yaml` from a crew directory.
pub async fn load_tasks(crew_dir: &Path) -> Result<TaskRoster> {
    let text = tokio::fs::read_to_string(crew_dir.join(TASKS_FILE)).await?;
    Ok(serde_yaml::from_str(&text)?)
}

fn parse_crew_id(crew_id: &str) -> Result<Uuid> {
    Uuid::parse_str(crew_id).map_err(|_| CrewError::CrewNotFound {
        crew_id: crew_id.to_string(),
    })
}

fn prompt_task(prompt: &str) -> TaskRoster {
    let mut tasks = TaskRoster::new();
    tasks.insert(
        PROMPT_TASK_KEY,
        TaskDefinition {
            description: format!(
                "Your task is to produce a high-quality response for the following user prompt:\n\
                 \"{}\"\n\n\
                 Collaborate as a team to brainstorm, analyze, and generate the best possible answer.",
                prompt
            ),
            expected_output: PROMPT_TASK_EXPECTED_OUTPUT.to_string(),
        },
    );
    tasks
}
