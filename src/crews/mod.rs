//! Crew lifecycle: synthesize agents for a prompt, write them to disk,
//! remember them, and run them.
//!
//! - [`synthesizer`] asks a model to design the agents.
//! - [`materializer`] writes `agents.yaml` / `tasks.yaml` under a crew id.
//! - [`executor`] loads a crew directory and runs it.
//! - [`orchestrator`] decides between reuse and synthesis for each prompt.

pub mod crew_output;
pub mod definitions;
pub mod executor;
pub mod materializer;
pub mod orchestrator;
pub mod synthesizer;

pub use crew_output::CrewOutput;
pub use definitions::{AgentDefinition, AgentRoster, TaskDefinition, TaskRoster};
pub use executor::CrewExecutor;
pub use materializer::{CrewMaterializer, MaterializedCrew};
pub use orchestrator::{CrewOrchestrator, CrewStatus, GenerateOutcome};
pub use synthesizer::AgentSynthesizer;
