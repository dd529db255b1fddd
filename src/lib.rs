//! # crewsmith
//!
//! Turns a natural-language prompt into a crew of AI agents, runs the crew,
//! and remembers it. Prompts are embedded and compared with every prompt seen
//! before; a close enough match re-runs the crew built for it instead of
//! asking the model to design a new one.
//!
//! - [`crews`] - Synthesis, materialization, execution and orchestration
//! - [`agent`], [`task`], [`crew`] - The sequential execution engine
//! - [`memory`] - Prompt stores (in-memory, SQLite, Postgres/pgvector)
//! - [`rag`] - Embedding providers
//! - [`llms`] - Generative model clients
//! - [`server`] - HTTP API

pub mod agent;
pub mod crew;
pub mod crews;
pub mod llms;
pub mod memory;
pub mod process;
pub mod rag;
pub mod server;
pub mod task;
pub mod tasks;
pub mod utilities;

pub use agent::Agent;
pub use crew::Crew;
pub use crews::crew_output::CrewOutput;
pub use crews::orchestrator::{CrewOrchestrator, CrewStatus, GenerateOutcome};
pub use llms::base_llm::BaseLLM;
pub use memory::storage::PromptStore;
pub use process::Process;
pub use rag::embeddings::Embedder;
pub use task::Task;
pub use tasks::task_output::TaskOutput;
pub use utilities::errors::{CrewError, Result};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
