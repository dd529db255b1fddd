//! LLM clients.
//!
//! - [`base_llm`] - The trait every generative-model client implements
//! - [`providers`] - Concrete provider implementations (Gemini)

pub mod base_llm;
pub mod providers;

pub use base_llm::{BaseLLM, LLMMessage, MessageRole};
