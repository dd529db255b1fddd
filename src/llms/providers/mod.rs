//! LLM provider implementations.
//!
//! Each provider implements [`BaseLLM`](crate::llms::base_llm::BaseLLM) and
//! handles authentication, request formatting and response parsing for its
//! API.

pub mod gemini;

pub use gemini::{GeminiCompletion, GenerationConfig};
