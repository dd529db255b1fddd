//! Agent module.
//!
//! Contains the executable [`Agent`](core::Agent) and the prompt helpers it
//! uses.

pub mod core;
pub mod utils;

pub use self::core::Agent;
