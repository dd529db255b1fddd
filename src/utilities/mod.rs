//! Utility modules: configuration, errors and string helpers.

pub mod config;
pub mod errors;
pub mod string_utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ServiceConfig;
pub use errors::{CrewError, Result};
