//! Storage backends for remembered prompts.

pub mod in_memory;
pub mod interface;
#[cfg(feature = "postgres")]
pub mod prompt_pg_storage;
pub mod prompt_sqlite_storage;

use std::sync::Arc;

pub use in_memory::InMemoryPromptStore;
pub use interface::{PromptRecord, PromptStore, SimilarityMatch};
#[cfg(feature = "postgres")]
pub use prompt_pg_storage::PgPromptStore;
pub use prompt_sqlite_storage::SqlitePromptStore;

use crate::utilities::errors::{CrewError, Result};

/// Open the store named by a connection string.
///
/// Supported: `memory://`, `sqlite://<path>` (or `sqlite:<path>`) and, with
/// the `postgres` feature, `postgres://...` / `postgresql://...`.
pub async fn open_store(uri: &str) -> Result<Arc<dyn PromptStore>> {
    if uri.starts_with("memory:") {
        return Ok(Arc::new(InMemoryPromptStore::new()));
    }

    if let Some(path) = uri
        .strip_prefix("sqlite://")
        .or_else(|| uri.strip_prefix("sqlite:"))
    {
        if path.is_empty() {
            return Err(CrewError::Config("sqlite store URI has no path".to_string()));
        }
        return Ok(Arc::new(SqlitePromptStore::new(path)?));
    }

    if uri.starts_with("postgres://") || uri.starts_with("postgresql://") {
        return open_postgres(uri).await;
    }

    Err(CrewError::Config(format!(
        "Unsupported store URI scheme in '{}'. Use memory://, sqlite:// or postgres://",
        uri.split("://").next().unwrap_or(uri)
    )))
}

#[cfg(feature = "postgres")]
async fn open_postgres(uri: &str) -> Result<Arc<dyn PromptStore>> {
    Ok(Arc::new(PgPromptStore::connect(uri).await?))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_uri: &str) -> Result<Arc<dyn PromptStore>> {
    Err(CrewError::Config(
        "postgres store requested but the crate was built without the `postgres` feature"
            .to_string(),
    ))
}
