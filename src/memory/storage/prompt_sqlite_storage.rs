//! SQLite prompt store.
//!
//! Embeddings and agents are stored as JSON text. Lookups load every
//! embedding and scan them in process, which is fine for the few thousand
//! prompts a single service accumulates.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::interface::{best_match, PromptRecord, PromptStore, SimilarityMatch};
use crate::utilities::errors::{CrewError, Result};

/// Prompt store backed by a single SQLite file.
#[derive(Debug, Clone)]
pub struct SqlitePromptStore {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl SqlitePromptStore {
    /// Open (and create if needed) the database at `db_path`.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let storage = Self { db_path };
        storage.initialize_db()?;
        Ok(storage)
    }

    fn initialize_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path).map_err(|e| {
            log::error!(
                "PROMPT STORE ERROR: An error occurred during database initialization: {}",
                e
            );
            CrewError::from(e)
        })?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS prompts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                crew_id TEXT NOT NULL,
                prompt TEXT NOT NULL,
                embedding TEXT NOT NULL,
                agents TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_prompts_crew_id ON prompts (crew_id)",
            [],
        )?;
        Ok(())
    }

    /// Run `f` on a fresh connection off the async runtime.
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            f(&conn)
        })
        .await
        .map_err(|e| CrewError::Store(format!("prompt store task failed: {}", e)))?
    }

    fn load_all(conn: &Connection) -> Result<Vec<PromptRecord>> {
        let mut stmt = conn.prepare(
            "SELECT crew_id, prompt, embedding, agents, created_at FROM prompts ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (crew_id, prompt, embedding, agents, created_at) = row?;
            records.push(PromptRecord {
                crew_id,
                prompt,
                embedding: serde_json::from_str(&embedding).map_err(json_error)?,
                agents: serde_json::from_str(&agents).map_err(json_error)?,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| CrewError::Store(format!("bad created_at '{}': {}", created_at, e)))?,
            });
        }
        Ok(records)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

fn json_error(err: serde_json::Error) -> CrewError {
    CrewError::Store(format!("corrupt prompt record: {}", err))
}

#[async_trait]
impl PromptStore for SqlitePromptStore {
    async fn find_similar(&self, query: &[f32], threshold: f64) -> Result<Option<SimilarityMatch>> {
        let query = query.to_vec();
        self.with_connection(move |conn| {
            let records = Self::load_all(conn)?;
            Ok(best_match(&records, &query, threshold))
        })
        .await
    }

    async fn save(&self, record: PromptRecord) -> Result<()> {
        let embedding = serde_json::to_string(&record.embedding).map_err(json_error)?;
        let agents = serde_json::to_string(&record.agents).map_err(json_error)?;
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO prompts (crew_id, prompt, embedding, agents, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.crew_id,
                    record.prompt,
                    embedding,
                    agents,
                    record.created_at.to_rfc3339()
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, crew_id: &str) -> Result<bool> {
        let crew_id = crew_id.to_string();
        self.with_connection(move |conn| {
            let removed = conn.execute(
                "DELETE FROM prompts WHERE id = (SELECT id FROM prompts WHERE crew_id = ?1 LIMIT 1)",
                params![crew_id],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    fn backend(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crews::definitions::AgentDefinition;

    fn agents() -> Vec<AgentDefinition> {
        vec![AgentDefinition {
            role: "Poet".into(),
            goal: "Write".into(),
            backstory: "Sea".into(),
        }]
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prompts.db");

        let store = SqlitePromptStore::new(&path).unwrap();
        store
            .save(PromptRecord::new("haiku", vec![0.6, 0.8], "c1", agents()))
            .await
            .unwrap();

        let reopened = SqlitePromptStore::new(&path).unwrap();
        let found = reopened.find_similar(&[0.6, 0.8], 0.9).await.unwrap().unwrap();
        assert_eq!(found.crew_id, "c1");
        assert_eq!(found.prompt, "haiku");
        assert_eq!(found.agents, agents());
        assert!(found.similarity > 0.99);
    }

    #[tokio::test]
    async fn test_below_threshold_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqlitePromptStore::new(dir.path().join("p.db")).unwrap();
        store
            .save(PromptRecord::new("a", vec![1.0, 0.0], "c1", vec![]))
            .await
            .unwrap();
        assert!(store.find_similar(&[0.0, 1.0], 0.9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqlitePromptStore::new(dir.path().join("p.db")).unwrap();
        store
            .save(PromptRecord::new("a", vec![1.0, 0.0], "c1", vec![]))
            .await
            .unwrap();

        assert!(store.delete("c1").await.unwrap());
        assert!(!store.delete("c1").await.unwrap());
        assert!(store.find_similar(&[1.0, 0.0], 0.0).await.unwrap().is_none());
    }
}
