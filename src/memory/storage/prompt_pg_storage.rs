//! PostgreSQL prompt store using the pgvector extension.
//!
//! Requires the `postgres` feature flag. Similarity search runs in the
//! database with the cosine distance operator `<=>`.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::interface::{PromptRecord, PromptStore, SimilarityMatch};
use crate::crews::definitions::AgentDefinition;
use crate::utilities::errors::{CrewError, Result};

/// Prompt store on a pgvector-enabled Postgres database.
#[derive(Debug, Clone)]
pub struct PgPromptStore {
    pool: PgPool,
}

impl PgPromptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `uri` and create the table if needed.
    pub async fn connect(uri: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(uri).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prompt_records (
                id BIGSERIAL PRIMARY KEY,
                crew_id TEXT NOT NULL,
                prompt TEXT NOT NULL,
                embedding vector NOT NULL,
                agents JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_prompt_records_crew_id ON prompt_records (crew_id)")
            .execute(&self.pool)
            .await?;

        log::debug!("Prompt store tables migrated");
        Ok(())
    }
}

/// pgvector text literal, e.g. `[0.1,0.2]`.
fn vector_literal(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}

#[async_trait]
impl PromptStore for PgPromptStore {
    async fn find_similar(&self, query: &[f32], threshold: f64) -> Result<Option<SimilarityMatch>> {
        let row = sqlx::query(
            r#"
            SELECT crew_id, prompt, agents,
                   (1 - (embedding <=> $1::vector))::float8 AS similarity
            FROM prompt_records
            ORDER BY embedding <=> $1::vector
            LIMIT 1
            "#,
        )
        .bind(vector_literal(query))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let similarity = row.try_get::<f64, _>("similarity")?.clamp(0.0, 1.0);
        if similarity < threshold {
            log::debug!(
                "Closest prompt scored {:.4}, below threshold {:.2}",
                similarity,
                threshold
            );
            return Ok(None);
        }

        let agents: serde_json::Value = row.try_get("agents")?;
        let agents: Vec<AgentDefinition> = serde_json::from_value(agents)
            .map_err(|e| CrewError::Store(format!("corrupt prompt record: {}", e)))?;

        Ok(Some(SimilarityMatch {
            crew_id: row.try_get("crew_id")?,
            prompt: row.try_get("prompt")?,
            agents,
            similarity,
        }))
    }

    async fn save(&self, record: PromptRecord) -> Result<()> {
        let agents = serde_json::to_value(&record.agents)
            .map_err(|e| CrewError::Store(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO prompt_records (crew_id, prompt, embedding, agents, created_at)
            VALUES ($1, $2, $3::vector, $4, $5)
            "#,
        )
        .bind(&record.crew_id)
        .bind(&record.prompt)
        .bind(vector_literal(&record.embedding))
        .bind(agents)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, crew_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM prompt_records
            WHERE id = (SELECT id FROM prompt_records WHERE crew_id = $1 LIMIT 1)
            "#,
        )
        .bind(crew_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    fn backend(&self) -> &str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_literal() {
        assert_eq!(vector_literal(&[0.5, -1.0, 0.0]), "[0.5,-1,0]");
        assert_eq!(vector_literal(&[]), "[]");
    }
}
