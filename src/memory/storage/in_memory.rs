//! Process-local prompt store, used for `memory://` and in tests.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::interface::{best_match, PromptRecord, PromptStore, SimilarityMatch};
use crate::utilities::errors::Result;

/// Prompt records kept in a vector, scanned on every lookup.
#[derive(Debug, Default)]
pub struct InMemoryPromptStore {
    records: RwLock<Vec<PromptRecord>>,
}

impl InMemoryPromptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl PromptStore for InMemoryPromptStore {
    async fn find_similar(&self, query: &[f32], threshold: f64) -> Result<Option<SimilarityMatch>> {
        Ok(best_match(self.records.read().iter(), query, threshold))
    }

    async fn save(&self, record: PromptRecord) -> Result<()> {
        self.records.write().push(record);
        Ok(())
    }

    async fn delete(&self, crew_id: &str) -> Result<bool> {
        let mut records = self.records.write();
        match records.iter().position(|r| r.crew_id == crew_id) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn backend(&self) -> &str {
        "memory"
    }
}
