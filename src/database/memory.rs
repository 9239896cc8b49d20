use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::accessor::{AccessorError, DataAccessor, Entity};

/// Process-local accessor backing the `memory` storage mode and tests
pub struct MemoryAccessor<T> {
    records: RwLock<HashMap<String, T>>,
}

impl<T: Entity> MemoryAccessor<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Pre-populated accessor. Records with an empty id get a fresh one.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                if record.id().is_empty() {
                    record.assign_id(Uuid::new_v4().to_string());
                }
                (record.id().to_string(), record)
            })
            .collect();

        Self {
            records: RwLock::new(records),
        }
    }

    /// Stored record regardless of its soft-delete flag
    pub async fn raw(&self, id: &str) -> Option<T> {
        self.records.read().await.get(id).cloned()
    }
}

impl<T: Entity> Default for MemoryAccessor<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> DataAccessor<T> for MemoryAccessor<T> {
    async fn get_by_id(&self, id: &str) -> Result<Option<T>, AccessorError> {
        let records = self.records.read().await;
        Ok(records.get(id).filter(|r| !r.is_deleted()).cloned())
    }

    async fn get_some_by_substring(
        &self,
        pattern: &str,
        limit: Option<usize>,
    ) -> Result<Vec<T>, AccessorError> {
        let records = self.records.read().await;
        let mut matches: Vec<T> = records
            .values()
            .filter(|r| !r.is_deleted() && r.search_key().contains(pattern))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.search_key().cmp(b.search_key()));
        if let Some(limit) = limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }

    async fn create_or_update(&self, mut entity: T) -> Result<Option<T>, AccessorError> {
        let mut records = self.records.write().await;

        if !entity.is_deleted() {
            let taken = records.values().any(|r| {
                !r.is_deleted() && r.id() != entity.id() && r.search_key() == entity.search_key()
            });
            if taken {
                return Err(AccessorError::Conflict(format!(
                    "{} '{}' already exists",
                    T::KIND,
                    entity.search_key()
                )));
            }
        }

        if entity.id().is_empty() {
            entity.assign_id(Uuid::new_v4().to_string());
        }
        records.insert(entity.id().to_string(), entity.clone());
        Ok(Some(entity))
    }
}
