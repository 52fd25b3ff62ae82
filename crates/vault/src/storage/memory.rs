//! [`MemoryRepository`]: process-local record storage.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordRepository, StorageError};
use crate::record::ProtectedRecord;

#[derive(Debug, Default)]
struct MemoryState {
    rows: BTreeMap<i64, ProtectedRecord>,
    last_id: i64,
}

/// Thread-safe in-memory [`RecordRepository`].
///
/// Wraps an `Arc<RwLock<_>>` so clones share the same rows. Reads take a
/// shared lock; writes take the exclusive lock only for the map mutation.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    inner: Arc<RwLock<MemoryState>>,
}

impl MemoryRepository {
    /// Create a new, empty [`MemoryRepository`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordRepository for MemoryRepository {
    async fn add(&self, mut record: ProtectedRecord) -> Result<ProtectedRecord, StorageError> {
        let mut state = self.inner.write().await;
        state.last_id += 1;
        record.id = state.last_id;
        state.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ProtectedRecord>, StorageError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<ProtectedRecord>, StorageError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, record: ProtectedRecord) -> Result<(), StorageError> {
        let mut state = self.inner.write().await;
        match state.rows.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StorageError::Missing(record.id)),
        }
    }

    async fn delete(&self, record: ProtectedRecord) -> Result<(), StorageError> {
        let mut state = self.inner.write().await;
        state
            .rows
            .remove(&record.id)
            .map(|_| ())
            .ok_or(StorageError::Missing(record.id))
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.inner.read().await.rows.len())
    }
}
