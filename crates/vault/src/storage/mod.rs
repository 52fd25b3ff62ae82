//! Persistence of [`ProtectedRecord`]s by surrogate id.
//!
//! # Module invariants
//!
//! - **Opaque fields.** Backends store and return `user_document` /
//!   `card_token` exactly as given; they never inspect, encrypt or decrypt.
//! - **No crypto dependencies.** This module must not import anything from
//!   `crate::crypto`.
//! - Surrogate ids are assigned on [`RecordRepository::add`], start at 1 and
//!   are never reused within a backend.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::record::ProtectedRecord;

/// Errors produced by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An update or delete targeted a record that is no longer stored.
    #[error("record {0} does not exist")]
    Missing(i64),

    /// The underlying engine reported a failure.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    TaskJoin(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}

/// Storage collaborator for [`ProtectedRecord`]s.
///
/// Calls may block on I/O; callers must not hold locks across them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Insert `record`, ignoring its `id`, and return it with the assigned id.
    async fn add(&self, record: ProtectedRecord) -> Result<ProtectedRecord, StorageError>;

    /// Fetch a record, or `None` if no record has this id.
    async fn get_by_id(&self, id: i64) -> Result<Option<ProtectedRecord>, StorageError>;

    /// Fetch every stored record in id order.
    async fn get_all(&self) -> Result<Vec<ProtectedRecord>, StorageError>;

    /// Overwrite the stored record with the same id.
    async fn update(&self, record: ProtectedRecord) -> Result<(), StorageError>;

    /// Remove the stored record with the same id.
    async fn delete(&self, record: ProtectedRecord) -> Result<(), StorageError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, StorageError>;
}

/// Open the backend selected by `cfg`.
///
/// # Errors
///
/// Returns an error if the SQLite database cannot be opened or its schema
/// cannot be created.
pub fn open(cfg: &Config) -> Result<Arc<dyn RecordRepository>> {
    match cfg.storage_backend {
        StorageBackend::Memory => {
            info!(backend = "memory", "storage opened; records will not survive a restart");
            Ok(Arc::new(MemoryRepository::new()))
        }
        StorageBackend::Sqlite => {
            let repo = SqliteRepository::open(&cfg.database_path)
                .with_context(|| format!("failed to open SQLite database at {}", cfg.database_path))?;
            info!(backend = "sqlite", path = %cfg.database_path, "storage opened");
            Ok(Arc::new(repo))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rusqlite_errors_become_backend_errors() {
        let e: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(e, StorageError::Backend(_)));
    }

    #[test]
    fn missing_names_the_id() {
        assert!(StorageError::Missing(42).to_string().contains("42"));
    }

    fn config_with(backend: StorageBackend, database_path: String) -> Config {
        Config {
            encryption_key: "0123456789abcdef0123456789abcdef".into(),
            initialization_vector: "abcdef9876543210".into(),
            listen_port: 8080,
            storage_backend: backend,
            database_path,
            otel_exporter_otlp_endpoint: None,
            log_level: "info".into(),
        }
    }

    #[tokio::test]
    async fn open_memory_backend() {
        let repo = open(&config_with(StorageBackend::Memory, String::new())).unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn open_sqlite_backend_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        let cfg = config_with(StorageBackend::Sqlite, path.to_string_lossy().into_owned());

        let repo = open(&cfg).unwrap();
        repo.add(ProtectedRecord::new("d", "c", 1)).await.unwrap();
        assert!(path.exists());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[test]
    fn open_sqlite_in_missing_directory_fails() {
        let cfg = config_with(
            StorageBackend::Sqlite,
            "/nonexistent-dir/for/vault/records.db".into(),
        );
        assert!(open(&cfg).is_err());
    }
}
