//! [`SqliteRepository`]: durable record storage on a single SQLite file.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{RecordRepository, StorageError};
use crate::record::ProtectedRecord;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS protected_records (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_document TEXT    NOT NULL,
    card_token    TEXT    NOT NULL,
    value         INTEGER NOT NULL
);";

const RECORD_SELECT_SQL: &str = "SELECT id, user_document, card_token, value FROM protected_records";

/// SQLite-backed [`RecordRepository`].
///
/// The connection sits behind a mutex and every call runs on the blocking
/// thread pool, so the async runtime never waits on disk I/O. `AUTOINCREMENT`
/// keeps ids from being reused after deletes.
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Open (or create) a database file and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the file cannot be opened or the
    /// schema statement fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::bootstrap(Connection::open(path)?)
    }

    /// Open a private in-memory database. Contents vanish on drop.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            op(&guard)
        })
        .await
        .map_err(|e| StorageError::TaskJoin(e.to_string()))?
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ProtectedRecord> {
    Ok(ProtectedRecord {
        id: row.get(0)?,
        user_document: row.get(1)?,
        card_token: row.get(2)?,
        value: row.get(3)?,
    })
}

#[async_trait]
impl RecordRepository for SqliteRepository {
    async fn add(&self, record: ProtectedRecord) -> Result<ProtectedRecord, StorageError> {
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO protected_records (user_document, card_token, value) VALUES (?1, ?2, ?3)",
                params![record.user_document, record.card_token, record.value],
            )?;
            Ok(record.with_id(conn.last_insert_rowid()))
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ProtectedRecord>, StorageError> {
        self.run(move |conn| {
            let sql = format!("{RECORD_SELECT_SQL} WHERE id = ?1");
            Ok(conn
                .query_row(&sql, params![id], record_from_row)
                .optional()?)
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<ProtectedRecord>, StorageError> {
        self.run(|conn| {
            let sql = format!("{RECORD_SELECT_SQL} ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    async fn update(&self, record: ProtectedRecord) -> Result<(), StorageError> {
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE protected_records SET user_document = ?1, card_token = ?2, value = ?3 WHERE id = ?4",
                params![record.user_document, record.card_token, record.value, record.id],
            )?;
            if changed == 0 {
                return Err(StorageError::Missing(record.id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, record: ProtectedRecord) -> Result<(), StorageError> {
        self.run(move |conn| {
            let changed = conn.execute("DELETE FROM protected_records WHERE id = ?1", params![record.id])?;
            if changed == 0 {
                return Err(StorageError::Missing(record.id));
            }
            Ok(())
        })
        .await
    }

    async fn count(&self) -> Result<usize, StorageError> {
        self.run(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM protected_records", [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or_default())
        })
        .await
    }
}
