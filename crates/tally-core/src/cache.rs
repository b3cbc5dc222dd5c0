//! Durable cache mirror.
//!
//! Write-through persistence for dataset snapshots: after every committed
//! store change the full record collection is serialized under its dataset
//! key, fully overwriting the prior snapshot. Read on load when the remote
//! store is unreachable or empty, and as last resort when a load attempt
//! fails. No versioning.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CacheError;

/// SQLite-backed mirror, one row per dataset key.
pub struct CacheMirror {
    conn: Mutex<Connection>,
}

impl CacheMirror {
    /// Open (or create) the mirror database at the given path.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path)
            .map_err(|e| CacheError::Storage(format!("open: {}", e)))?;
        Self::init_with_connection(conn)
    }

    /// Create an in-memory mirror (for testing).
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CacheError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS dataset_mirror (
                cache_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                saved_at INTEGER NOT NULL
            );
            ",
        )
        .map_err(|e| CacheError::Storage(format!("init_schema: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Overwrite the snapshot stored under `key` with the full collection.
    pub fn store<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), CacheError> {
        let payload = serde_json::to_string(records)?;
        let conn = self.conn.lock().expect("cache mirror lock poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO dataset_mirror (cache_key, payload, saved_at)
             VALUES (?1, ?2, ?3)",
            params![key, payload, Utc::now().timestamp_millis()],
        )
        .map_err(|e| CacheError::Storage(format!("store {}: {}", key, e)))?;
        Ok(())
    }

    /// Read the snapshot stored under `key`, if any.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>, CacheError> {
        let conn = self.conn.lock().expect("cache mirror lock poisoned");
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM dataset_mirror WHERE cache_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| CacheError::Storage(format!("load {}: {}", key, e)))?;
        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}
