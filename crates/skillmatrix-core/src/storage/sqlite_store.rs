//! SqliteKvStore: SQLite WAL key-value table
//!
//! - WAL mode: readers never block the single writer
//! - Full-value upserts: one row per key, replaced on every write
//! - Integrity: Blake3 hash stored next to each value and verified on read

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;

use super::KeyValueStore;
use crate::error::{MatrixError, Result, ResultExt};

/// Metadata of a stored entry, without the value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    pub key: String,
    pub integrity_hash: String,
    pub saved_at_ms: i64,
    pub size: usize,
}

/// SQLite-backed [`KeyValueStore`]
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKvStore").finish_non_exhaustive()
    }
}

impl SqliteKvStore {
    /// Open (or create) the database in WAL mode.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path != Path::new(":memory:") {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Creating database directory '{}'", parent.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Opening SQLite '{}'", path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("Configuring SQLite WAL pragmas")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Idempotent DDL
    fn migrate(&self) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS kv_entries (
                key            TEXT PRIMARY KEY,
                value          TEXT NOT NULL,
                integrity_hash TEXT NOT NULL,
                saved_at_ms    INTEGER NOT NULL
            );
            ",
            )
            .context("Migrating SQLite schema")?;
        Ok(())
    }

    /// Metadata for every entry, ordered by key
    pub fn entries(&self) -> Result<Vec<EntryInfo>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT key, integrity_hash, saved_at_ms, length(value)
             FROM kv_entries ORDER BY key",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let size: i64 = row.get(3)?;
                Ok(EntryInfo {
                    key: row.get(0)?,
                    integrity_hash: row.get(1)?,
                    saved_at_ms: row.get(2)?,
                    size: usize::try_from(size).unwrap_or_default(),
                })
            })
            .context("Query kv_entries")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Collecting kv_entries")
    }

    fn hash(value: &str) -> String {
        hex::encode(blake3::hash(value.as_bytes()).as_bytes())
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT value, integrity_hash FROM kv_entries WHERE key = ?1",
                params![key],
                |row| {
                    let value: String = row.get(0)?;
                    let hash: String = row.get(1)?;
                    Ok((value, hash))
                },
            )
            .optional()
            .with_context(|| format!("Query kv_entries '{}'", key))?;

        match row {
            Some((value, stored_hash)) => {
                let actual_hash = Self::hash(&value);
                if actual_hash != stored_hash {
                    return Err(MatrixError::Corrupted {
                        key: key.to_string(),
                        expected: stored_hash,
                        actual: actual_hash,
                    });
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let saved_at_ms = chrono::Utc::now().timestamp_millis();
        self.conn
            .lock()
            .execute(
                "INSERT INTO kv_entries (key, value, integrity_hash, saved_at_ms)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    integrity_hash = excluded.integrity_hash,
                    saved_at_ms = excluded.saved_at_ms",
                params![key, value, Self::hash(value), saved_at_ms],
            )
            .with_context(|| format!("UPSERT kv_entries '{}'", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
            .with_context(|| format!("DELETE kv_entries '{}'", key))?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT key FROM kv_entries ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("Query kv_entries keys")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Collecting kv_entries keys")
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
