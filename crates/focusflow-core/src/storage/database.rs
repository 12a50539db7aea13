//! SQLite-backed blob store.
//!
//! A single `kv(key, value)` table holds every persisted record: settings,
//! the task union, per-day statistics and the session history. The database
//! lives at `~/.config/focusflow/focusflow.db`.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use super::{data_dir, BlobStore};
use crate::error::StorageError;

/// SQLite key-value store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the given path, creating file and schema as
    /// needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open the database at its default location under the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory or database is unavailable.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::OpenFailed {
            path: PathBuf::from("~/.config/focusflow"),
            source: rusqlite::Error::InvalidPath(PathBuf::from(e.to_string())),
        })?;
        Self::open(dir.join("focusflow.db"))
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl BlobStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
