mod database;
mod gateway;
mod memory;

pub use database::Database;
pub use gateway::{daily_stats_key, PersistenceGateway, HISTORY_KEY, SETTINGS_KEY, TASKS_KEY};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// String-keyed blob store the persistence gateway writes through.
///
/// Implementations must be cheap to call from the driver task; the gateway
/// never reads back what it just wrote.
pub trait BlobStore: Send {
    /// Fetch a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Shared stores work anywhere an owned one does.
impl<T: BlobStore + Sync> BlobStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Returns `~/.config/focusflow[-dev]/` based on FOCUSFLOW_ENV.
///
/// Set FOCUSFLOW_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusflow-dev")
    } else {
        base_dir.join("focusflow")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
