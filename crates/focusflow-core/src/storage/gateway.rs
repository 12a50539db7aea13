//! Persistence gateway: structured records over the blob store.
//!
//! Records round-trip through JSON with stable field names. Loads fall back
//! to the type's default for missing or corrupt payloads; saves are
//! best-effort -- failures are logged and swallowed, and in-memory state
//! stays authoritative for the process lifetime.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::BlobStore;
use crate::error::StorageError;
use crate::session::FocusSession;
use crate::settings::Settings;
use crate::stats::DailyStats;
use crate::task::ProductivityTask;

pub const SETTINGS_KEY: &str = "settings";
/// Full open+completed union of the task ledger.
pub const TASKS_KEY: &str = "tasks";
/// Append-only ordered sequence of finalized sessions.
pub const HISTORY_KEY: &str = "session_history";

/// Key for one day's statistics record.
pub fn daily_stats_key(date: NaiveDate) -> String {
    format!("daily_stats:{}", date.format("%Y-%m-%d"))
}

/// Serializes engine state to, and restores it from, a [`BlobStore`].
pub struct PersistenceGateway<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Loads: default on missing or corrupt ─────────────────────────

    pub fn load_settings(&self) -> Settings {
        // A record that parses but fails validation (zero durations) is as
        // unusable as a corrupt one.
        let settings: Settings = self.load(SETTINGS_KEY);
        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "persisted settings fail validation, using defaults");
                Settings::default()
            }
        }
    }

    pub fn load_tasks(&self) -> Vec<ProductivityTask> {
        self.load(TASKS_KEY)
    }

    pub fn load_daily_stats(&self, date: NaiveDate) -> DailyStats {
        self.load(&daily_stats_key(date))
    }

    pub fn load_history(&self) -> Vec<FocusSession> {
        self.load(HISTORY_KEY)
    }

    // ── Saves: best-effort ───────────────────────────────────────────

    pub fn save_settings(&self, settings: &Settings) {
        self.save(SETTINGS_KEY, settings);
    }

    pub fn save_tasks(&self, tasks: &[ProductivityTask]) {
        self.save(TASKS_KEY, &tasks);
    }

    pub fn save_daily_stats(&self, date: NaiveDate, stats: &DailyStats) {
        self.save(&daily_stats_key(date), stats);
    }

    pub fn save_history(&self, history: &[FocusSession]) {
        self.save(HISTORY_KEY, &history);
    }

    // ── Fallible variants for callers that care ──────────────────────

    /// # Errors
    /// Returns the encoding or store failure a best-effort save would have
    /// swallowed.
    pub fn try_save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let payload = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &payload)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.get(key) {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "corrupt persisted record, using default");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted record, using default");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            tracing::warn!(key, error = %e, "best-effort save failed, in-memory state stays authoritative");
        }
    }
}
