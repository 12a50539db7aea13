//! # Focusflow Core Library
//!
//! This library implements a Pomodoro-style focus session scheduler: a
//! tick-driven work/break state machine, per-day productivity statistics,
//! a task ledger, deterministic rule-based insights, and best-effort
//! key-value persistence. Presentation layers (GUI, TUI, widgets) sit on
//! top of this crate and only issue commands and observe snapshots.
//!
//! ## Architecture
//!
//! - **Session Engine**: a synchronous state machine; the driver invokes
//!   `tick()` once per second while running
//! - **Statistics**: one append-only record per calendar day, plus a
//!   trailing 7-day window for weekly goals and insight rules
//! - **Storage**: SQLite-backed key-value blob store behind a small trait,
//!   with a deliberate best-effort save policy
//! - **Driver**: a tokio actor that serializes commands and ticks onto one
//!   controller and publishes state snapshots over a watch channel
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: core timer state machine
//! - [`SessionController`]: commands plus statistics/persistence/insight
//!   bookkeeping
//! - [`SessionDriver`]: async tick source and command queue
//! - [`PersistenceGateway`]: structured records over a [`BlobStore`]

pub mod controller;
pub mod driver;
pub mod error;
pub mod events;
pub mod insights;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use controller::{PendingAutoStart, SessionController};
pub use driver::{AUTO_START_GRACE, Command, SessionDriver};
pub use error::{CoreError, SettingsError, StorageError};
pub use events::{Event, Snapshot};
pub use insights::{Insight, InsightKind, InsightPriority};
pub use session::{FocusSession, SessionType};
pub use settings::Settings;
pub use stats::{DailyStats, StatsStore};
pub use storage::{BlobStore, Database, MemoryStore, PersistenceGateway};
pub use task::{ProductivityTask, Subtask, TaskCategory, TaskLedger, TaskPriority};
pub use timer::{SessionEngine, TimerState};
