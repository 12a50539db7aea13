use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::Insight;
use crate::session::{FocusSession, SessionType};
use crate::stats::DailyStats;
use crate::timer::TimerState;

/// Every state change in the engine produces an Event.
///
/// The driver publishes snapshots after handling each event; side effects
/// (statistics, persistence, insight regeneration) are applied by the
/// controller from the event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        phase: SessionType,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The run segment finalized by the pause, for history.
    SessionPaused {
        phase: SessionType,
        remaining_secs: u32,
        session: FocusSession,
        at: DateTime<Utc>,
    },
    /// Current phase restored to its full duration; any live session
    /// discarded without being recorded.
    TimerReset {
        phase: SessionType,
        at: DateTime<Utc>,
    },
    /// Reset plus phase forced back to Work and the session-scoped pomodoro
    /// counter zeroed.
    AllReset {
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        at: DateTime<Utc>,
    },
    /// A phase ran to its boundary, naturally or via skip.
    PhaseCompleted {
        phase: SessionType,
        /// Finalized session for history; absent when the phase completed
        /// without a live run segment (skip from idle).
        session: Option<FocusSession>,
        /// Session-scoped pomodoro count, post-increment.
        completed_pomodoros: u32,
        next_phase: SessionType,
        next_remaining_secs: u32,
        /// Whether settings request an automatic start of the next phase.
        auto_start: bool,
        at: DateTime<Utc>,
    },
}

/// Full observable state, published to subscribers after each command or
/// tick returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: TimerState,
    pub phase: SessionType,
    pub remaining_secs: u32,
    pub is_running: bool,
    /// Session-scoped completed pomodoros (reset by `reset_all`).
    pub completed_pomodoros: u32,
    pub today: DailyStats,
    pub daily_goal_progress: f64,
    pub weekly_goal_progress: f64,
    pub insights: Vec<Insight>,
    pub at: DateTime<Utc>,
}
