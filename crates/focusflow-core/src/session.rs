//! Session types: the phase enum and the per-run session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Segment of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn is_break(&self) -> bool {
        matches!(self, SessionType::ShortBreak | SessionType::LongBreak)
    }

    /// Stable label used as the session-count key in daily statistics.
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "short_break",
            SessionType::LongBreak => "long_break",
        }
    }
}

/// One timed run of a single phase.
///
/// A session is created when the timer starts and finalized exactly once --
/// at natural completion, at skip, or at pause (a pause finalizes the
/// partial run with `was_completed = false`). Finalized sessions are
/// appended to history and never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    /// Task this run was linked to, if any.
    pub task_id: Option<String>,
    pub session_type: SessionType,
    /// Configured phase length at the time the run began, in minutes.
    pub planned_minutes: u32,
    pub started_at: DateTime<Utc>,
    /// Present once the session is finalized.
    pub ended_at: Option<DateTime<Utc>>,
    /// True only when the run reached the phase boundary (naturally or via
    /// skip), never for abandoned runs.
    pub was_completed: bool,
    /// True elapsed time of the run in whole minutes, computed at
    /// finalization.
    pub actual_minutes: u32,
    pub distractions: u32,
    /// Optional productivity self-rating, 1-5.
    pub rating: Option<u8>,
}

impl FocusSession {
    /// Begin a new run of `session_type` with the given planned length.
    pub fn begin(session_type: SessionType, planned_minutes: u32, task_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("session-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            task_id,
            session_type,
            planned_minutes,
            started_at: now,
            ended_at: None,
            was_completed: false,
            actual_minutes: 0,
            distractions: 0,
            rating: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Finalize the run with its true elapsed seconds.
    ///
    /// Elapsed time is credited as whole minutes (floor). Idempotence is the
    /// caller's concern: the engine finalizes each session exactly once.
    pub(crate) fn finalize(&mut self, completed: bool, elapsed_secs: u32, at: DateTime<Utc>) {
        self.ended_at = Some(at);
        self.was_completed = completed;
        self.actual_minutes = elapsed_secs / 60;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_creates_unfinalized_session() {
        let s = FocusSession::begin(SessionType::Work, 25, None);
        assert_eq!(s.session_type, SessionType::Work);
        assert_eq!(s.planned_minutes, 25);
        assert!(!s.is_finalized());
        assert!(!s.was_completed);
        assert_eq!(s.distractions, 0);
        assert!(s.rating.is_none());
    }

    #[test]
    fn finalize_records_elapsed_minutes() {
        let mut s = FocusSession::begin(SessionType::Work, 25, None);
        s.finalize(true, 25 * 60, Utc::now());
        assert!(s.is_finalized());
        assert!(s.was_completed);
        assert_eq!(s.actual_minutes, 25);
    }

    #[test]
    fn finalize_floors_partial_minutes() {
        let mut s = FocusSession::begin(SessionType::Work, 25, None);
        s.finalize(false, 10 * 60 + 59, Utc::now());
        assert_eq!(s.actual_minutes, 10);
    }

    #[test]
    fn session_ids_are_unique() {
        let a = FocusSession::begin(SessionType::Work, 25, None);
        let b = FocusSession::begin(SessionType::Work, 25, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serialization_roundtrip() {
        let mut s = FocusSession::begin(SessionType::LongBreak, 15, Some("task-1".into()));
        s.finalize(true, 900, Utc::now());
        let json = serde_json::to_string(&s).unwrap();
        let decoded: FocusSession = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, s);
    }
}
