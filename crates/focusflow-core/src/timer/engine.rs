//! Session state machine.
//!
//! The engine is a synchronous state machine with no internal thread -- the
//! driver calls `tick()` once per second while Running. Because `tick()`
//! checks the state at dispatch and every command transitions the state
//! before returning, no tick can be observed after `pause()` or `reset()`
//! returns; there is no "one more decrement" race.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running
//!            |
//!            v (remaining hits 0, or skip from any state)
//!     phase completed -> Idle (next phase armed)
//! ```
//!
//! Invalid commands in the current state (`pause()` while Idle, `start()`
//! while Running) return `None` and change nothing.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::events::Event;
use crate::session::{FocusSession, SessionType};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Core session state machine.
///
/// Owns the current phase, the countdown, the live [`FocusSession`] record
/// and the session-scoped pomodoro counter.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    settings: Settings,
    state: TimerState,
    phase: SessionType,
    /// Remaining time in seconds for the current phase.
    remaining_secs: u32,
    /// Remaining seconds at the moment the live run segment began; elapsed
    /// time is the difference against `remaining_secs`.
    segment_start_secs: u32,
    /// Work phases completed since start (or the last `reset_all`).
    completed_pomodoros: u32,
    current: Option<FocusSession>,
    /// Task linked to sessions created from now on.
    active_task_id: Option<String>,
}

impl SessionEngine {
    /// Create an engine in Idle with a full Work phase armed.
    pub fn new(settings: Settings) -> Self {
        let remaining_secs = settings.phase_secs(SessionType::Work);
        Self {
            settings,
            state: TimerState::Idle,
            phase: SessionType::Work,
            remaining_secs,
            segment_start_secs: remaining_secs,
            completed_pomodoros: 0,
            current: None,
            active_task_id: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> SessionType {
        self.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn completed_pomodoros(&self) -> u32 {
        self.completed_pomodoros
    }

    pub fn current_session(&self) -> Option<&FocusSession> {
        self.current.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// True elapsed seconds of the live run segment, 0 without one.
    fn elapsed_secs(&self) -> u32 {
        if self.current.is_some() {
            self.segment_start_secs.saturating_sub(self.remaining_secs)
        } else {
            0
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume the timer. No-op while Running.
    ///
    /// A new session record is created whenever none is live -- resuming
    /// after a pause opens a fresh segment, since the paused one was
    /// already finalized.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                if self.current.is_none() {
                    self.current = Some(FocusSession::begin(
                        self.phase,
                        self.settings.phase_minutes(self.phase),
                        self.active_task_id.clone(),
                    ));
                    self.segment_start_secs = self.remaining_secs;
                }
                self.state = TimerState::Running;
                Some(Event::SessionStarted {
                    phase: self.phase,
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Running => None,
        }
    }

    /// Advance the countdown by one second. Only meaningful while Running.
    ///
    /// Returns `Event::PhaseCompleted` when the countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            Some(self.complete_phase())
        } else {
            None
        }
    }

    /// Pause the countdown, finalizing the live session as abandoned.
    /// No-op unless Running.
    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        let now = Utc::now();
        let elapsed = self.elapsed_secs();
        let mut session = self.current.take()?;
        session.finalize(false, elapsed, now);
        self.state = TimerState::Paused;
        Some(Event::SessionPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            session,
            at: now,
        })
    }

    /// Discard any live session and rearm the current phase in full.
    pub fn reset(&mut self) -> Event {
        self.current = None;
        self.state = TimerState::Idle;
        self.remaining_secs = self.settings.phase_secs(self.phase);
        self.segment_start_secs = self.remaining_secs;
        Event::TimerReset {
            phase: self.phase,
            at: Utc::now(),
        }
    }

    /// Reset and force the cycle back to its beginning: Work phase, zero
    /// session-scoped pomodoros. Persisted daily counters are untouched.
    pub fn reset_all(&mut self) -> Event {
        self.current = None;
        self.state = TimerState::Idle;
        self.phase = SessionType::Work;
        self.completed_pomodoros = 0;
        self.remaining_secs = self.settings.phase_secs(SessionType::Work);
        self.segment_start_secs = self.remaining_secs;
        Event::AllReset { at: Utc::now() }
    }

    /// Force immediate completion of the current phase with the same
    /// bookkeeping as natural completion. The live session, if any, is
    /// credited with its true elapsed time.
    pub fn skip(&mut self) -> Event {
        self.complete_phase()
    }

    /// Replace the settings.
    ///
    /// When not Running the current phase's countdown is resized to the new
    /// duration immediately; while Running the change takes effect from the
    /// next phase.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] and leaves all state untouched when the new
    /// record fails validation.
    pub fn update_settings(&mut self, settings: Settings) -> Result<Event, SettingsError> {
        settings.validate()?;
        self.settings = settings;
        if self.state != TimerState::Running {
            self.current = None;
            self.remaining_secs = self.settings.phase_secs(self.phase);
            self.segment_start_secs = self.remaining_secs;
        }
        Ok(Event::SettingsUpdated { at: Utc::now() })
    }

    /// Count a distraction against the live session. No-op without one.
    pub fn record_distraction(&mut self) {
        if let Some(session) = self.current.as_mut() {
            session.distractions += 1;
        }
    }

    /// Rate the live session's productivity, clamped to 1-5. No-op without
    /// a live session; finalized sessions are immutable.
    pub fn rate_session(&mut self, rating: u8) {
        if let Some(session) = self.current.as_mut() {
            session.rating = Some(rating.clamp(1, 5));
        }
    }

    /// Link subsequently created sessions to a task.
    pub fn set_active_task(&mut self, task_id: Option<String>) {
        self.active_task_id = task_id;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) -> Event {
        let now = Utc::now();
        let elapsed = self.elapsed_secs();
        let session = self.current.take().map(|mut s| {
            s.finalize(true, elapsed, now);
            s
        });

        let phase = self.phase;
        if phase == SessionType::Work {
            self.completed_pomodoros += 1;
        }

        let next_phase = if phase == SessionType::Work {
            if self.completed_pomodoros % self.settings.long_break_interval == 0 {
                SessionType::LongBreak
            } else {
                SessionType::ShortBreak
            }
        } else {
            SessionType::Work
        };

        self.phase = next_phase;
        self.remaining_secs = self.settings.phase_secs(next_phase);
        self.segment_start_secs = self.remaining_secs;
        self.state = TimerState::Idle;

        let auto_start = match next_phase {
            SessionType::Work => self.settings.auto_start_work,
            _ => self.settings.auto_start_breaks,
        };

        tracing::debug!(?phase, ?next_phase, pomodoros = self.completed_pomodoros, "phase completed");

        Event::PhaseCompleted {
            phase,
            session,
            completed_pomodoros: self.completed_pomodoros,
            next_phase,
            next_remaining_secs: self.remaining_secs,
            auto_start,
            at: now,
        }
    }
}
