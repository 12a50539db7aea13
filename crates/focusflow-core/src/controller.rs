//! Session controller: commands in, bookkeeping out.
//!
//! Owns the engine, statistics store, task ledger, gateway and current
//! insight list. Constructed once per process (or per test) and handed to
//! whoever issues commands -- there is no global instance. All methods are
//! synchronous; the driver serializes calls relative to ticks.

use chrono::Local;

use crate::error::SettingsError;
use crate::events::{Event, Snapshot};
use crate::insights::{self, Insight};
use crate::session::FocusSession;
use crate::settings::Settings;
use crate::stats::{DailyStats, StatsStore};
use crate::storage::{BlobStore, PersistenceGateway};
use crate::task::{ProductivityTask, TaskLedger};
use crate::timer::SessionEngine;

/// Token handed to the driver when a completed phase wants an automatic
/// start after the grace delay. Stale tokens -- anything issued before the
/// latest explicit command -- are ignored when redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAutoStart {
    pub token: u64,
}

pub struct SessionController<S: BlobStore> {
    engine: SessionEngine,
    stats: StatsStore,
    ledger: TaskLedger,
    history: Vec<FocusSession>,
    insights: Vec<Insight>,
    gateway: PersistenceGateway<S>,
    autostart_token: u64,
}

impl<S: BlobStore> SessionController<S> {
    /// Restore settings, tasks, history and the trailing 7-day stats window
    /// from the store. Missing or corrupt records fall back to defaults.
    pub fn new(store: S) -> Self {
        let gateway = PersistenceGateway::new(store);
        let settings = gateway.load_settings();
        let ledger = TaskLedger::from_tasks(gateway.load_tasks());
        let history = gateway.load_history();

        let mut stats = StatsStore::new();
        let today = Local::now().date_naive();
        for back in 0..7 {
            let date = today - chrono::Duration::days(back);
            stats.insert(date, gateway.load_daily_stats(date));
        }

        let mut controller = Self {
            engine: SessionEngine::new(settings),
            stats,
            ledger,
            history,
            insights: Vec::new(),
            gateway,
            autostart_token: 0,
        };
        controller.refresh_insights();
        controller
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) {
        self.invalidate_autostart();
        self.engine.start();
    }

    pub fn pause(&mut self) {
        self.invalidate_autostart();
        if let Some(Event::SessionPaused { session, .. }) = self.engine.pause() {
            self.history.push(session);
            self.gateway.save_history(&self.history);
        }
    }

    pub fn reset(&mut self) {
        self.invalidate_autostart();
        self.engine.reset();
    }

    pub fn reset_all(&mut self) {
        self.invalidate_autostart();
        self.engine.reset_all();
    }

    /// Force completion of the current phase with full bookkeeping.
    pub fn skip(&mut self) -> Option<PendingAutoStart> {
        self.invalidate_autostart();
        let event = self.engine.skip();
        self.apply_event(event)
    }

    /// One-second tick, forwarded by the driver while the timer runs.
    pub fn tick(&mut self) -> Option<PendingAutoStart> {
        let event = self.engine.tick()?;
        self.apply_event(event)
    }

    /// Redeem a scheduled auto-start. No-op when the token is stale or the
    /// engine is no longer startable.
    pub fn auto_start(&mut self, token: u64) {
        if token == self.autostart_token {
            self.engine.start();
        }
    }

    /// Replace settings, persisting them on success.
    ///
    /// # Errors
    /// Returns the validation error; state is untouched on failure.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        self.invalidate_autostart();
        self.engine.update_settings(settings)?;
        self.gateway.save_settings(self.engine.settings());
        self.refresh_insights();
        Ok(())
    }

    pub fn record_distraction(&mut self) {
        self.engine.record_distraction();
    }

    pub fn rate_session(&mut self, rating: u8) {
        self.engine.rate_session(rating);
    }

    pub fn set_active_task(&mut self, task_id: Option<String>) {
        self.engine.set_active_task(task_id);
    }

    // ── Task commands ────────────────────────────────────────────────

    pub fn add_task(&mut self, task: ProductivityTask) {
        self.ledger.add(task);
        self.persist_tasks();
    }

    pub fn update_task(&mut self, task: ProductivityTask) {
        self.ledger.update(task);
        self.persist_tasks();
    }

    pub fn toggle_task(&mut self, id: &str) {
        if self.ledger.toggle(id) {
            self.persist_tasks();
        }
    }

    pub fn delete_task(&mut self, id: &str) {
        self.ledger.delete(id);
        self.persist_tasks();
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn open_tasks(&self) -> &[ProductivityTask] {
        self.ledger.open()
    }

    pub fn completed_tasks(&self) -> &[ProductivityTask] {
        self.ledger.completed()
    }

    pub fn history(&self) -> &[FocusSession] {
        &self.history
    }

    pub fn today_stats(&self) -> DailyStats {
        self.stats.day(Local::now().date_naive())
    }

    pub fn weekly_window(&self) -> Vec<DailyStats> {
        self.stats.weekly_window(Local::now().date_naive())
    }

    pub fn daily_goal_progress(&self) -> f64 {
        self.stats
            .daily_goal_progress(Local::now().date_naive(), self.engine.settings())
    }

    pub fn weekly_goal_progress(&self) -> f64 {
        self.stats
            .weekly_goal_progress(Local::now().date_naive(), self.engine.settings())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.engine.state(),
            phase: self.engine.phase(),
            remaining_secs: self.engine.remaining_secs(),
            is_running: self.engine.is_running(),
            completed_pomodoros: self.engine.completed_pomodoros(),
            today: self.today_stats(),
            daily_goal_progress: self.daily_goal_progress(),
            weekly_goal_progress: self.weekly_goal_progress(),
            insights: self.insights.clone(),
            at: chrono::Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Phase-completion bookkeeping: statistics, persistence, insights.
    fn apply_event(&mut self, event: Event) -> Option<PendingAutoStart> {
        let Event::PhaseCompleted {
            phase,
            session,
            auto_start,
            ..
        } = event
        else {
            return None;
        };

        let today = Local::now().date_naive();
        let focus_minutes = session.as_ref().map_or(0, |s| s.actual_minutes);
        let task_id = session.as_ref().and_then(|s| s.task_id.clone());

        {
            let day = self.stats.day_mut(today);
            if phase.is_break() {
                day.record_break(phase);
            } else {
                day.record_work(focus_minutes, task_id.as_deref());
            }
            if let Some(s) = &session {
                day.distractions += s.distractions;
            }
        }
        let day = self.stats.day(today);
        self.gateway.save_daily_stats(today, &day);

        if let Some(session) = session {
            self.history.push(session);
            self.gateway.save_history(&self.history);
        }

        if !phase.is_break() {
            if let Some(id) = task_id {
                self.ledger.credit_pomodoro(&id, focus_minutes);
                self.persist_tasks();
            }
        }

        self.refresh_insights();

        auto_start.then_some(PendingAutoStart {
            token: self.autostart_token,
        })
    }

    fn refresh_insights(&mut self) {
        let today = Local::now().date_naive();
        self.insights = insights::generate(
            &self.stats.day(today),
            &self.stats.weekly_window(today),
            &self.ledger,
            self.engine.settings(),
            Local::now(),
        );
    }

    fn persist_tasks(&mut self) {
        self.gateway.save_tasks(&self.ledger.all());
        self.refresh_insights();
    }

    fn invalidate_autostart(&mut self) {
        self.autostart_token = self.autostart_token.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use crate::storage::{daily_stats_key, MemoryStore, HISTORY_KEY, TASKS_KEY};
    use crate::timer::TimerState;

    fn controller() -> SessionController<MemoryStore> {
        SessionController::new(MemoryStore::new())
    }

    fn run_out_phase<S: BlobStore>(c: &mut SessionController<S>) -> Option<PendingAutoStart> {
        c.start();
        loop {
            let before = c.engine().phase();
            let pending = c.tick();
            if c.engine().phase() != before || c.engine().state() == TimerState::Idle {
                return pending;
            }
        }
    }

    #[test]
    fn work_completion_updates_stats_and_persists() {
        let mut c = controller();
        run_out_phase(&mut c);

        let today = c.today_stats();
        assert_eq!(today.completed_pomodoros, 1);
        assert_eq!(today.total_focus_minutes, 25);
        assert_eq!(today.count_for(SessionType::Work), 1);

        let log = c.gateway.store().write_log();
        let date = Local::now().date_naive();
        assert!(log.contains(&daily_stats_key(date)));
        assert!(log.contains(&HISTORY_KEY.to_string()));
        assert_eq!(c.history().len(), 1);
    }

    #[test]
    fn break_completion_earns_no_focus_credit() {
        let mut c = controller();
        run_out_phase(&mut c); // Work
        run_out_phase(&mut c); // ShortBreak

        let today = c.today_stats();
        assert_eq!(today.completed_pomodoros, 1);
        assert_eq!(today.total_focus_minutes, 25);
        assert_eq!(today.count_for(SessionType::ShortBreak), 1);
    }

    #[test]
    fn pause_appends_partial_session_to_history() {
        let mut c = controller();
        c.start();
        for _ in 0..90 {
            c.tick();
        }
        c.pause();
        assert_eq!(c.history().len(), 1);
        assert!(!c.history()[0].was_completed);
        assert_eq!(c.history()[0].actual_minutes, 1);
    }

    #[test]
    fn pause_while_idle_leaves_no_trace() {
        let mut c = controller();
        c.pause();
        assert_eq!(c.engine().state(), TimerState::Idle);
        assert!(c.history().is_empty());
        assert!(c.gateway.store().write_log().is_empty());
    }

    #[test]
    fn linked_task_is_credited_on_work_completion() {
        let mut c = controller();
        let task = ProductivityTask::new("Deep work");
        let id = task.id.clone();
        c.add_task(task);
        c.set_active_task(Some(id.clone()));

        run_out_phase(&mut c);

        let task = c.open_tasks().iter().find(|t| t.id == id).unwrap();
        assert_eq!(task.pomodoros_completed, 1);
        assert_eq!(task.actual_minutes, 25);
        assert!(c.today_stats().tasks_worked_on.contains(&id));
    }

    #[test]
    fn task_commands_persist_the_union() {
        let mut c = controller();
        let task = ProductivityTask::new("Write report");
        let id = task.id.clone();
        c.add_task(task);
        c.toggle_task(&id);
        c.delete_task(&id);

        let writes = c
            .gateway
            .store()
            .write_log()
            .into_iter()
            .filter(|k| k == TASKS_KEY)
            .count();
        assert_eq!(writes, 3);
        assert!(c.open_tasks().is_empty());
        assert!(c.completed_tasks().is_empty());
    }

    #[test]
    fn persistence_failure_never_blocks_commands() {
        let mut c = controller();
        c.gateway.store().fail_writes(true);
        run_out_phase(&mut c);
        // Stats survived in memory despite every save failing.
        assert_eq!(c.today_stats().completed_pomodoros, 1);
        assert_eq!(c.history().len(), 1);
    }

    #[test]
    fn autostart_token_goes_stale_after_explicit_command() {
        let settings = Settings {
            auto_start_breaks: true,
            ..Settings::default()
        };
        let mut c = controller();
        c.update_settings(settings).unwrap();

        let pending = run_out_phase(&mut c).expect("break should want auto-start");
        // An explicit command before the grace delay cancels the auto-start.
        c.reset();
        c.auto_start(pending.token);
        assert_eq!(c.engine().state(), TimerState::Idle);
    }

    #[test]
    fn autostart_token_redeems_when_uncontested() {
        let settings = Settings {
            auto_start_breaks: true,
            ..Settings::default()
        };
        let mut c = controller();
        c.update_settings(settings).unwrap();

        let pending = run_out_phase(&mut c).expect("break should want auto-start");
        c.auto_start(pending.token);
        assert_eq!(c.engine().state(), TimerState::Running);
        assert_eq!(c.engine().phase(), SessionType::ShortBreak);
    }

    #[test]
    fn state_is_restored_from_the_store() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut c = SessionController::new(store.clone());
        c.add_task(ProductivityTask::new("Persisted"));
        run_out_phase(&mut c);
        drop(c);

        let c2 = SessionController::new(store);
        assert_eq!(c2.open_tasks().len(), 1);
        assert_eq!(c2.today_stats().completed_pomodoros, 1);
        assert_eq!(c2.history().len(), 1);
    }

    #[test]
    fn snapshot_reflects_observable_state() {
        let mut c = controller();
        run_out_phase(&mut c);
        let snap = c.snapshot();
        assert_eq!(snap.phase, SessionType::ShortBreak);
        assert_eq!(snap.completed_pomodoros, 1);
        assert!(!snap.is_running);
        assert_eq!(snap.today.completed_pomodoros, 1);
    }
}
