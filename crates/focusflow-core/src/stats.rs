//! Per-day productivity statistics and the trailing weekly window.
//!
//! One [`DailyStats`] record exists per calendar day, created lazily and
//! never deleted. The session engine is the only writer; the insight
//! evaluator and the presentation layer read snapshots.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::session::SessionType;
use crate::settings::Settings;

/// Aggregate counters for one calendar day.
///
/// Invariant: `completed_pomodoros` always equals
/// `session_counts[SessionType::Work]` -- both are incremented together in
/// [`DailyStats::record_work`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub completed_pomodoros: u32,
    /// Focus time credited from completed work runs, in minutes.
    pub total_focus_minutes: u32,
    /// Completed phase counts keyed by session type.
    #[serde(default)]
    pub session_counts: BTreeMap<SessionType, u32>,
    /// Ids of tasks linked to at least one completed work run today.
    #[serde(default)]
    pub tasks_worked_on: BTreeSet<String>,
    pub distractions: u32,
}

impl DailyStats {
    /// Record a completed work phase: pomodoro count, focus-time credit and
    /// the work session count move together.
    pub fn record_work(&mut self, focus_minutes: u32, task_id: Option<&str>) {
        self.completed_pomodoros += 1;
        self.total_focus_minutes += focus_minutes;
        *self.session_counts.entry(SessionType::Work).or_insert(0) += 1;
        if let Some(id) = task_id {
            self.tasks_worked_on.insert(id.to_string());
        }
    }

    /// Record a completed break phase. Breaks earn no focus-time credit.
    pub fn record_break(&mut self, phase: SessionType) {
        debug_assert!(phase.is_break());
        *self.session_counts.entry(phase).or_insert(0) += 1;
    }

    pub fn count_for(&self, phase: SessionType) -> u32 {
        self.session_counts.get(&phase).copied().unwrap_or(0)
    }

    /// Mean length of a completed work run in minutes, 0.0 for an empty day.
    pub fn average_session_minutes(&self) -> f64 {
        if self.completed_pomodoros == 0 {
            0.0
        } else {
            f64::from(self.total_focus_minutes) / f64::from(self.completed_pomodoros)
        }
    }
}

/// Append-only store of daily statistics keyed by date.
#[derive(Debug, Clone, Default)]
pub struct StatsStore {
    days: BTreeMap<NaiveDate, DailyStats>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to a day's record, created zero-valued on first use.
    pub fn day_mut(&mut self, date: NaiveDate) -> &mut DailyStats {
        self.days.entry(date).or_default()
    }

    /// Snapshot of a day's record; missing days read as zero-valued.
    pub fn day(&self, date: NaiveDate) -> DailyStats {
        self.days.get(&date).cloned().unwrap_or_default()
    }

    /// Seed a day's record, used when restoring persisted history.
    pub fn insert(&mut self, date: NaiveDate, stats: DailyStats) {
        self.days.insert(date, stats);
    }

    /// The trailing 7-day window ending at `today`, oldest first.
    ///
    /// Always exactly 7 records; days with no activity are zero-valued,
    /// never absent.
    pub fn weekly_window(&self, today: NaiveDate) -> Vec<DailyStats> {
        (0..7)
            .rev()
            .map(|back| self.day(today - Duration::days(back)))
            .collect()
    }

    /// Today's pomodoros over the daily goal; 0.0 when the goal is 0.
    pub fn daily_goal_progress(&self, today: NaiveDate, settings: &Settings) -> f64 {
        if settings.daily_goal == 0 {
            return 0.0;
        }
        f64::from(self.day(today).completed_pomodoros) / f64::from(settings.daily_goal)
    }

    /// Window pomodoros over the weekly goal; 0.0 when the goal is 0.
    pub fn weekly_goal_progress(&self, today: NaiveDate, settings: &Settings) -> f64 {
        if settings.weekly_goal == 0 {
            return 0.0;
        }
        let total: u32 = self
            .weekly_window(today)
            .iter()
            .map(|d| d.completed_pomodoros)
            .sum();
        f64::from(total) / f64::from(settings.weekly_goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn record_work_keeps_count_invariant() {
        let mut stats = DailyStats::default();
        stats.record_work(25, None);
        stats.record_work(25, Some("t1"));
        assert_eq!(stats.completed_pomodoros, 2);
        assert_eq!(stats.count_for(SessionType::Work), 2);
        assert_eq!(stats.total_focus_minutes, 50);
        assert!(stats.tasks_worked_on.contains("t1"));
    }

    #[test]
    fn breaks_earn_no_focus_credit() {
        let mut stats = DailyStats::default();
        stats.record_break(SessionType::ShortBreak);
        stats.record_break(SessionType::LongBreak);
        assert_eq!(stats.completed_pomodoros, 0);
        assert_eq!(stats.total_focus_minutes, 0);
        assert_eq!(stats.count_for(SessionType::ShortBreak), 1);
        assert_eq!(stats.count_for(SessionType::LongBreak), 1);
    }

    #[test]
    fn average_session_minutes_guards_empty_day() {
        let stats = DailyStats::default();
        assert_eq!(stats.average_session_minutes(), 0.0);
    }

    #[test]
    fn weekly_window_defaults_missing_days() {
        let mut store = StatsStore::new();
        let today = date(2026, 8, 28);
        store.day_mut(today).record_work(25, None);
        store.day_mut(today - Duration::days(3)).record_work(25, None);

        let window = store.weekly_window(today);
        assert_eq!(window.len(), 7);
        // Oldest first: positions 0-2 untouched, 3 has one pomodoro, 6 is today.
        assert_eq!(window[0].completed_pomodoros, 0);
        assert_eq!(window[3].completed_pomodoros, 1);
        assert_eq!(window[6].completed_pomodoros, 1);
    }

    #[test]
    fn goal_progress_divides_by_goal() {
        let mut store = StatsStore::new();
        let today = date(2026, 8, 28);
        for _ in 0..7 {
            store.day_mut(today).record_work(25, None);
        }
        let settings = Settings {
            daily_goal: 8,
            weekly_goal: 40,
            ..Settings::default()
        };
        assert_eq!(store.daily_goal_progress(today, &settings), 0.875);
        assert_eq!(store.weekly_goal_progress(today, &settings), 7.0 / 40.0);
    }

    #[test]
    fn zero_goal_progress_is_zero() {
        let mut store = StatsStore::new();
        let today = date(2026, 8, 28);
        store.day_mut(today).record_work(25, None);
        let settings = Settings {
            daily_goal: 0,
            weekly_goal: 0,
            ..Settings::default()
        };
        assert_eq!(store.daily_goal_progress(today, &settings), 0.0);
        assert_eq!(store.weekly_goal_progress(today, &settings), 0.0);
    }

    #[test]
    fn daily_stats_serialization_roundtrip() {
        let mut stats = DailyStats::default();
        stats.record_work(25, Some("t1"));
        stats.record_break(SessionType::ShortBreak);
        stats.distractions = 2;
        let json = serde_json::to_string(&stats).unwrap();
        let decoded: DailyStats = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, stats);
    }
}
