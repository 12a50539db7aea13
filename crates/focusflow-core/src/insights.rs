//! Deterministic insight generation from accumulated statistics.
//!
//! Insights are ephemeral: the whole list is recomputed from scratch after
//! every phase completion or task change, with no identity carried across
//! regenerations. Rules run independently in a fixed order and the output
//! preserves that order -- there is no sorting by priority.

use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::stats::DailyStats;
use crate::task::TaskLedger;

/// Focus-time threshold (minutes) for the "Excellent Focus" rule.
const EXCELLENT_FOCUS_MINUTES: u32 = 120;
/// Open High/Urgent tasks beyond this trigger the overload rule.
const OVERLOAD_THRESHOLD: usize = 5;
/// Local hour at or after which a zero-pomodoro day counts as a late start.
const LATE_START_HOUR: u32 = 22;
/// Daily-goal fraction that triggers the "Almost There" nudge.
const ALMOST_THERE_PROGRESS: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Productivity,
    TimeManagement,
    Focus,
    Motivation,
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    Low,
    Medium,
    High,
}

/// A derived, human-readable observation with an optional call to action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub message: String,
    pub suggestion: String,
    pub kind: InsightKind,
    pub priority: InsightPriority,
    pub actionable: bool,
    pub created_at: DateTime<Utc>,
}

impl Insight {
    fn new(
        title: &str,
        message: String,
        suggestion: &str,
        kind: InsightKind,
        priority: InsightPriority,
        actionable: bool,
    ) -> Self {
        Self {
            title: title.to_string(),
            message,
            suggestion: suggestion.to_string(),
            kind,
            priority,
            actionable,
            created_at: Utc::now(),
        }
    }
}

/// Evaluate all insight rules against the current state.
///
/// `window` is the trailing 7-day stats window including today. `now` is the
/// local time used for the late-start rule; injecting it keeps the function
/// pure and testable.
pub fn generate(
    today: &DailyStats,
    window: &[DailyStats],
    ledger: &TaskLedger,
    settings: &Settings,
    now: DateTime<Local>,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    let weekly_mean = if window.is_empty() {
        0.0
    } else {
        window.iter().map(|d| f64::from(d.completed_pomodoros)).sum::<f64>() / window.len() as f64
    };
    if f64::from(today.completed_pomodoros) > weekly_mean {
        insights.push(Insight::new(
            "Great Progress",
            format!(
                "You've completed {} pomodoros today, above your weekly average.",
                today.completed_pomodoros
            ),
            "Keep the momentum going with your next session.",
            InsightKind::Productivity,
            InsightPriority::Medium,
            false,
        ));
    }

    if today.total_focus_minutes > EXCELLENT_FOCUS_MINUTES {
        insights.push(Insight::new(
            "Excellent Focus",
            format!(
                "You've logged {} minutes of focused work today.",
                today.total_focus_minutes
            ),
            "Remember to take your breaks to sustain this pace.",
            InsightKind::Focus,
            InsightPriority::Low,
            false,
        ));
    }

    let overdue = ledger.overdue_count(now.with_timezone(&Utc));
    if overdue > 0 {
        insights.push(Insight::new(
            "Overdue Tasks",
            format!("You have {overdue} overdue task(s)."),
            "Start a focus session on your oldest overdue task.",
            InsightKind::TimeManagement,
            InsightPriority::High,
            true,
        ));
    }

    if ledger.elevated_open_count() > OVERLOAD_THRESHOLD {
        insights.push(Insight::new(
            "Too Many High-Priority Tasks",
            format!(
                "{} open tasks are marked high priority or urgent.",
                ledger.elevated_open_count()
            ),
            "Re-triage: if everything is urgent, nothing is.",
            InsightKind::TimeManagement,
            InsightPriority::Medium,
            true,
        ));
    }

    if now.hour() >= LATE_START_HOUR && today.completed_pomodoros == 0 {
        insights.push(Insight::new(
            "Late Start",
            "No pomodoros completed today and it's getting late.".to_string(),
            "Even one short session beats none -- or rest and start fresh tomorrow.",
            InsightKind::Health,
            InsightPriority::Medium,
            true,
        ));
    }

    if settings.daily_goal > 0 {
        if today.completed_pomodoros >= settings.daily_goal {
            insights.push(Insight::new(
                "Daily Goal Achieved",
                format!("You reached your goal of {} pomodoros.", settings.daily_goal),
                "Great work -- anything beyond this is a bonus.",
                InsightKind::Motivation,
                InsightPriority::Low,
                false,
            ));
        } else if f64::from(today.completed_pomodoros) / f64::from(settings.daily_goal)
            >= ALMOST_THERE_PROGRESS
        {
            let remaining = settings.daily_goal - today.completed_pomodoros;
            insights.push(Insight::new(
                "Almost There",
                format!("Only {remaining} pomodoro(s) left to hit your daily goal."),
                "One more session and the goal is yours.",
                InsightKind::Motivation,
                InsightPriority::Medium,
                true,
            ));
        }
    }

    insights
}
