//! Productivity tasks and the open/completed ledger.
//!
//! The ledger is independent of the timer: it is mutated by presentation
//! commands and only read by the insight evaluator. Its single invariant is
//! that every created task id lives in exactly one of the open/completed
//! collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    /// High and Urgent tasks count toward the overload insight.
    pub fn is_elevated(&self) -> bool {
        matches!(self, TaskPriority::High | TaskPriority::Urgent)
    }
}

/// Task category for organizing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Personal,
    Study,
    Health,
    Other,
}

impl Default for TaskCategory {
    fn default() -> Self {
        TaskCategory::Other
    }
}

/// A single checklist item under a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            is_completed: false,
        }
    }
}

/// A productivity task tracked by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityTask {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub category: TaskCategory,
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated effort in minutes.
    pub estimated_minutes: Option<u32>,
    /// Minutes of completed focus runs linked to this task.
    pub actual_minutes: u32,
    pub pomodoros_completed: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl ProductivityTask {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("task-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            title: title.into(),
            description: None,
            is_completed: false,
            priority: TaskPriority::default(),
            category: TaskCategory::default(),
            due_date: None,
            estimated_minutes: None,
            actual_minutes: 0,
            pomodoros_completed: 0,
            created_at: now,
            completed_at: None,
            subtasks: Vec::new(),
        }
    }

    /// An open task past its due date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Fraction of completed subtasks; tasks without subtasks read as
    /// 1.0 when completed and 0.0 otherwise.
    pub fn completion_rate(&self) -> f64 {
        if self.subtasks.is_empty() {
            return if self.is_completed { 1.0 } else { 0.0 };
        }
        let done = self.subtasks.iter().filter(|s| s.is_completed).count();
        done as f64 / self.subtasks.len() as f64
    }
}

/// Mutable collection of tasks split into open and completed sets.
#[derive(Debug, Clone, Default)]
pub struct TaskLedger {
    open: Vec<ProductivityTask>,
    completed: Vec<ProductivityTask>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from a persisted union of tasks.
    pub fn from_tasks(tasks: Vec<ProductivityTask>) -> Self {
        let (completed, open) = tasks.into_iter().partition(|t| t.is_completed);
        Self { open, completed }
    }

    pub fn open(&self) -> &[ProductivityTask] {
        &self.open
    }

    pub fn completed(&self) -> &[ProductivityTask] {
        &self.completed
    }

    /// Union of both collections for persistence, open tasks first.
    pub fn all(&self) -> Vec<ProductivityTask> {
        self.open.iter().chain(self.completed.iter()).cloned().collect()
    }

    pub fn find(&self, id: &str) -> Option<&ProductivityTask> {
        self.open
            .iter()
            .chain(self.completed.iter())
            .find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ProductivityTask> {
        self.open
            .iter_mut()
            .chain(self.completed.iter_mut())
            .find(|t| t.id == id)
    }

    /// Create a task in the open set. A task arriving with
    /// `is_completed = true` is still filed as open until completed through
    /// the ledger, so membership bookkeeping stays consistent.
    pub fn add(&mut self, mut task: ProductivityTask) {
        task.is_completed = false;
        task.completed_at = None;
        let id = task.id.clone();
        self.delete(&id);
        self.open.push(task);
    }

    /// Replace a task by id, migrating between collections when its
    /// completion flag changed. Unknown ids are ignored.
    pub fn update(&mut self, task: ProductivityTask) {
        if self.find(&task.id).is_none() {
            return;
        }
        let id = task.id.clone();
        self.open.retain(|t| t.id != id);
        self.completed.retain(|t| t.id != id);
        if task.is_completed {
            self.completed.push(task);
        } else {
            self.open.push(task);
        }
    }

    /// Flip a task's completion state, maintaining `completed_at`, then
    /// re-file it. Returns false for unknown ids.
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(task) = self.find(id) else {
            return false;
        };
        let mut task = task.clone();
        task.is_completed = !task.is_completed;
        task.completed_at = task.is_completed.then(Utc::now);
        self.update(task);
        true
    }

    /// Remove a task from both collections. Deleting an absent id is a
    /// no-op.
    pub fn delete(&mut self, id: &str) {
        self.open.retain(|t| t.id != id);
        self.completed.retain(|t| t.id != id);
    }

    /// Record a completed work run against a linked task.
    pub fn credit_pomodoro(&mut self, id: &str, focus_minutes: u32) {
        if let Some(task) = self.find_mut(id) {
            task.pomodoros_completed += 1;
            task.actual_minutes += focus_minutes;
        }
    }

    pub fn overdue_count(&self, now: DateTime<Utc>) -> usize {
        self.open.iter().filter(|t| t.is_overdue(now)).count()
    }

    pub fn elevated_open_count(&self) -> usize {
        self.open.iter().filter(|t| t.priority.is_elevated()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn membership_is_exclusive(ledger: &TaskLedger, id: &str) -> bool {
        let in_open = ledger.open().iter().any(|t| t.id == id);
        let in_completed = ledger.completed().iter().any(|t| t.id == id);
        in_open != in_completed
    }

    #[test]
    fn add_places_task_in_open_set() {
        let mut ledger = TaskLedger::new();
        let task = ProductivityTask::new("Write report");
        let id = task.id.clone();
        ledger.add(task);
        assert_eq!(ledger.open().len(), 1);
        assert!(ledger.completed().is_empty());
        assert!(membership_is_exclusive(&ledger, &id));
    }

    #[test]
    fn toggle_moves_between_collections() {
        let mut ledger = TaskLedger::new();
        let task = ProductivityTask::new("Write report");
        let id = task.id.clone();
        ledger.add(task);

        assert!(ledger.toggle(&id));
        assert!(ledger.open().is_empty());
        assert_eq!(ledger.completed().len(), 1);
        assert!(ledger.completed()[0].completed_at.is_some());
        assert!(membership_is_exclusive(&ledger, &id));

        // Un-completion re-files into open and clears completed_at.
        assert!(ledger.toggle(&id));
        assert_eq!(ledger.open().len(), 1);
        assert!(ledger.completed().is_empty());
        assert!(ledger.open()[0].completed_at.is_none());
    }

    #[test]
    fn toggle_unknown_id_is_refused() {
        let mut ledger = TaskLedger::new();
        assert!(!ledger.toggle("missing"));
    }

    #[test]
    fn update_migrates_on_completion_change() {
        let mut ledger = TaskLedger::new();
        let mut task = ProductivityTask::new("Write report");
        let id = task.id.clone();
        ledger.add(task.clone());

        task.is_completed = true;
        task.completed_at = Some(Utc::now());
        ledger.update(task);
        assert!(ledger.open().is_empty());
        assert_eq!(ledger.completed().len(), 1);
        assert!(membership_is_exclusive(&ledger, &id));
    }

    #[test]
    fn update_unknown_id_is_ignored() {
        let mut ledger = TaskLedger::new();
        ledger.update(ProductivityTask::new("Ghost"));
        assert!(ledger.open().is_empty());
        assert!(ledger.completed().is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let mut ledger = TaskLedger::new();
        let task = ProductivityTask::new("Write report");
        let id = task.id.clone();
        ledger.add(task);

        ledger.delete(&id);
        let after_first = ledger.all();
        ledger.delete(&id);
        assert_eq!(ledger.all(), after_first);
        assert!(ledger.all().is_empty());
    }

    #[test]
    fn overdue_counts_open_tasks_only() {
        let mut ledger = TaskLedger::new();
        let now = Utc::now();

        let mut overdue = ProductivityTask::new("Late");
        overdue.due_date = Some(now - Duration::hours(1));
        let overdue_id = overdue.id.clone();
        ledger.add(overdue);

        let mut done_late = ProductivityTask::new("Late but done");
        done_late.due_date = Some(now - Duration::hours(1));
        let done_id = done_late.id.clone();
        ledger.add(done_late);
        ledger.toggle(&done_id);

        assert_eq!(ledger.overdue_count(now), 1);
        assert!(ledger.find(&overdue_id).unwrap().is_overdue(now));
    }

    #[test]
    fn completion_rate_with_subtasks() {
        let mut task = ProductivityTask::new("Parent");
        task.subtasks = vec![Subtask::new("a"), Subtask::new("b"), Subtask::new("c"), Subtask::new("d")];
        task.subtasks[0].is_completed = true;
        assert_eq!(task.completion_rate(), 0.25);
    }

    #[test]
    fn completion_rate_without_subtasks() {
        let mut task = ProductivityTask::new("Leaf");
        assert_eq!(task.completion_rate(), 0.0);
        task.is_completed = true;
        assert_eq!(task.completion_rate(), 1.0);
    }

    #[test]
    fn credit_pomodoro_updates_linked_task() {
        let mut ledger = TaskLedger::new();
        let task = ProductivityTask::new("Write report");
        let id = task.id.clone();
        ledger.add(task);
        ledger.credit_pomodoro(&id, 25);
        let task = ledger.find(&id).unwrap();
        assert_eq!(task.pomodoros_completed, 1);
        assert_eq!(task.actual_minutes, 25);
    }

    #[test]
    fn from_tasks_partitions_by_completion() {
        let open = ProductivityTask::new("open");
        let mut done = ProductivityTask::new("done");
        done.is_completed = true;
        let ledger = TaskLedger::from_tasks(vec![open, done]);
        assert_eq!(ledger.open().len(), 1);
        assert_eq!(ledger.completed().len(), 1);
    }
}
