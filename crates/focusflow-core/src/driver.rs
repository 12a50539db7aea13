//! Async driver: serializes ticks and commands onto one controller.
//!
//! A single tokio task owns the [`SessionController`] and selects between a
//! 1-second tick interval and a command channel. Because both paths run on
//! the same task, commands are serialized relative to ticks and a tick can
//! never fire against state that a just-returned `pause()` or `reset()`
//! left behind.
//!
//! Auto-starts requested by phase completion are scheduled as delayed
//! [`Command::AutoStart`] messages carrying a token; any explicit command
//! invalidates the token, so a stale auto-start arriving after the user
//! acted is dropped by the controller.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::controller::{PendingAutoStart, SessionController};
use crate::events::Snapshot;
use crate::settings::Settings;
use crate::storage::BlobStore;
use crate::task::ProductivityTask;

/// Delay between a phase completion and its automatic start, leaving the
/// presentation layer time to settle.
pub const AUTO_START_GRACE: Duration = Duration::from_secs(2);

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Commands accepted by the driver task.
#[derive(Debug, Clone)]
pub enum Command {
    Start,
    Pause,
    Reset,
    ResetAll,
    Skip,
    UpdateSettings(Settings),
    RecordDistraction,
    RateSession(u8),
    SetActiveTask(Option<String>),
    AddTask(ProductivityTask),
    UpdateTask(ProductivityTask),
    ToggleTask(String),
    DeleteTask(String),
    /// Scheduled auto-start; dropped by the controller when stale.
    AutoStart(u64),
    Shutdown,
}

/// Handle to a spawned driver task.
pub struct SessionDriver {
    tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<Snapshot>,
    handle: JoinHandle<()>,
}

impl SessionDriver {
    /// Spawn the driver task around a controller.
    pub fn spawn<S: BlobStore + 'static>(mut controller: SessionController<S>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
        let (snap_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let loop_tx = tx.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(
                tokio::time::Instant::now() + TICK_PERIOD,
                TICK_PERIOD,
            );
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                let pending = tokio::select! {
                    _ = interval.tick() => controller.tick(),
                    cmd = rx.recv() => match cmd {
                        None | Some(Command::Shutdown) => break,
                        Some(cmd) => apply(&mut controller, cmd),
                    },
                };

                if let Some(pending) = pending {
                    schedule_auto_start(loop_tx.clone(), pending);
                }

                // Subscribers observe the new state once the triggering
                // command or tick has been handled.
                let _ = snap_tx.send(controller.snapshot());
            }
        });

        Self {
            tx,
            snapshot_rx,
            handle,
        }
    }

    /// Queue a command. Returns false if the driver has shut down.
    pub fn send(&self, cmd: Command) -> bool {
        self.tx.send(cmd).is_ok()
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Stop the driver task and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.tx.send(Command::Shutdown);
        let _ = self.handle.await;
    }
}

fn apply<S: BlobStore>(
    controller: &mut SessionController<S>,
    cmd: Command,
) -> Option<PendingAutoStart> {
    match cmd {
        Command::Start => controller.start(),
        Command::Pause => controller.pause(),
        Command::Reset => controller.reset(),
        Command::ResetAll => controller.reset_all(),
        Command::Skip => return controller.skip(),
        Command::UpdateSettings(settings) => {
            if let Err(e) = controller.update_settings(settings) {
                tracing::warn!(error = %e, "rejected settings update");
            }
        }
        Command::RecordDistraction => controller.record_distraction(),
        Command::RateSession(rating) => controller.rate_session(rating),
        Command::SetActiveTask(task_id) => controller.set_active_task(task_id),
        Command::AddTask(task) => controller.add_task(task),
        Command::UpdateTask(task) => controller.update_task(task),
        Command::ToggleTask(id) => controller.toggle_task(&id),
        Command::DeleteTask(id) => controller.delete_task(&id),
        Command::AutoStart(token) => controller.auto_start(token),
        Command::Shutdown => unreachable!("handled by the driver loop"),
    }
    None
}

fn schedule_auto_start(tx: mpsc::UnboundedSender<Command>, pending: PendingAutoStart) {
    tokio::spawn(async move {
        tokio::time::sleep(AUTO_START_GRACE).await;
        let _ = tx.send(Command::AutoStart(pending.token));
    });
}
