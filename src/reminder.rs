//! Background reminders for tasks due today
//!
//! `ReminderLoop` is either stopped or running. While running, a tokio task polls
//! the store for open tasks due today, hands them to a `ReminderSink`, then sleeps
//! for the configured interval. Stopping cancels the task at its next wake point
//! and waits a bounded time for it to finish.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Result, TaskError};
use crate::model::Task;

/// How long `stop` waits for the poll task before giving up on it
pub const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Source of open tasks due today
pub trait DueTasks: Send + Sync + 'static {
    fn due_today(&self) -> Result<Vec<Task>>;
}

impl DueTasks for Database {
    fn due_today(&self) -> Result<Vec<Task>> {
        Database::due_today(self)
    }
}

/// Receives the result of every successful poll
pub trait ReminderSink: Send + Sync + 'static {
    fn notify(&self, due: &[Task]);
}

/// Prints due tasks to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ReminderSink for ConsoleSink {
    fn notify(&self, due: &[Task]) {
        if due.is_empty() {
            return;
        }
        let noun = if due.len() == 1 { "task" } else { "tasks" };
        println!(
            "\n{} {}",
            "🔔".yellow(),
            format!("You have {} {} due today!", due.len(), noun).yellow().bold()
        );
        for task in due {
            println!("  • [{}] {}", task.id, task.description);
        }
    }
}

enum State {
    Stopped,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
}

pub struct ReminderLoop {
    source: Arc<dyn DueTasks>,
    sink: Arc<dyn ReminderSink>,
    interval: Duration,
    state: State,
}

impl ReminderLoop {
    pub fn new(source: impl DueTasks, sink: impl ReminderSink, interval: Duration) -> Self {
        Self {
            source: Arc::new(source),
            sink: Arc::new(sink),
            interval,
            state: State::Stopped,
        }
    }

    /// Reminder loop printing to the console
    pub fn console(db: Database, interval: Duration) -> Self {
        Self::new(db, ConsoleSink, interval)
    }

    pub fn is_running(&self) -> bool {
        match &self.state {
            State::Stopped => false,
            State::Running { handle, .. } => !handle.is_finished(),
        }
    }

    /// Start polling in the background. Returns false if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Arc::clone(&self.source),
            Arc::clone(&self.sink),
            self.interval,
            cancel.clone(),
        ));
        self.state = State::Running { cancel, handle };
        info!(interval_secs = self.interval.as_secs(), "reminders started");
        true
    }

    /// Signal the background task and wait up to `STOP_TIMEOUT` for it.
    ///
    /// Returns true if the task had exited by the time this returns. Stopping an
    /// already stopped loop returns true.
    pub async fn stop(&mut self) -> bool {
        let (cancel, mut handle) = match std::mem::replace(&mut self.state, State::Stopped) {
            State::Stopped => return true,
            State::Running { cancel, handle } => (cancel, handle),
        };

        cancel.cancel();
        match tokio::time::timeout(STOP_TIMEOUT, &mut handle).await {
            Ok(Ok(())) => {
                info!("reminders stopped");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "reminder task ended abnormally");
                true
            }
            Err(_) => {
                warn!("reminder task did not stop within {:?}, leaving it behind", STOP_TIMEOUT);
                false
            }
        }
    }
}

impl Drop for ReminderLoop {
    fn drop(&mut self) {
        if let State::Running { cancel, .. } = &self.state {
            cancel.cancel();
        }
    }
}

/// Run one poll: ask the source for due tasks off the async executor
pub async fn poll_once(source: Arc<dyn DueTasks>) -> Result<Vec<Task>> {
    tokio::task::spawn_blocking(move || source.due_today())
        .await
        .map_err(|e| TaskError::Connection(format!("reminder poll aborted: {}", e)))?
}

async fn run(
    source: Arc<dyn DueTasks>,
    sink: Arc<dyn ReminderSink>,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        match poll_once(Arc::clone(&source)).await {
            Ok(due) => {
                debug!(count = due.len(), "reminder poll");
                sink.notify(&due);
            }
            Err(e) => warn!(error = %e, "reminder poll failed, retrying next interval"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    debug!("reminder task exiting");
}
