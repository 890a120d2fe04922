//! Scheduler handle for controlling the scheduler.
//!
//! This module provides the `SchedulerHandle` type that allows external
//! control of the scheduler through submit, suspend, resume, stats, and
//! shutdown.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc, oneshot};

use crate::core::task::Task;

use super::types::{SchedulerCommand, SchedulerError, SchedulerState, SchedulerStats};

/// Handle for controlling a running scheduler.
///
/// Cloneable; all clones control the same scheduler. Submitting is a plain
/// (non-async) call: the command channel is unbounded so nothing in the
/// submit path can block.
#[derive(Clone)]
pub struct SchedulerHandle {
    pub(crate) command_tx: mpsc::UnboundedSender<SchedulerCommand>,
    pub(crate) state: Arc<RwLock<SchedulerState>>,
}

impl SchedulerHandle {
    /// Helper to send a command carrying a oneshot responder and wait for
    /// the response.
    async fn send_command<T>(
        &self,
        build_command: impl FnOnce(oneshot::Sender<T>) -> SchedulerCommand,
        operation: &str,
    ) -> Result<T, SchedulerError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(build_command(response_tx))
            .map_err(|_| {
                SchedulerError::ChannelError(format!("failed to send {} command", operation))
            })?;

        response_rx.await.map_err(|_| {
            SchedulerError::ChannelError(format!("failed to receive {} response", operation))
        })
    }

    /// Submit a task with the default priority (0).
    ///
    /// The task is queued and dispatched asynchronously; there is no
    /// return value correlating the submission to its outcome. Observe
    /// outcomes through the scheduler's hooks or state captured by the
    /// task itself.
    pub fn submit(&self, task: Arc<dyn Task>) -> Result<(), SchedulerError> {
        self.submit_with_priority(task, 0)
    }

    /// Submit a task with an explicit priority. Higher runs first; equal
    /// priorities run in submission order.
    pub fn submit_with_priority(
        &self,
        task: Arc<dyn Task>,
        priority: i32,
    ) -> Result<(), SchedulerError> {
        self.command_tx
            .send(SchedulerCommand::Submit { task, priority })
            .map_err(|_| SchedulerError::ChannelError("failed to send submit command".to_string()))
    }

    /// Suspend dispatch.
    ///
    /// While suspended, no queued task starts; in-flight tasks run to
    /// completion (including their retries' re-submission, which will then
    /// wait in the queue).
    pub async fn suspend(&self) -> Result<(), SchedulerError> {
        self.send_command(|response| SchedulerCommand::Suspend { response }, "suspend")
            .await
    }

    /// Resume dispatch after a suspend. Idempotent when not suspended.
    pub async fn resume(&self) -> Result<(), SchedulerError> {
        self.send_command(|response| SchedulerCommand::Resume { response }, "resume")
            .await
    }

    /// Get a snapshot of the scheduler's counters.
    pub async fn stats(&self) -> Result<SchedulerStats, SchedulerError> {
        self.send_command(|response| SchedulerCommand::Stats { response }, "stats")
            .await
    }

    /// Shut the scheduler down.
    ///
    /// Stops dispatching immediately, waits for in-flight tasks to settle,
    /// and drops queued tasks that never started.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        self.send_command(
            |response| SchedulerCommand::Shutdown { response },
            "shutdown",
        )
        .await
    }

    /// Get the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        *self.state.read().await
    }

    /// Check if the scheduler is dispatching.
    pub async fn is_running(&self) -> bool {
        *self.state.read().await == SchedulerState::Running
    }

    /// Check if dispatch is suspended.
    pub async fn is_suspended(&self) -> bool {
        *self.state.read().await == SchedulerState::Suspended
    }
}
