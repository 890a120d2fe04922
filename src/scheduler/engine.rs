//! Scheduler engine implementation.
//!
//! The scheduler is responsible for:
//! - Running submitted tasks in (priority desc, submission order asc) order
//! - Enforcing the maximum concurrency bound
//! - Retrying failed tasks after a fixed delay
//! - Firing lifecycle hooks
//! - Suspend and resume of dispatch
//!
//! All mutable state (the queue and the counters) is owned by a single
//! loop task; task bodies run as independent tokio tasks and report back
//! through the command channel.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::core::task::{Task, TaskError};

use super::config::SchedulerConfig;
use super::handle::SchedulerHandle;
use super::hooks::Hooks;
use super::types::{
    QueuedItem, RunQueue, SchedulerCommand, SchedulerError, SchedulerState, SchedulerStats,
};

/// Priority task scheduler with a fixed concurrency bound.
///
/// # Example
///
/// ```ignore
/// use presto::{FnTask, Scheduler, SchedulerConfig};
/// use std::sync::Arc;
///
/// # async fn demo() -> Result<(), presto::SchedulerError> {
/// let scheduler = Scheduler::new(SchedulerConfig::new(2))?;
/// let (handle, join) = scheduler.start();
///
/// handle.submit(Arc::new(FnTask::new(|| async { Ok(()) })))?;
/// handle.shutdown().await?;
/// join.await.ok();
/// # Ok(())
/// # }
/// ```
pub struct Scheduler {
    config: SchedulerConfig,
    hooks: Hooks,
    /// Pending work, ordered by (priority desc, seq asc).
    queue: RunQueue,
    /// Next sequence number to allocate. Strictly increasing for the life
    /// of the scheduler, including across retries.
    next_seq: u64,
    /// Tasks currently executing. Bounded by `config.concurrency`.
    active_count: usize,
    /// Queue length, tracked separately for O(1) completion checks.
    pending_count: usize,
    /// Failed tasks sleeping before re-submission.
    awaiting_retry: usize,
    /// When set, dispatch passes stop starting new work.
    suspended: bool,
    /// Guard so a burst of submissions triggers exactly one dispatch pass.
    dispatch_scheduled: bool,
    submitted: u64,
    succeeded: u64,
    failed: u64,
}

impl Scheduler {
    /// Create a new scheduler with the given configuration.
    ///
    /// Fails with [`SchedulerError::InvalidConcurrency`] when the
    /// configured concurrency is 0.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self {
            config,
            hooks: Hooks::default(),
            queue: RunQueue::new(QueuedItem::compare),
            next_seq: 0,
            active_count: 0,
            pending_count: 0,
            awaiting_retry: 0,
            suspended: false,
            dispatch_scheduled: false,
            submitted: 0,
            succeeded: 0,
            failed: 0,
        })
    }

    /// Set the lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Get the configured concurrency limit.
    pub fn concurrency(&self) -> usize {
        self.config.concurrency
    }

    /// Start the scheduler and return a handle for controlling it.
    pub fn start(self) -> (SchedulerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = Arc::new(RwLock::new(SchedulerState::Running));

        let handle = SchedulerHandle {
            command_tx: command_tx.clone(),
            state: Arc::clone(&state),
        };

        let scheduler_task = tokio::spawn(async move {
            self.run(command_rx, command_tx, state).await;
        });

        (handle, scheduler_task)
    }

    /// Main scheduler loop.
    async fn run(
        mut self,
        mut command_rx: mpsc::UnboundedReceiver<SchedulerCommand>,
        command_tx: mpsc::UnboundedSender<SchedulerCommand>,
        state: Arc<RwLock<SchedulerState>>,
    ) {
        let mut shutdown_ack: Option<oneshot::Sender<()>> = None;

        while let Some(command) = command_rx.recv().await {
            match command {
                SchedulerCommand::Submit { task, priority } => {
                    self.submitted += 1;
                    self.enqueue(task, priority, 0, &command_tx);
                }

                SchedulerCommand::Resubmit {
                    task,
                    priority,
                    retries,
                } => {
                    self.awaiting_retry -= 1;
                    self.enqueue(task, priority, retries, &command_tx);
                }

                SchedulerCommand::Dispatch => {
                    self.dispatch_scheduled = false;
                    self.dispatch(&command_tx);
                }

                SchedulerCommand::Settled {
                    task,
                    priority,
                    retries,
                    outcome,
                } => {
                    self.active_count -= 1;
                    self.settle(task, priority, retries, outcome, shutdown_ack.is_some(), &command_tx);
                    self.check_completion();
                    self.schedule_dispatch(&command_tx);

                    if self.active_count == 0 {
                        if let Some(ack) = shutdown_ack.take() {
                            let _ = ack.send(());
                            break;
                        }
                    }
                }

                SchedulerCommand::Suspend { response } => {
                    self.suspended = true;
                    *state.write().await = SchedulerState::Suspended;
                    debug!("dispatch suspended");
                    let _ = response.send(());
                }

                SchedulerCommand::Resume { response } => {
                    if self.suspended {
                        self.suspended = false;
                        *state.write().await = SchedulerState::Running;
                        debug!(pending = self.pending_count, "dispatch resumed");
                        self.schedule_dispatch(&command_tx);
                    }
                    let _ = response.send(());
                }

                SchedulerCommand::Stats { response } => {
                    let _ = response.send(self.stats());
                }

                SchedulerCommand::Shutdown { response } => {
                    self.suspended = true;
                    *state.write().await = SchedulerState::Stopped;
                    debug!(
                        active = self.active_count,
                        pending = self.pending_count,
                        "shutting down"
                    );
                    if self.active_count == 0 {
                        let _ = response.send(());
                        break;
                    }
                    // Keep draining settle messages until in-flight work
                    // finishes; queued items never start.
                    shutdown_ack = Some(response);
                }
            }
        }
    }

    /// Push a task into the queue and schedule a dispatch pass.
    ///
    /// Shared by first submissions and retry re-submissions: a retried task
    /// receives a fresh sequence number, so it competes on equal footing
    /// with tasks submitted while it was sleeping.
    fn enqueue(
        &mut self,
        task: Arc<dyn Task>,
        priority: i32,
        retries: u32,
        command_tx: &mpsc::UnboundedSender<SchedulerCommand>,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;

        trace!(task = %task.name(), priority, retries, seq, "task queued");

        self.queue.push(QueuedItem {
            task,
            priority,
            retries,
            seq,
        });
        self.pending_count += 1;
        self.schedule_dispatch(command_tx);
    }

    /// Schedule exactly one dispatch pass for the current burst of
    /// commands. All submissions already sitting in the channel are
    /// processed before the `Dispatch` marker, so the pass evaluates
    /// priority order over the whole burst.
    fn schedule_dispatch(&mut self, command_tx: &mpsc::UnboundedSender<SchedulerCommand>) {
        if !self.dispatch_scheduled {
            self.dispatch_scheduled = true;
            let _ = command_tx.send(SchedulerCommand::Dispatch);
        }
    }

    /// One dispatch pass: hand queued tasks to free capacity.
    fn dispatch(&mut self, command_tx: &mpsc::UnboundedSender<SchedulerCommand>) {
        while !self.suspended && self.active_count < self.config.concurrency {
            let Some(item) = self.queue.pop() else {
                break;
            };
            self.pending_count -= 1;
            self.active_count += 1;

            debug!(
                task = %item.task.name(),
                priority = item.priority,
                seq = item.seq,
                active = self.active_count,
                "task starting"
            );

            if let Some(hook) = &self.hooks.on_task_start {
                hook(item.task.as_ref());
            }

            let command_tx = command_tx.clone();
            let QueuedItem {
                task,
                priority,
                retries,
                ..
            } = item;
            tokio::spawn(async move {
                let outcome = task.execute().await;
                let _ = command_tx.send(SchedulerCommand::Settled {
                    task,
                    priority,
                    retries,
                    outcome,
                });
            });
        }
    }

    /// Route a settled task to its success, retry, or failure path.
    fn settle(
        &mut self,
        task: Arc<dyn Task>,
        priority: i32,
        retries: u32,
        outcome: Result<(), TaskError>,
        shutting_down: bool,
        command_tx: &mpsc::UnboundedSender<SchedulerCommand>,
    ) {
        match outcome {
            Ok(()) => {
                self.succeeded += 1;
                trace!(task = %task.name(), "task succeeded");
                if let Some(hook) = &self.hooks.on_task_success {
                    hook(task.as_ref());
                }
            }
            Err(error) => {
                // No new retry timers once shutdown began.
                if !shutting_down && self.config.retry.should_retry(retries) {
                    self.schedule_retry(task, priority, retries, command_tx);
                } else {
                    self.failed += 1;
                    debug!(task = %task.name(), retries, error = %error, "task failed");
                    if let Some(hook) = &self.hooks.on_task_failure {
                        hook(task.as_ref(), &error);
                    }
                }
            }
        }
    }

    /// Sleep the retry delay off-loop, then re-submit with the retry count
    /// carried forward.
    fn schedule_retry(
        &mut self,
        task: Arc<dyn Task>,
        priority: i32,
        retries: u32,
        command_tx: &mpsc::UnboundedSender<SchedulerCommand>,
    ) {
        self.awaiting_retry += 1;
        let delay = self.config.retry.get_delay();

        debug!(
            task = %task.name(),
            retry = retries + 1,
            max_attempts = self.config.retry.max_attempts,
            delay_ms = delay.as_millis() as u64,
            "task retrying"
        );

        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = command_tx.send(SchedulerCommand::Resubmit {
                task,
                priority,
                retries: retries + 1,
            });
        });
    }

    /// Fire the drain hook when active, pending, and awaiting-retry all
    /// reach zero. Evaluated after every settlement, so it fires once per
    /// drain event and again if new work follows.
    fn check_completion(&self) {
        if self.active_count == 0 && self.pending_count == 0 && self.awaiting_retry == 0 {
            debug!(succeeded = self.succeeded, failed = self.failed, "all tasks settled");
            if let Some(hook) = &self.hooks.on_all_complete {
                hook();
            }
        }
    }

    fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            active: self.active_count,
            pending: self.pending_count,
            awaiting_retry: self.awaiting_retry,
            submitted: self.submitted,
            succeeded: self.succeeded,
            failed: self.failed,
        }
    }
}
