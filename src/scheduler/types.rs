//! Scheduler type definitions.
//!
//! This module contains error types, state enums, command types, and the
//! internal queue entry for the scheduler.

use std::cmp::Ordering;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::core::queue::PriorityQueue;
use crate::core::task::{Task, TaskError};

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Concurrency limit must be at least 1.
    #[error("concurrency must be greater than 0")]
    InvalidConcurrency,

    /// Channel error.
    #[error("channel error: {0}")]
    ChannelError(String),
}

/// State of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Scheduler is dispatching queued tasks.
    Running,
    /// Dispatch is suspended; in-flight tasks continue.
    Suspended,
    /// Scheduler has shut down.
    Stopped,
}

/// Snapshot of scheduler counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tasks currently executing.
    pub active: usize,
    /// Tasks queued and not yet started.
    pub pending: usize,
    /// Failed tasks sleeping before re-submission.
    pub awaiting_retry: usize,
    /// Total tasks submitted (retries not counted).
    pub submitted: u64,
    /// Total tasks that settled successfully.
    pub succeeded: u64,
    /// Total tasks that failed after exhausting their retry budget.
    pub failed: u64,
}

impl SchedulerStats {
    /// True when nothing is executing, queued, or awaiting retry.
    pub fn is_idle(&self) -> bool {
        self.active == 0 && self.pending == 0 && self.awaiting_retry == 0
    }
}

/// A submitted task plus its scheduling bookkeeping.
pub(crate) struct QueuedItem {
    pub(crate) task: Arc<dyn Task>,
    pub(crate) priority: i32,
    /// Retries already performed; 0 on first submission.
    pub(crate) retries: u32,
    /// Allocated at every (re-)submission; strictly increasing, never
    /// reused. Sole tie-breaker among equal priorities.
    pub(crate) seq: u64,
}

impl QueuedItem {
    /// Queue order: priority descending, then submission order ascending.
    ///
    /// Returns `Greater` when `a` must run before `b`. The seq tie-break
    /// makes the order total, so execution order among equal priorities is
    /// deterministic.
    pub(crate) fn compare(a: &QueuedItem, b: &QueuedItem) -> Ordering {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.seq.cmp(&a.seq))
    }
}

pub(crate) type CompareFn = fn(&QueuedItem, &QueuedItem) -> Ordering;
pub(crate) type RunQueue = PriorityQueue<QueuedItem, CompareFn>;

/// Commands processed by the scheduler loop.
pub(crate) enum SchedulerCommand {
    /// Enqueue a task for execution.
    Submit {
        task: Arc<dyn Task>,
        priority: i32,
    },
    /// Re-enqueue a task after its retry delay elapsed.
    Resubmit {
        task: Arc<dyn Task>,
        priority: i32,
        retries: u32,
    },
    /// Run one dispatch pass. Sent once per burst of submissions so the
    /// pass sees every same-burst item before popping.
    Dispatch,
    /// A spawned task body finished.
    Settled {
        task: Arc<dyn Task>,
        priority: i32,
        retries: u32,
        outcome: Result<(), TaskError>,
    },
    /// Pause dispatch.
    Suspend { response: oneshot::Sender<()> },
    /// Resume dispatch.
    Resume { response: oneshot::Sender<()> },
    /// Request a counter snapshot.
    Stats {
        response: oneshot::Sender<SchedulerStats>,
    },
    /// Shut down after in-flight tasks settle.
    Shutdown { response: oneshot::Sender<()> },
}
