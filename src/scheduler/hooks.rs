//! Lifecycle hooks.
//!
//! Optional callbacks fired by the scheduler loop at task start, task
//! success, task failure (after the retry budget is spent), and at every
//! drain (all counters reaching zero). All hooks run synchronously inside
//! the scheduler's own execution context, so they should return quickly.

use std::sync::Arc;

use crate::core::task::{Task, TaskError};

/// Hook invoked with the task at start and success points.
pub type TaskHook = Arc<dyn Fn(&dyn Task) + Send + Sync>;

/// Hook invoked with the task and its final error.
pub type TaskFailureHook = Arc<dyn Fn(&dyn Task, &TaskError) + Send + Sync>;

/// Hook invoked when every counter reaches zero.
pub type DrainHook = Arc<dyn Fn() + Send + Sync>;

/// Optional lifecycle callbacks for a [`Scheduler`](super::Scheduler).
///
/// # Example
///
/// ```ignore
/// use presto::Hooks;
///
/// let hooks = Hooks::new()
///     .on_task_success(|task| println!("done: {}", task.name()))
///     .on_all_complete(|| println!("drained"));
/// ```
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) on_task_start: Option<TaskHook>,
    pub(crate) on_task_success: Option<TaskHook>,
    pub(crate) on_task_failure: Option<TaskFailureHook>,
    pub(crate) on_all_complete: Option<DrainHook>,
}

impl Hooks {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called just before a task begins executing.
    pub fn on_task_start(mut self, hook: impl Fn(&dyn Task) + Send + Sync + 'static) -> Self {
        self.on_task_start = Some(Arc::new(hook));
        self
    }

    /// Called when a task settles successfully.
    pub fn on_task_success(mut self, hook: impl Fn(&dyn Task) + Send + Sync + 'static) -> Self {
        self.on_task_success = Some(Arc::new(hook));
        self
    }

    /// Called when a task fails with no retries left.
    pub fn on_task_failure(
        mut self,
        hook: impl Fn(&dyn Task, &TaskError) + Send + Sync + 'static,
    ) -> Self {
        self.on_task_failure = Some(Arc::new(hook));
        self
    }

    /// Called every time active, pending, and awaiting-retry counts all
    /// reach zero. Not a one-shot signal: fires once per drain event.
    pub fn on_all_complete(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_all_complete = Some(Arc::new(hook));
        self
    }
}
