//! Task trait and error types.
//!
//! The `Task` trait is the fundamental unit of work in the runner.
//! Implement it directly, or wrap an async closure in [`FnTask`].

use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

/// Errors that can occur during task execution.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task execution failed with a message.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The core trait for defining executable tasks.
///
/// A task is an opaque unit of work: it executes once per attempt and
/// either succeeds or fails. Tasks carry no identity; a task that needs to
/// hand a value back to its submitter captures a destination (channel,
/// shared cell) when it is constructed.
///
/// # Example
///
/// ```ignore
/// use presto::{Task, TaskError};
/// use async_trait::async_trait;
///
/// struct FetchPage {
///     url: String,
/// }
///
/// #[async_trait]
/// impl Task for FetchPage {
///     fn name(&self) -> &str {
///         &self.url
///     }
///
///     async fn execute(&self) -> Result<(), TaskError> {
///         // do the work
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync {
    /// Display name used in logs. Not an identity; duplicates are fine.
    fn name(&self) -> &str {
        "task"
    }

    /// Execute one attempt of the task.
    ///
    /// # Returns
    /// * `Ok(())` - Attempt completed successfully
    /// * `Err(TaskError)` - Attempt failed; the scheduler decides whether
    ///   to retry
    async fn execute(&self) -> Result<(), TaskError>;
}

/// Adapter that turns an async closure into a [`Task`].
///
/// The closure is `Fn`, not `FnOnce`: the runner may invoke it again on
/// retry.
///
/// # Example
///
/// ```ignore
/// use presto::{FnTask, TaskError};
///
/// let task = FnTask::named("warm_cache", || async {
///     Ok::<(), TaskError>(())
/// });
/// ```
pub struct FnTask<F> {
    name: String,
    func: F,
}

impl<F> FnTask<F> {
    /// Wrap an async closure with a placeholder name.
    pub fn new(func: F) -> Self {
        Self {
            name: "task".to_string(),
            func,
        }
    }

    /// Wrap an async closure with a display name for logging.
    pub fn named(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<F, Fut> Task for FnTask<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), TaskError>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<(), TaskError> {
        (self.func)().await
    }
}
