//! Testing utilities for users of the presto library.
//!
//! This module provides helpers for testing scheduled workloads:
//!
//! - [`SlowTask`]: succeeds after sleeping a fixed duration
//! - [`FlakyTask`]: fails N times, then succeeds
//! - [`FailingTask`]: fails every attempt
//! - [`RecordingHooks`]: captures hook firings for assertions

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::task::{Task, TaskError};
use crate::scheduler::Hooks;

/// Task that sleeps for a fixed duration, then succeeds.
///
/// Exposes started/finished flags so tests can observe in-flight state.
pub struct SlowTask {
    name: String,
    duration: Duration,
    started: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl SlowTask {
    pub fn new(name: &str, duration: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            duration,
            started: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag set when the task body begins.
    pub fn started_flag(&self) -> &Arc<AtomicBool> {
        &self.started
    }

    /// Flag set when the task body completes.
    pub fn finished_flag(&self) -> &Arc<AtomicBool> {
        &self.finished
    }
}

#[async_trait]
impl Task for SlowTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<(), TaskError> {
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(self.duration).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Task that fails a fixed number of times, then succeeds.
pub struct FlakyTask {
    name: String,
    failures_remaining: AtomicU32,
    calls: Arc<AtomicU32>,
}

impl FlakyTask {
    pub fn new(name: &str, failures: u32) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            failures_remaining: AtomicU32::new(failures),
            calls: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Number of times the task body has run.
    pub fn calls(&self) -> &Arc<AtomicU32> {
        &self.calls
    }
}

#[async_trait]
impl Task for FlakyTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<(), TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            Err(TaskError::ExecutionFailed(format!(
                "failing, {} more to go",
                remaining - 1
            )))
        } else {
            Ok(())
        }
    }
}

/// Task that fails on every attempt.
pub struct FailingTask {
    name: String,
    calls: Arc<AtomicU32>,
}

impl FailingTask {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            calls: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Number of times the task body has run.
    pub fn calls(&self) -> &Arc<AtomicU32> {
        &self.calls
    }
}

#[async_trait]
impl Task for FailingTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<(), TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TaskError::ExecutionFailed("always fails".to_string()))
    }
}

/// Records every hook firing so tests can assert on lifecycle order.
///
/// # Example
///
/// ```ignore
/// use presto::{Scheduler, SchedulerConfig};
/// use presto::testing::RecordingHooks;
///
/// let recorder = RecordingHooks::new();
/// let scheduler = Scheduler::new(SchedulerConfig::new(1))
///     .unwrap()
///     .with_hooks(recorder.hooks());
/// ```
#[derive(Clone, Default)]
pub struct RecordingHooks {
    started: Arc<Mutex<Vec<String>>>,
    succeeded: Arc<Mutex<Vec<String>>>,
    failed: Arc<Mutex<Vec<(String, String)>>>,
    drains: Arc<AtomicU32>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a [`Hooks`] set that records into this instance.
    pub fn hooks(&self) -> Hooks {
        let started = Arc::clone(&self.started);
        let succeeded = Arc::clone(&self.succeeded);
        let failed = Arc::clone(&self.failed);
        let drains = Arc::clone(&self.drains);

        Hooks::new()
            .on_task_start(move |task| {
                started.lock().expect("lock poisoned").push(task.name().to_string());
            })
            .on_task_success(move |task| {
                succeeded.lock().expect("lock poisoned").push(task.name().to_string());
            })
            .on_task_failure(move |task, error| {
                failed
                    .lock()
                    .expect("lock poisoned")
                    .push((task.name().to_string(), error.to_string()));
            })
            .on_all_complete(move || {
                drains.fetch_add(1, Ordering::SeqCst);
            })
    }

    /// Names of tasks that started, in start order.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().expect("lock poisoned").clone()
    }

    /// Names of tasks that succeeded, in settle order.
    pub fn succeeded(&self) -> Vec<String> {
        self.succeeded.lock().expect("lock poisoned").clone()
    }

    /// (name, error) pairs for tasks that exhausted their retries.
    pub fn failed(&self) -> Vec<(String, String)> {
        self.failed.lock().expect("lock poisoned").clone()
    }

    /// Number of times the drain hook fired.
    pub fn drain_count(&self) -> u32 {
        self.drains.load(Ordering::SeqCst)
    }
}
