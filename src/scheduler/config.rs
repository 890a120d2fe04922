//! Scheduler configuration.
//!
//! The configuration is fixed at construction; there is no runtime
//! reconfiguration of the concurrency limit.

use serde::{Deserialize, Serialize};

use crate::core::retry::RetryPolicy;

use super::types::SchedulerError;

/// Default concurrency limit when none is configured.
const DEFAULT_CONCURRENCY: usize = 4;

/// Configuration for a [`Scheduler`](super::Scheduler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum tasks executing simultaneously. Must be at least 1.
    pub concurrency: usize,

    /// Retry policy applied to every failed task.
    pub retry: RetryPolicy,
}

impl SchedulerConfig {
    /// Create a configuration with the given concurrency and no retries.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            retry: RetryPolicy::none(),
        }
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.concurrency == 0 {
            return Err(SchedulerError::InvalidConcurrency);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}
