//! Retry policy configuration.
//!
//! Fixed-delay retry with a configurable attempt budget. Retries apply to
//! any task failure; the delay is non-blocking (the scheduler keeps
//! dispatching other work while a retry sleeps).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy for failed tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt (0 = no retries).
    /// A task failing every attempt executes `max_attempts + 1` times total.
    pub max_attempts: u32,

    /// Fixed delay before each re-submission.
    #[serde(with = "serde_duration")]
    pub delay: Duration,
}

impl RetryPolicy {
    /// Policy with no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            delay: Duration::ZERO,
        }
    }

    /// Fixed-delay policy.
    ///
    /// # Arguments
    /// * `max_attempts` - Maximum retries (not counting the initial attempt)
    /// * `delay` - Fixed delay before each retry
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Check if retries are enabled.
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 0
    }

    /// Check whether another retry is allowed.
    ///
    /// # Arguments
    /// * `retries_done` - Retries already performed for the task (0 after
    ///   the first failure)
    pub fn should_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_attempts
    }

    /// Delay before the next retry.
    pub fn get_delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    /// Default policy: no retries.
    fn default() -> Self {
        Self::none()
    }
}

/// Serde helper for Duration serialization.
///
/// Serializes the delay as integer milliseconds, the runner's native unit.
mod serde_duration {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
